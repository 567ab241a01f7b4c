//! CLI commands

pub mod completions;
pub mod config;
pub mod data;
pub mod scan;

use clap::Subcommand;

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Filter certificate scan files (default command)
    Scan(scan::ScanArgs),

    /// Split domain names around their public suffix
    Domain(data::DomainArgs),

    /// List the loaded ICANN public suffixes
    Suffixes(data::DataArgs),

    /// List the CA policy OID table
    Policies(data::DataArgs),

    /// Configuration management
    Config(config::ConfigArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}
