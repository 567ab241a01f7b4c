//! certscan CLI
//!
//! Command-line interface for the certificate scan filter.

mod args;
mod commands;
mod logging;

use anyhow::Result;
use certscan_core::config::LoggingConfig;
use clap::Parser;
use std::path::Path;
use tracing::error;

use args::Args;
use commands::Command;

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    logging::init(&args, &logging_config(&args))?;

    if args.scan_args().is_some() && !args.quiet {
        print_banner();
    }

    let result = run(args);

    if let Err(ref e) = result {
        error!("Fatal error: {:#}", e);
    }

    result
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Some(Command::Scan(scan_args)) => commands::scan::execute(scan_args),
        Some(Command::Domain(domain_args)) => commands::data::domain(domain_args),
        Some(Command::Suffixes(data_args)) => commands::data::suffixes(data_args),
        Some(Command::Policies(data_args)) => commands::data::policies(data_args),
        Some(Command::Config(config_args)) => commands::config::execute(config_args),
        Some(Command::Completions(comp_args)) => commands::completions::execute(comp_args),
        None => commands::scan::execute(args.scan),
    }
}

/// `[logging]` section of whichever config file the command will use.
///
/// Load errors are ignored here; the command reports them itself.
fn logging_config(args: &Args) -> LoggingConfig {
    let file: Option<&Path> = match &args.command {
        None => args.scan.config.as_deref(),
        Some(Command::Scan(scan)) => scan.config.as_deref(),
        Some(Command::Domain(domain)) => domain.data.config.as_deref(),
        Some(Command::Suffixes(data)) | Some(Command::Policies(data)) => data.config.as_deref(),
        Some(Command::Config(_)) | Some(Command::Completions(_)) => return LoggingConfig::default(),
    };
    commands::config::resolve(file, None)
        .map(|config| config.logging)
        .unwrap_or_default()
}

fn print_banner() {
    use colored::Colorize;

    println!();
    println!(
        "{} {}",
        "certscan".green().bold(),
        env!("CARGO_PKG_VERSION").white()
    );
    println!("{}", "SSL/TLS certificate scan filter".cyan());
    println!();
}
