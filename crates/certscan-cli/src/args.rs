//! Command-line argument parsing

use crate::commands::scan::ScanArgs;
use crate::commands::Command;
use clap::{Parser, ValueEnum};

/// certscan - SSL/TLS certificate scan filter
///
/// Reads bulk certificate scan CSV files, classifies every certificate by
/// its registrable domains and CA policy class, and keeps the ones that
/// match the configured filter.
#[derive(Parser, Debug)]
#[command(name = "certscan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Args {
    /// Subcommand to execute (default: scan)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Scan options used when no subcommand is given
    #[command(flatten)]
    pub scan: ScanArgs,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors and skip the banner
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format for logs [default: text]
    #[arg(long, value_enum, global = true)]
    pub log_format: Option<LogFormat>,

    /// Log file path
    #[arg(long, value_name = "FILE", global = true)]
    pub log_file: Option<String>,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// Compact format
    Compact,
}

impl Args {
    /// Scan arguments for the selected command, if it scans
    pub fn scan_args(&self) -> Option<&ScanArgs> {
        match &self.command {
            None => Some(&self.scan),
            Some(Command::Scan(scan)) => Some(scan),
            Some(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_scan() {
        let args = Args::parse_from(["certscan", "--noorg", "--policy", "EV", "a.csv", "b.csv"]);
        assert!(args.command.is_none());
        let scan = args.scan_args().unwrap();
        assert!(scan.noorg);
        assert!(!scan.novalid);
        assert_eq!(scan.policy.as_deref(), Some("EV"));
        assert_eq!(scan.inputs, vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")]);
    }

    #[test]
    fn test_scan_subcommand() {
        let args = Args::parse_from(["certscan", "scan", "-o", "kept.csv", "--bulk", "in.csv"]);
        let scan = args.scan_args().unwrap();
        assert_eq!(scan.output, Some(PathBuf::from("kept.csv")));
        assert!(scan.bulk);
        assert_eq!(scan.inputs, vec![PathBuf::from("in.csv")]);
    }

    #[test]
    fn test_other_subcommand_has_no_scan_args() {
        let args = Args::parse_from(["certscan", "domain", "www.example.com"]);
        assert!(args.scan_args().is_none());
    }

    #[test]
    fn test_verbose() {
        let args = Args::parse_from(["certscan", "-v"]);
        assert_eq!(args.verbose, 1);

        let args = Args::parse_from(["certscan", "-vvv"]);
        assert_eq!(args.verbose, 3);

        let args = Args::parse_from(["certscan", "suffixes", "-vv"]);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_log_format() {
        let args = Args::parse_from(["certscan", "--log-format", "json"]);
        assert_eq!(args.log_format, Some(LogFormat::Json));

        let args = Args::parse_from(["certscan"]);
        assert_eq!(args.log_format, None);
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
