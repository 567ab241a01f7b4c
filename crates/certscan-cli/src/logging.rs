//! Logging initialization

use anyhow::{Context, Result};
use certscan_core::config::LoggingConfig;
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::args::{Args, LogFormat};

/// Pick the level: `--quiet` and `-v` win over the config file
fn level(args: &Args, config: &LoggingConfig) -> Level {
    if args.quiet {
        return Level::ERROR;
    }
    match args.verbose {
        0 => Level::from_str(&config.level).unwrap_or(Level::INFO),
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn format(args: &Args, config: &LoggingConfig) -> LogFormat {
    match args.log_format {
        Some(format) => format,
        None if config.json_format => LogFormat::Json,
        None => LogFormat::Text,
    }
}

/// Initialize logging from CLI arguments and the `[logging]` config section.
///
/// Logs go to stderr so stdout stays usable for command output.
pub fn init(args: &Args, config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(level(args, config).into())
        .from_env_lossy();

    let log_file = args.log_file.as_ref().or(config.file.as_ref());
    let file = match log_file {
        Some(path) => Some(
            std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path))?,
        ),
        None => None,
    };

    match format(args, config) {
        LogFormat::Text => {
            let subscriber = tracing_subscriber::registry().with(env_filter).with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(args.verbose >= 2)
                    .with_thread_ids(args.verbose >= 3)
                    .with_file(args.verbose >= 3)
                    .with_line_number(args.verbose >= 3),
            );

            if let Some(file) = file {
                subscriber
                    .with(fmt::layer().with_ansi(false).with_writer(file))
                    .init();
            } else {
                subscriber.init();
            }
        }
        LogFormat::Json => {
            let subscriber = tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr));

            if let Some(file) = file {
                subscriber
                    .with(fmt::layer().json().with_writer(file))
                    .init();
            } else {
                subscriber.init();
            }
        }
        LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_level_precedence() {
        let config = LoggingConfig {
            level: "warn".into(),
            ..LoggingConfig::default()
        };

        let args = Args::parse_from(["certscan"]);
        assert_eq!(level(&args, &config), Level::WARN);

        let args = Args::parse_from(["certscan", "-v"]);
        assert_eq!(level(&args, &config), Level::DEBUG);

        let args = Args::parse_from(["certscan", "-q", "-vv"]);
        assert_eq!(level(&args, &config), Level::ERROR);
    }

    #[test]
    fn test_format_falls_back_to_config() {
        let config = LoggingConfig {
            json_format: true,
            ..LoggingConfig::default()
        };
        let args = Args::parse_from(["certscan"]);
        assert_eq!(format(&args, &config), LogFormat::Json);

        let args = Args::parse_from(["certscan", "--log-format", "compact"]);
        assert_eq!(format(&args, &config), LogFormat::Compact);
    }
}
