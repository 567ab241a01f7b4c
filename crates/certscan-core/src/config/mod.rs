//! Configuration management for certscan
//!
//! Strongly-typed configuration with TOML support and named presets for
//! common filtering setups.

mod preset;

pub use preset::Preset;

use crate::bulk::DEFAULT_BATCH_SIZE;
use crate::error::{Error, Result};
use crate::filter::KeepPolicy;
use crate::pipeline::DEFAULT_MAX_BAD_LINES;
use crate::policy::{is_oid, PolicyClass};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Preset the configuration was built from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<Preset>,

    /// Lookup data files
    pub data: DataConfig,

    /// Keep/discard policy
    pub keep: KeepPolicy,

    /// Record processing
    pub pipeline: PipelineConfig,

    /// CSV output
    pub output: OutputConfig,

    /// Bulk database load files
    pub bulk: BulkConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| Error::ConfigNotFound {
            path: path.display().to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(Error::from)
    }

    /// Create configuration from a preset
    pub fn from_preset(preset: Preset) -> Self {
        preset.into_config()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(policy) = &self.keep.policy {
            let policy = policy.trim();
            if !policy.is_empty() && policy.parse::<PolicyClass>().is_err() && !is_oid(policy) {
                return Err(Error::config_value(
                    "keep.policy",
                    format!("'{policy}' is neither DV, OV, EV nor an OID"),
                ));
            }
        }

        if self.bulk.enabled && self.bulk.batch_size == 0 {
            return Err(Error::config_value("bulk.batch_size", "Must be at least 1"));
        }

        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_value(
                "logging.level",
                format!("Unknown level '{}'", self.logging.level),
            ));
        }

        Ok(())
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Lookup data files, both loaded once at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Public suffix list (`effective_tld_names.dat` format)
    pub suffix_list: PathBuf,
    /// CA policy OID table (CSV)
    pub policy_table: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            suffix_list: PathBuf::from("effective_tld_names.dat"),
            policy_table: PathBuf::from("capolicies.csv"),
        }
    }
}

/// Record processing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Malformed rows tolerated per file
    pub max_bad_lines: usize,
    /// Files processed in parallel (0 = one per CPU)
    pub jobs: usize,
    /// Log every normalized record at debug level
    pub dump_records: bool,
}

impl PipelineConfig {
    /// Worker count with `0` resolved to the available parallelism
    pub fn effective_jobs(&self) -> usize {
        match self.jobs {
            0 => std::thread::available_parallelism().map_or(1, |n| n.get()),
            n => n,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_bad_lines: DEFAULT_MAX_BAD_LINES,
            jobs: 1,
            dump_records: false,
        }
    }
}

/// CSV output settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Kept records are written here (None = no CSV output)
    pub path: Option<PathBuf>,
}

/// Bulk load settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkConfig {
    /// Write bulk load files
    pub enabled: bool,
    /// Directory for batch files and `load.sql`
    pub spool_dir: PathBuf,
    /// Records per batch
    pub batch_size: usize,
    /// Also load the CA policy table into `capolicies`
    pub load_policies: bool,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            spool_dir: PathBuf::from("spool"),
            batch_size: DEFAULT_BATCH_SIZE,
            load_policies: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log file path (None = stderr only)
    pub file: Option<String>,
    /// Enable JSON format logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            json_format: false,
        }
    }
}
