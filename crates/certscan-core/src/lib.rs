//! # certscan core
//!
//! Classifies bulk SSL/TLS certificate scan records and decides which ones
//! to keep for analysis.
//!
//! ## Architecture
//!
//! This crate provides:
//! - **Domain classification** - splits hostnames around their ICANN public suffix
//! - **CA policy registry** - maps policy OIDs to DV/OV/EV classes and issuers
//! - **Record normalization** - turns 44-field scan rows into typed certificates
//! - **Decision engine** - composable keep/discard gates
//! - **Pipeline** - streams rows from sources to sinks with run accounting
//! - **Bulk loading** - batches kept records into `LOAD DATA INFILE` files
//!
//! ## Example
//!
//! ```rust,no_run
//! use certscan_core::{Config, Pipeline};
//! use std::path::PathBuf;
//!
//! let config = Config::load("certscan.toml")?;
//! let pipeline = Pipeline::from_config(&config)?;
//!
//! let report = pipeline.run(&[PathBuf::from("scan.csv")], 1)?;
//! pipeline.finish()?;
//! println!("{}", report.totals);
//! # Ok::<(), certscan_core::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bulk;
pub mod config;
pub mod domain;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod policy;
pub mod record;

// Re-exports for convenience
pub use config::{Config, Preset};
pub use domain::{DomainParts, SuffixSet};
pub use error::{Error, ErrorKind, Result};
pub use filter::{Decision, DecisionEngine, KeepCheck, KeepPolicy, Verdict};
pub use pipeline::{Pipeline, RecordSink, RecordSource, Tallies};
pub use policy::{PolicyClass, PolicyInfo, PolicyRegistry};
pub use record::{NormalizedCert, RawRecord};
