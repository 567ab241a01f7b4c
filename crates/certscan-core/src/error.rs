//! Error types for certscan-core
//!
//! Centralized error handling using `thiserror` for ergonomic error definitions.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse error classes used by the pipeline to decide between
/// aborting, skipping a row, or flagging and keeping a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Suffix list or policy table could not be loaded
    Startup,
    /// Raw row rejected by the transport layer
    TransportMalformed,
    /// Attribute, SAN or timestamp parse failure
    Normalization,
    /// Keep/discard evaluation failed
    Decision,
    /// Output write or bulk-load failure
    Sink,
    /// Bad configuration or I/O outside the record stream
    Other,
}

/// Main error type for certscan-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Public suffix list could not be loaded
    #[error("Suffix list error for '{path}': {message}")]
    SuffixList {
        /// Path of the suffix list
        path: String,
        /// Failure reason
        message: String,
    },

    /// CA policy table could not be loaded
    #[error("CA policy table error for '{path}': {message}")]
    PolicyTable {
        /// Path of the policy table
        path: String,
        /// Failure reason
        message: String,
    },

    /// Record has the wrong number of fields
    #[error("Record has {actual} fields, expected {expected}")]
    FieldCount {
        /// Required field count
        expected: usize,
        /// Field count found
        actual: usize,
    },

    /// `NAME=value` attribute string could not be parsed
    #[error("Invalid NAME=value syntax in {field}: '{segment}'")]
    AttributeSyntax {
        /// Record field being parsed
        field: &'static str,
        /// Offending segment
        segment: String,
    },

    /// Subject alternative name field could not be parsed
    #[error("Unexpected text in alt domain field: '{value}'")]
    AltNameSyntax {
        /// Full SAN field
        value: String,
    },

    /// Timestamp did not match the expected format
    #[error("Invalid timestamp in {field}: '{value}'")]
    Timestamp {
        /// Record field being parsed
        field: &'static str,
        /// Offending value
        value: String,
    },

    /// A keep check failed to evaluate
    #[error("Keep check '{check}' failed: {message}")]
    Check {
        /// Name of the failing check
        check: &'static str,
        /// Error message
        message: String,
    },

    /// Too many malformed lines in one input file
    #[error("Too many bad lines in '{}': {count} (limit {limit})", path.display())]
    TooManyBadLines {
        /// Input file
        path: PathBuf,
        /// Bad lines seen
        count: usize,
        /// Configured limit
        limit: usize,
    },

    /// Output or bulk-load failure
    #[error("Sink '{sink}' failed: {message}")]
    Sink {
        /// Sink or table name
        sink: String,
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path to the missing config file
        path: String,
    },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    ConfigValue {
        /// Configuration key
        key: String,
        /// Error message
        message: String,
    },

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error wrapper
    #[error("CSV error: {source}")]
    Csv {
        /// Underlying decoder error
        #[source]
        source: Box<csv::Error>,
    },

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a suffix list load error
    pub fn suffix_list(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SuffixList {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a policy table load error
    pub fn policy_table(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PolicyTable {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an attribute syntax error
    pub fn attribute(field: &'static str, segment: impl Into<String>) -> Self {
        Self::AttributeSyntax {
            field,
            segment: segment.into(),
        }
    }

    /// Create a keep check error
    pub fn check(check: &'static str, message: impl Into<String>) -> Self {
        Self::Check {
            check,
            message: message.into(),
        }
    }

    /// Create a sink error
    pub fn sink(sink: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Sink {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// Create a config value error
    pub fn config_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValue {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SuffixList { .. } | Self::PolicyTable { .. } => ErrorKind::Startup,
            Self::TooManyBadLines { .. } | Self::Csv { .. } => ErrorKind::TransportMalformed,
            Self::FieldCount { .. }
            | Self::AttributeSyntax { .. }
            | Self::AltNameSyntax { .. }
            | Self::Timestamp { .. } => ErrorKind::Normalization,
            Self::Check { .. } => ErrorKind::Decision,
            Self::Sink { .. } => ErrorKind::Sink,
            Self::Config(_)
            | Self::ConfigNotFound { .. }
            | Self::ConfigValue { .. }
            | Self::Io(_)
            | Self::TomlParse(_) => ErrorKind::Other,
        }
    }

    /// True for errors the pipeline recovers from by flagging the record
    pub fn is_record_level(&self) -> bool {
        matches!(self.kind(), ErrorKind::Normalization | ErrorKind::Decision)
    }
}

impl From<csv::Error> for Error {
    fn from(source: csv::Error) -> Self {
        Self::Csv {
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::attribute("subject", "bogus");
        assert!(err.to_string().contains("subject"));
        assert!(err.to_string().contains("bogus"));

        let err = Error::check("policy_class", "registry empty");
        assert!(err.to_string().contains("policy_class"));
        assert!(err.to_string().contains("registry empty"));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::suffix_list("x", "empty").kind(), ErrorKind::Startup);
        assert_eq!(Error::policy_table("x", "empty").kind(), ErrorKind::Startup);
        assert_eq!(
            Error::FieldCount { expected: 44, actual: 3 }.kind(),
            ErrorKind::Normalization
        );
        assert_eq!(Error::check("c", "m").kind(), ErrorKind::Decision);
        assert_eq!(Error::sink("certs", "disk full").kind(), ErrorKind::Sink);
    }

    #[test]
    fn test_record_level() {
        assert!(Error::AltNameSyntax { value: "x".into() }.is_record_level());
        assert!(Error::check("c", "m").is_record_level());
        assert!(!Error::sink("certs", "m").is_record_level());
        assert!(!Error::suffix_list("p", "m").is_record_level());
    }

    #[test]
    fn test_csv_error_is_boxed() {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader("a,b\nc\n".as_bytes());
        let csv_err = reader
            .records()
            .find_map(|r| r.err())
            .unwrap();

        let err = Error::from(csv_err);
        assert!(matches!(err, Error::Csv { .. }));
        assert_eq!(err.kind(), ErrorKind::TransportMalformed);
        assert!(err.to_string().starts_with("CSV error: "));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_too_many_bad_lines_display() {
        let err = Error::TooManyBadLines {
            path: PathBuf::from("scan.csv"),
            count: 101,
            limit: 100,
        };
        let s = err.to_string();
        assert!(s.contains("scan.csv"));
        assert!(s.contains("101"));
    }
}
