//! CA issuance policy registry
//!
//! Maps certificate policy OIDs to the issuing CA and its validation class
//! (DV, OV or EV). Loaded once from a curated CSV table with the columns
//! `CA name, DV OIDs, OV OIDs, EV OIDs, CPS URL, Notes`. The OID columns are
//! free text; only OID-shaped tokens are used.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

static OID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+\.)+\d+$").expect("static regex"));

/// True if `s` looks like an OID: two or more dot-separated integers
pub fn is_oid(s: &str) -> bool {
    OID_PATTERN.is_match(s)
}

/// Whitespace-split `s` and keep the OID-shaped tokens, in order
pub fn parse_oids(s: &str) -> Vec<String> {
    s.split_whitespace()
        .filter(|token| is_oid(token))
        .map(str::to_string)
        .collect()
}

/// Certificate validation class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PolicyClass {
    /// Domain validated
    Dv,
    /// Organization validated
    Ov,
    /// Extended validation
    Ev,
}

impl PolicyClass {
    /// Short upper-case name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dv => "DV",
            Self::Ov => "OV",
            Self::Ev => "EV",
        }
    }
}

impl fmt::Display for PolicyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DV" => Ok(Self::Dv),
            "OV" => Ok(Self::Ov),
            "EV" => Ok(Self::Ev),
            other => Err(Error::config_value(
                "policy",
                format!("Unknown policy class: {other}"),
            )),
        }
    }
}

/// What one OID means
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyInfo {
    /// Validation class
    pub class: PolicyClass,
    /// Issuing CA
    pub issuer: String,
}

/// OID to policy lookup table. Never empty.
#[derive(Debug, Clone)]
pub struct PolicyRegistry {
    by_oid: HashMap<String, PolicyInfo>,
}

impl PolicyRegistry {
    /// Load the policy table from a CSV file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|e| Error::policy_table(path.display().to_string(), e.to_string()))?;
        let registry = Self::from_reader(file).map_err(|e| {
            let message = match e {
                Error::PolicyTable { message, .. } => message,
                other => other.to_string(),
            };
            Error::policy_table(path.display().to_string(), message)
        })?;
        info!(count = registry.len(), path = %path.display(), "Loaded CA policy table");
        Ok(registry)
    }

    /// Read the policy table from any CSV source
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut registry = Self {
            by_oid: HashMap::new(),
        };
        for row in csv.records() {
            let row = row?;
            if row.len() < 4 {
                continue;
            }
            let issuer = &row[0];
            registry.add_oids(issuer, PolicyClass::Dv, &row[1]);
            registry.add_oids(issuer, PolicyClass::Ov, &row[2]);
            registry.add_oids(issuer, PolicyClass::Ev, &row[3]);
        }

        if registry.by_oid.is_empty() {
            return Err(Error::policy_table(
                "<reader>",
                "No CA policy OIDs found in OID file",
            ));
        }
        Ok(registry)
    }

    // Later rows overwrite earlier mappings for the same OID
    fn add_oids(&mut self, issuer: &str, class: PolicyClass, text: &str) {
        for oid in parse_oids(text) {
            self.by_oid.insert(
                oid,
                PolicyInfo {
                    class,
                    issuer: issuer.to_string(),
                },
            );
        }
    }

    /// Look up an OID
    pub fn lookup(&self, oid: &str) -> Option<&PolicyInfo> {
        self.by_oid.get(oid)
    }

    /// Number of known OIDs
    pub fn len(&self) -> usize {
        self.by_oid.len()
    }

    /// Always false for a loaded registry
    pub fn is_empty(&self) -> bool {
        self.by_oid.is_empty()
    }

    /// All entries sorted by OID
    pub fn entries(&self) -> Vec<(&str, &PolicyInfo)> {
        let mut entries: Vec<_> = self
            .by_oid
            .iter()
            .map(|(oid, info)| (oid.as_str(), info))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
CA name,DV OIDs,OV OIDs,EV OIDs,CPS URL,Notes
GoDaddy,2.16.840.1.114413.1.7.23.1,2.16.840.1.114413.1.7.23.2,2.16.840.1.114413.1.7.23.3,https://certs.godaddy.com/repository,
DigiCert,,2.16.840.1.114412.1.1 (see CPS 2.1),2.16.840.1.114412.2.1 2.16.840.1.114412.1.3.0.2,,
Too,short
";

    #[test]
    fn test_is_oid() {
        assert!(is_oid("2.23.140.1.2.1"));
        assert!(is_oid("1.2"));
        assert!(!is_oid("1"));
        assert!(!is_oid("1.2."));
        assert!(!is_oid("a.b.c"));
        assert!(!is_oid("Policy:"));
    }

    #[test]
    fn test_parse_oids_filters_text() {
        let oids = parse_oids("Policy: 2.23.140.1.2.2\n  CPS: http://x.example/cps 1.3.6.1.4.1.4146.1.20");
        assert_eq!(oids, vec!["2.23.140.1.2.2", "1.3.6.1.4.1.4146.1.20"]);
        assert!(parse_oids("").is_empty());
    }

    #[test]
    fn test_load_table() {
        let registry = PolicyRegistry::from_reader(TABLE.as_bytes()).unwrap();
        assert_eq!(registry.len(), 6);

        let info = registry.lookup("2.16.840.1.114413.1.7.23.3").unwrap();
        assert_eq!(info.class, PolicyClass::Ev);
        assert_eq!(info.issuer, "GoDaddy");

        let info = registry.lookup("2.16.840.1.114412.1.1").unwrap();
        assert_eq!(info.class, PolicyClass::Ov);
        assert_eq!(info.issuer, "DigiCert");

        assert!(registry.lookup("9.9.9").is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let table = "A,1.2.3,,\nB,,,1.2.3\n";
        let registry = PolicyRegistry::from_reader(table.as_bytes()).unwrap();
        let info = registry.lookup("1.2.3").unwrap();
        assert_eq!(info.issuer, "B");
        assert_eq!(info.class, PolicyClass::Ev);
    }

    #[test]
    fn test_empty_table_is_error() {
        assert!(PolicyRegistry::from_reader("CA name,DV,OV,EV\nnotes only,n/a,,\n".as_bytes()).is_err());
        assert!(PolicyRegistry::from_reader("".as_bytes()).is_err());
    }

    #[test]
    fn test_entries_sorted() {
        let registry = PolicyRegistry::from_reader("A,1.3 1.2,,\n".as_bytes()).unwrap();
        let oids: Vec<&str> = registry.entries().into_iter().map(|(oid, _)| oid).collect();
        assert_eq!(oids, vec!["1.2", "1.3"]);
    }

    #[test]
    fn test_policy_class_parse() {
        assert_eq!("ev".parse::<PolicyClass>().unwrap(), PolicyClass::Ev);
        assert_eq!(" DV ".parse::<PolicyClass>().unwrap(), PolicyClass::Dv);
        assert!("2.23.140.1.1".parse::<PolicyClass>().is_err());
        assert_eq!(PolicyClass::Ov.to_string(), "OV");
    }
}
