//! Bulk database loading
//!
//! Kept records are turned into `LOAD DATA INFILE` lines for three tables
//! (`certs`, `domains`, `policies`) and handed to a [`BatchStore`] in
//! fixed-size batches. The policy registry can be loaded once into
//! `capolicies`.

mod loader;
mod sql;
mod store;

pub use loader::{BulkLoader, DEFAULT_BATCH_SIZE};
pub use sql::{
    escape_field, to_sql_bool, to_sql_datetime, to_sql_int, to_sql_line, to_sql_string,
    FIELD_OPTIONS, NONE,
};
pub use store::{BatchStore, SpoolStore, LOAD_SCRIPT};

use crate::error::Result;
use crate::pipeline::RecordSink;
use crate::policy::PolicyRegistry;
use crate::record::{parse_flag, Field, NormalizedCert, RawRecord, TIMESTAMP_FORMAT};
use chrono::NaiveDateTime;
use std::collections::BTreeSet;

/// Certificate table
pub const CERTS_TABLE: &str = "certs";
/// Certificate to domain table
pub const DOMAINS_TABLE: &str = "domains";
/// Certificate to policy OID table
pub const POLICIES_TABLE: &str = "policies";
/// OID to CA policy table
pub const CA_POLICIES_TABLE: &str = "capolicies";

/// Sink that feeds kept records to a batch store
#[derive(Debug)]
pub struct BulkSink<S: BatchStore> {
    store: S,
    certs: BulkLoader,
    domains: BulkLoader,
    policies: BulkLoader,
}

impl<S: BatchStore> BulkSink<S> {
    /// Create a sink with the given batch size
    pub fn new(store: S, batch_size: usize) -> Self {
        Self {
            store,
            certs: BulkLoader::new(CERTS_TABLE, batch_size),
            domains: BulkLoader::new(DOMAINS_TABLE, batch_size),
            policies: BulkLoader::new(POLICIES_TABLE, batch_size),
        }
    }

    /// Underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Records loaded so far per table: certs, domains, policies
    pub fn loaded(&self) -> (u64, u64, u64) {
        (self.certs.loaded(), self.domains.loaded(), self.policies.loaded())
    }
}

impl<S: BatchStore> RecordSink for BulkSink<S> {
    fn name(&self) -> &str {
        "bulk"
    }

    fn write_record(&mut self, raw: &RawRecord, cert: Option<&NormalizedCert>) -> Result<()> {
        let Some(cert) = cert else {
            return self.certs.write(flagged_cert_line(raw), &mut self.store);
        };

        self.certs.write(cert_line(raw, cert), &mut self.store)?;

        let id = to_sql_int(&cert.certificate_id);
        let mut seen = BTreeSet::new();
        for domain in &cert.domains {
            let domain = domain.to_lowercase();
            if seen.insert(domain.clone()) {
                let domain = to_sql_string(&domain);
                let line = to_sql_line([id.as_str(), domain.as_str()]);
                self.domains.write(line, &mut self.store)?;
            }
        }
        for oid in &cert.policy_oids {
            let oid = to_sql_string(oid);
            let line = to_sql_line([id.as_str(), oid.as_str()]);
            self.policies.write(line, &mut self.store)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.certs.close(&mut self.store)?;
        self.domains.close(&mut self.store)?;
        self.policies.close(&mut self.store)?;
        Ok(())
    }
}

// id, sha1, CN, O, OU, L, C, issuer, not before, not after, valid,
// browser valid, CA signed, second-level domain count, error
fn cert_line(raw: &RawRecord, cert: &NormalizedCert) -> String {
    to_sql_line([
        to_sql_int(&cert.certificate_id),
        to_sql_string(raw.get(Field::Sha1Fingerprint)),
        to_sql_string(&cert.common_name),
        to_sql_string(&cert.organization),
        to_sql_string(&cert.organization_unit),
        to_sql_string(&cert.location),
        to_sql_string(&cert.country_code),
        to_sql_string(&cert.issuer_name),
        to_sql_datetime(&cert.not_before),
        to_sql_datetime(&cert.not_after),
        to_sql_bool(cert.is_valid),
        to_sql_bool(cert.is_browser_valid),
        to_sql_bool(cert.is_ca_signed),
        to_sql_int(&cert.second_level_domains.len().to_string()),
        to_sql_string(raw.get(Field::ERROR)),
    ])
}

// Same columns from the raw row alone; parsed fields are NONE
fn flagged_cert_line(raw: &RawRecord) -> String {
    let timestamp = |field: Field| {
        NaiveDateTime::parse_from_str(raw.get(field).trim(), TIMESTAMP_FORMAT)
            .map_or_else(|_| NONE.to_string(), |t| to_sql_datetime(&t))
    };
    let browser_valid = Field::BROWSER_VALID.iter().any(|&f| raw.flag(f));

    let mut fields = vec![
        to_sql_int(raw.get(Field::CertificateId).trim()),
        to_sql_string(raw.get(Field::Sha1Fingerprint)),
    ];
    fields.extend(std::iter::repeat(NONE.to_string()).take(6));
    fields.extend([
        timestamp(Field::NotValidBefore),
        timestamp(Field::NotValidAfter),
        to_sql_bool(raw.flag(Field::IsValid)),
        to_sql_bool(browser_valid),
        to_sql_bool(!parse_flag(raw.get(Field::IsSelfSigned))),
        NONE.to_string(),
        to_sql_string(raw.get(Field::ERROR)),
    ]);
    to_sql_line(fields)
}

/// Load every registry entry into `capolicies` as `(oid, issuer, class)`.
///
/// Returns the number of rows loaded.
pub fn load_policy_table<S: BatchStore + ?Sized>(
    registry: &PolicyRegistry,
    store: &mut S,
    batch_size: usize,
) -> Result<u64> {
    let mut loader = BulkLoader::new(CA_POLICIES_TABLE, batch_size);
    for (oid, info) in registry.entries() {
        let line = to_sql_line([
            to_sql_string(oid),
            to_sql_string(&info.issuer),
            info.class.as_str().to_string(),
        ]);
        loader.write(line, store)?;
    }
    loader.close(store)
}
