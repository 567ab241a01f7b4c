//! Typed certificate view built from a raw record

use super::attrs::parse_attributes;
use super::san::parse_alt_domains;
use super::{Field, RawRecord, FIELD_COUNT};
use crate::domain::SuffixSet;
use crate::error::{Error, Result};
use crate::policy::parse_oids;
use chrono::NaiveDateTime;
use std::collections::BTreeSet;
use std::fmt;

/// Literal timestamp format used by the scan dumps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Normalized certificate.
///
/// Derived only from a [`RawRecord`] and a [`SuffixSet`]; nothing downstream
/// mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedCert {
    /// Scan-assigned certificate id
    pub certificate_id: String,
    /// Subject CN
    pub common_name: String,
    /// Subject O
    pub organization: String,
    /// Subject OU
    pub organization_unit: String,
    /// Subject L
    pub location: String,
    /// Subject C
    pub country_code: String,
    /// Issuer O, or issuer CN when O is absent
    pub issuer_name: String,
    /// Start of validity
    pub not_before: NaiveDateTime,
    /// End of validity
    pub not_after: NaiveDateTime,
    /// DNS names from the SAN extension, in order
    pub alt_domains: Vec<String>,
    /// `alt_domains` plus the common name if present
    pub domains: Vec<String>,
    /// Distinct `"<2ld>.<suffix>"` strings across `domains`
    pub second_level_domains: BTreeSet<String>,
    /// OID-shaped tokens from the certificate policies extension
    pub policy_oids: BTreeSet<String>,
    /// Valid per the scanner
    pub is_valid: bool,
    /// Valid for at least one browser root store
    pub is_browser_valid: bool,
    /// Not self-signed
    pub is_ca_signed: bool,
    /// Non-fatal diagnostics
    pub errors: Vec<String>,
}

impl NormalizedCert {
    /// Normalize one raw record.
    ///
    /// Fails on a wrong field count or an unparseable subject, issuer, SAN
    /// or timestamp.
    pub fn from_record(raw: &RawRecord, suffixes: &SuffixSet) -> Result<Self> {
        if raw.len() != FIELD_COUNT {
            return Err(Error::FieldCount {
                expected: FIELD_COUNT,
                actual: raw.len(),
            });
        }

        let subject = parse_attributes("subject", raw.get(Field::Subject))?;
        let issuer = parse_attributes("issuer", raw.get(Field::Issuer))?;
        let alt_domains = parse_alt_domains(raw.get(Field::SubjectAltName))?;
        let not_before = parse_timestamp(raw, Field::NotValidBefore)?;
        let not_after = parse_timestamp(raw, Field::NotValidAfter)?;

        let common_name = subject.get("CN").to_string();
        let issuer_name = match issuer.get("O") {
            "" => issuer.get("CN"),
            org => org,
        }
        .to_string();

        let mut domains = alt_domains.clone();
        if !common_name.is_empty() {
            domains.push(common_name.clone());
        }

        let mut errors = Vec::new();
        let mut second_level_domains = BTreeSet::new();
        for domain in &domains {
            match suffixes.decompose(domain).registrable() {
                Some(registrable) => {
                    second_level_domains.insert(registrable);
                }
                None => errors.push(format!("no public suffix for '{domain}'")),
            }
        }

        Ok(Self {
            certificate_id: raw.get(Field::CertificateId).trim().to_string(),
            organization: subject.get("O").to_string(),
            organization_unit: subject.get("OU").to_string(),
            location: subject.get("L").to_string(),
            country_code: subject.get("C").to_string(),
            common_name,
            issuer_name,
            not_before,
            not_after,
            alt_domains,
            domains,
            second_level_domains,
            policy_oids: parse_oids(raw.get(Field::CertificatePolicies))
                .into_iter()
                .collect(),
            is_valid: raw.flag(Field::IsValid),
            is_browser_valid: Field::BROWSER_VALID.iter().any(|&f| raw.flag(f)),
            is_ca_signed: !raw.flag(Field::IsSelfSigned),
            errors,
        })
    }

    /// True if the certificate covers more than one registrable domain
    pub fn is_multi_domain(&self) -> bool {
        self.second_level_domains.len() > 1
    }

    /// Ordered `(name, value)` pairs for debug dumps
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("certificate_id", self.certificate_id.clone()),
            ("common_name", self.common_name.clone()),
            ("organization", self.organization.clone()),
            ("organization_unit", self.organization_unit.clone()),
            ("location", self.location.clone()),
            ("country_code", self.country_code.clone()),
            ("issuer_name", self.issuer_name.clone()),
            ("not_before", self.not_before.format(TIMESTAMP_FORMAT).to_string()),
            ("not_after", self.not_after.format(TIMESTAMP_FORMAT).to_string()),
            ("alt_domains", self.alt_domains.join(" ")),
            ("domains", self.domains.join(" ")),
            ("second_level_domains", join(&self.second_level_domains)),
            ("policy_oids", join(&self.policy_oids)),
            ("is_valid", self.is_valid.to_string()),
            ("is_browser_valid", self.is_browser_valid.to_string()),
            ("is_ca_signed", self.is_ca_signed.to_string()),
            ("errors", self.errors.join("; ")),
        ]
    }
}

impl fmt::Display for NormalizedCert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.fields().into_iter().enumerate() {
            writeln!(f, " #{i:2}: ({name})  {value}")?;
        }
        Ok(())
    }
}

fn join(set: &BTreeSet<String>) -> String {
    set.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
}

fn parse_timestamp(raw: &RawRecord, field: Field) -> Result<NaiveDateTime> {
    let value = raw.get(field).trim();
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|_| Error::Timestamp {
        field: field.name(),
        value: value.to_string(),
    })
}
