//! Built-in hard gates

use super::{KeepCheck, Verdict};
use crate::error::Result;
use crate::policy::{PolicyClass, PolicyRegistry};
use crate::record::NormalizedCert;

/// Discards certificates the scanner marked invalid
#[derive(Debug, Default)]
pub struct ValidityCheck;

impl KeepCheck for ValidityCheck {
    fn name(&self) -> &'static str {
        "validity"
    }

    fn evaluate(&self, cert: &NormalizedCert, _registry: &PolicyRegistry) -> Result<Verdict> {
        Ok(Verdict::from(cert.is_valid))
    }
}

/// Discards certificates no browser root store accepts
#[derive(Debug, Default)]
pub struct BrowserTrustCheck;

impl KeepCheck for BrowserTrustCheck {
    fn name(&self) -> &'static str {
        "browser_trust"
    }

    fn evaluate(&self, cert: &NormalizedCert, _registry: &PolicyRegistry) -> Result<Verdict> {
        Ok(Verdict::from(cert.is_browser_valid))
    }
}

/// Discards self-signed certificates
#[derive(Debug, Default)]
pub struct CaSignedCheck;

impl KeepCheck for CaSignedCheck {
    fn name(&self) -> &'static str {
        "ca_signed"
    }

    fn evaluate(&self, cert: &NormalizedCert, _registry: &PolicyRegistry) -> Result<Verdict> {
        Ok(Verdict::from(cert.is_ca_signed))
    }
}

/// Requires a policy OID of a given class, or a literal OID.
///
/// `required` is tried as a class name first (`DV`, `OV`, `EV`). Whether or
/// not it names a class, it also matches any certificate OID verbatim.
#[derive(Debug)]
pub struct PolicyClassCheck {
    required: String,
    class: Option<PolicyClass>,
}

impl PolicyClassCheck {
    /// Create a check for a class name or an OID
    pub fn new(required: impl Into<String>) -> Self {
        let required = required.into().trim().to_string();
        let class = required.parse().ok();
        Self { required, class }
    }

    /// The class this check resolves OIDs against, if `required` names one
    pub fn class(&self) -> Option<PolicyClass> {
        self.class
    }
}

impl KeepCheck for PolicyClassCheck {
    fn name(&self) -> &'static str {
        "policy_class"
    }

    fn evaluate(&self, cert: &NormalizedCert, registry: &PolicyRegistry) -> Result<Verdict> {
        let matched = cert.policy_oids.iter().any(|oid| {
            oid == &self.required
                || self.class.map_or(false, |class| {
                    registry.lookup(oid).map_or(false, |info| info.class == class)
                })
        });
        Ok(Verdict::from(matched))
    }
}
