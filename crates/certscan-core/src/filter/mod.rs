//! Keep/discard decision engine
//!
//! A record is discarded unless it proves it is worth keeping. Hard gates
//! (validity, browser trust, CA signature, policy class and any extra
//! [`KeepCheck`]s) all have to pass. After that the organization stage
//! runs, and a certificate spanning several registrable domains can be
//! rescued from it. Nothing rescues a record that failed a hard gate.

mod checks;

pub use checks::{BrowserTrustCheck, CaSignedCheck, PolicyClassCheck, ValidityCheck};

use crate::error::{Error, Result};
use crate::policy::PolicyRegistry;
use crate::record::NormalizedCert;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Which missing properties are tolerated.
///
/// Every flag defaults to `false`, meaning the property is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeepPolicy {
    /// Keep certificates whose names stay within one registrable domain.
    /// When false, multi-domain certificates are rescued from the
    /// organization stage.
    pub keep_without_alt_names: bool,
    /// Skip the organization stage
    pub keep_without_organization: bool,
    /// Keep certificates the scanner marked invalid
    pub keep_invalid: bool,
    /// Keep certificates no browser trusts
    pub keep_browser_untrusted: bool,
    /// Keep self-signed certificates
    pub keep_self_signed: bool,
    /// Required policy class (`DV`, `OV`, `EV`) or literal OID
    pub policy: Option<String>,
}

/// Outcome of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The certificate satisfies the check
    Pass,
    /// The certificate fails the check
    Fail,
}

impl From<bool> for Verdict {
    fn from(pass: bool) -> Self {
        if pass {
            Self::Pass
        } else {
            Self::Fail
        }
    }
}

/// A hard gate in the decision engine
pub trait KeepCheck: Send + Sync {
    /// Check name, reported on discard
    fn name(&self) -> &'static str;

    /// Evaluate the check against one certificate
    fn evaluate(&self, cert: &NormalizedCert, registry: &PolicyRegistry) -> Result<Verdict>;
}

/// What to do with a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// All gates passed
    Keep,
    /// Organization stage failed, kept because the certificate spans
    /// several registrable domains
    KeepMultiDomain,
    /// Dropped by the named check
    Discard {
        /// Failing check
        check: &'static str,
    },
}

impl Decision {
    /// True for both keep variants
    pub fn is_keep(self) -> bool {
        !matches!(self, Self::Discard { .. })
    }
}

/// Name reported when the organization stage discards
pub const ORGANIZATION_CHECK: &str = "organization";

/// Evaluates a [`KeepPolicy`] against normalized certificates
pub struct DecisionEngine {
    checks: Vec<Box<dyn KeepCheck>>,
    require_organization: bool,
    multi_domain_rescue: bool,
}

impl DecisionEngine {
    /// Build the gates a policy asks for
    pub fn from_policy(policy: &KeepPolicy) -> Self {
        let mut checks: Vec<Box<dyn KeepCheck>> = Vec::new();

        if !policy.keep_invalid {
            checks.push(Box::new(ValidityCheck));
        }
        if !policy.keep_browser_untrusted {
            checks.push(Box::new(BrowserTrustCheck));
        }
        if !policy.keep_self_signed {
            checks.push(Box::new(CaSignedCheck));
        }
        if let Some(required) = policy.policy.as_deref().filter(|p| !p.trim().is_empty()) {
            checks.push(Box::new(PolicyClassCheck::new(required)));
        }

        Self {
            checks,
            require_organization: !policy.keep_without_organization,
            multi_domain_rescue: !policy.keep_without_alt_names,
        }
    }

    /// Append a gate; it runs after the built-in ones
    pub fn add_check<C: KeepCheck + 'static>(&mut self, check: C) {
        self.checks.push(Box::new(check));
    }

    /// Names of the active gates, in evaluation order
    pub fn check_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.checks.iter().map(|c| c.name()).collect();
        if self.require_organization {
            names.push(ORGANIZATION_CHECK);
        }
        names
    }

    /// Decide whether to keep a certificate.
    ///
    /// A check that cannot be evaluated yields an [`Error::Check`] naming it.
    pub fn should_keep(
        &self,
        cert: &NormalizedCert,
        registry: &PolicyRegistry,
    ) -> Result<Decision> {
        for check in &self.checks {
            let verdict = check.evaluate(cert, registry).map_err(|e| match e {
                Error::Check { .. } => e,
                other => Error::check(check.name(), other.to_string()),
            })?;
            if verdict == Verdict::Fail {
                trace!(check = check.name(), id = %cert.certificate_id, "Hard gate failed");
                return Ok(Decision::Discard { check: check.name() });
            }
        }

        if !self.require_organization || has_real_organization(cert) {
            return Ok(Decision::Keep);
        }
        if self.multi_domain_rescue && cert.is_multi_domain() {
            return Ok(Decision::KeepMultiDomain);
        }
        Ok(Decision::Discard {
            check: ORGANIZATION_CHECK,
        })
    }
}

impl std::fmt::Debug for DecisionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionEngine")
            .field("checks", &self.check_names())
            .field("multi_domain_rescue", &self.multi_domain_rescue)
            .finish()
    }
}

// An organization that just repeats the domain name is noise
fn has_real_organization(cert: &NormalizedCert) -> bool {
    let org = cert.organization.trim();
    !org.is_empty() && org != cert.common_name.trim()
}
