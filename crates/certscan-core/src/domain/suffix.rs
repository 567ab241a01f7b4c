//! Public suffix set and domain decomposition

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

const ICANN_BEGIN: &str = "===BEGIN ICANN DOMAINS===";
const ICANN_END: &str = "===END ICANN DOMAINS===";

static SECTION_DELIMITER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"===.+===").expect("static regex"));

/// Result of splitting a domain around its public suffix.
///
/// For `sub.example.co.uk` this is subdomain `sub`, second level `example`
/// and suffix `co.uk`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainParts {
    /// Labels left of the second-level domain, joined by `.`
    pub subdomain: String,
    /// Registrable label immediately left of the suffix
    pub second_level: String,
    /// Longest matching public suffix
    pub suffix: String,
    /// False when no suffix matched or the domain is itself a suffix
    pub matched: bool,
}

impl DomainParts {
    fn unmatched() -> Self {
        Self::default()
    }

    /// `"<second_level>.<suffix>"`, or `None` if unmatched
    pub fn registrable(&self) -> Option<String> {
        self.matched
            .then(|| format!("{}.{}", self.second_level, self.suffix))
    }
}

/// Immutable set of ICANN public suffixes.
///
/// Suffixes are stored as lower-case ASCII (punycode for internationalized
/// labels) in label-reversed form (`co.uk` is kept as `uk.co`). A
/// `SuffixSet` is never empty.
#[derive(Debug, Clone)]
pub struct SuffixSet {
    reversed: HashSet<String>,
}

impl SuffixSet {
    /// Load the ICANN section of a `effective_tld_names.dat` file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::suffix_list(path.display().to_string(), e.to_string()))?;
        let set = Self::parse(&content)
            .map_err(|message| Error::suffix_list(path.display().to_string(), message))?;
        info!(count = set.len(), path = %path.display(), "Loaded public suffix list");
        Ok(set)
    }

    /// Parse public suffix list text, keeping ICANN rules only
    pub fn from_list(content: &str) -> Result<Self> {
        Self::parse(content).map_err(|message| Error::suffix_list("<memory>", message))
    }

    /// Build directly from suffixes such as `"com"` or `"co.uk"`
    pub fn from_suffixes<I, S>(suffixes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let reversed: HashSet<String> = suffixes
            .into_iter()
            .map(|s| normalize(s.as_ref()))
            .filter(|s| !s.is_empty())
            .map(|s| reverse_domain(&s))
            .collect();
        if reversed.is_empty() {
            return Err(Error::suffix_list("<memory>", "no domain suffixes given"));
        }
        Ok(Self { reversed })
    }

    fn parse(content: &str) -> std::result::Result<Self, String> {
        let mut reversed = HashSet::new();
        let mut in_icann = false;
        let mut skipped = 0usize;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with("//") {
                if let Some(delim) = SECTION_DELIMITER.find(line) {
                    match delim.as_str() {
                        ICANN_BEGIN => in_icann = true,
                        ICANN_END => in_icann = false,
                        _ => {}
                    }
                }
                continue;
            }
            if !in_icann {
                continue;
            }
            // A rule ends at the first whitespace
            let rule = line.split_whitespace().next().unwrap_or_default();
            if rule.starts_with('!') || rule.starts_with('*') {
                skipped += 1;
                continue;
            }
            let rule = if rule.is_ascii() {
                normalize(rule)
            } else {
                idna::domain_to_ascii(rule)
                    .map_err(|e| format!("invalid suffix rule '{rule}': {e}"))?
            };
            if !rule.is_empty() {
                reversed.insert(reverse_domain(&rule));
            }
        }

        if skipped > 0 {
            debug!(skipped, "Skipped wildcard/exception suffix rules");
        }
        if reversed.is_empty() {
            return Err("no domain suffixes in suffix file".to_string());
        }
        Ok(Self { reversed })
    }

    /// Number of suffixes
    pub fn len(&self) -> usize {
        self.reversed.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.reversed.is_empty()
    }

    /// True if `suffix` is itself a public suffix
    pub fn contains(&self, suffix: &str) -> bool {
        self.reversed.contains(&reverse_domain(&normalize(suffix)))
    }

    /// All suffixes in natural (unreversed) ASCII form, sorted
    pub fn suffixes(&self) -> Vec<String> {
        let mut all: Vec<String> = self.reversed.iter().map(|r| reverse_domain(r)).collect();
        all.sort();
        all
    }

    /// Split a domain into subdomain, second-level domain and public suffix.
    ///
    /// Candidates are tried from the whole domain down to its last label, so
    /// the first hit is the longest matching suffix. Internationalized names
    /// match in either Unicode or punycode form; the parts are returned in
    /// punycode. A name with an empty label never matches.
    pub fn decompose(&self, domain: &str) -> DomainParts {
        let domain = normalize(domain);
        let labels: Vec<&str> = domain.split('.').collect();
        if labels.iter().any(|label| label.is_empty()) {
            return DomainParts::unmatched();
        }

        for i in 0..labels.len() {
            let candidate = &labels[i..];
            let key = candidate.iter().rev().copied().collect::<Vec<_>>().join(".");
            if !self.reversed.contains(&key) {
                continue;
            }
            let suffix = candidate.join(".");
            return match i {
                // The domain is a public suffix; nothing is registrable
                0 => DomainParts {
                    suffix,
                    ..DomainParts::unmatched()
                },
                1 => DomainParts {
                    subdomain: String::new(),
                    second_level: labels[0].to_string(),
                    suffix,
                    matched: true,
                },
                _ => DomainParts {
                    subdomain: labels[..i - 1].join("."),
                    second_level: labels[i - 1].to_string(),
                    suffix,
                    matched: true,
                },
            };
        }

        DomainParts::unmatched()
    }

    /// Compare the registrable parts of two domains.
    ///
    /// Returns `(same, both_matched)`.
    pub fn same_second_level(&self, a: &str, b: &str) -> (bool, bool) {
        let a = self.decompose(a);
        let b = self.decompose(b);
        (
            a.suffix == b.suffix && a.second_level == b.second_level,
            a.matched && b.matched,
        )
    }
}

/// Drop a single trailing root dot and bring the name to lower-case ASCII.
///
/// Non-ASCII names go through IDNA; one that cannot be converted is only
/// lower-cased and will not match any suffix.
fn normalize(domain: &str) -> String {
    let domain = domain.trim();
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    if domain.is_ascii() {
        return domain.to_ascii_lowercase();
    }
    idna::domain_to_ascii(domain).unwrap_or_else(|_| domain.to_lowercase())
}

/// Turn `a.b.c` into `c.b.a`
pub fn reverse_domain(domain: &str) -> String {
    domain.split('.').rev().collect::<Vec<_>>().join(".")
}

/// True if `a` is `b` or a subdomain of `b`, compared case-insensitively
pub fn is_subdomain(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() || b.len() > a.len() {
        return false;
    }
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    if a == b {
        return true;
    }
    a.strip_suffix(&b)
        .map_or(false, |head| head.ends_with('.'))
}
