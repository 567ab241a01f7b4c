//! Domain name classification against the public suffix list
//!
//! A [`SuffixSet`] is loaded once from the ICANN section of
//! `effective_tld_names.dat` and is read-only afterwards, so it can be
//! shared freely between workers.

mod suffix;

pub use suffix::{is_subdomain, reverse_domain, DomainParts, SuffixSet};
