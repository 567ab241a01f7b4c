//! Property tests for domain decomposition and normalization

use certscan_core::record::{Field, FIELD_COUNT};
use certscan_core::{NormalizedCert, RawRecord, SuffixSet};
use proptest::prelude::*;

const SUFFIXES: [&str; 6] = ["com", "net", "uk", "co.uk", "jp", "ne.jp"];

fn suffix_set() -> SuffixSet {
    SuffixSet::from_suffixes(SUFFIXES).unwrap()
}

fn label() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9-]{0,8}"
}

fn domain() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(label(), 0..4),
        prop::sample::select(SUFFIXES.to_vec()),
    )
        .prop_map(|(labels, suffix)| {
            let mut parts = labels;
            parts.push(suffix.to_string());
            parts.join(".")
        })
}

fn record_with_sans(domains: &[String]) -> RawRecord {
    let mut fields = vec![String::new(); FIELD_COUNT];
    fields[Field::NotValidBefore.index()] = "2014-01-01 00:00:00".into();
    fields[Field::NotValidAfter.index()] = "2015-01-01 00:00:00".into();
    fields[Field::SubjectAltName.index()] = domains
        .iter()
        .map(|d| format!("DNS:{d}"))
        .collect::<Vec<_>>()
        .join(", ");
    RawRecord::new(fields)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_decompose_case_insensitive(d in domain()) {
        let set = suffix_set();
        prop_assert_eq!(set.decompose(&d), set.decompose(&d.to_lowercase()));
        prop_assert_eq!(set.decompose(&d), set.decompose(&d.to_uppercase()));
    }

    #[test]
    fn prop_suffix_itself_never_matches(suffix in prop::sample::select(SUFFIXES.to_vec())) {
        prop_assert!(!suffix_set().decompose(suffix).matched);
    }

    #[test]
    fn prop_matched_parts_rebuild_domain(d in domain()) {
        let parts = suffix_set().decompose(&d);
        if parts.matched {
            let mut rebuilt = String::new();
            if !parts.subdomain.is_empty() {
                rebuilt.push_str(&parts.subdomain);
                rebuilt.push('.');
            }
            rebuilt.push_str(&parts.second_level);
            rebuilt.push('.');
            rebuilt.push_str(&parts.suffix);
            prop_assert_eq!(rebuilt, d.to_lowercase());
            prop_assert!(!parts.second_level.contains('.'));
        }
    }

    #[test]
    fn prop_second_level_domains_deduplicated(
        domains in prop::collection::vec(domain(), 1..8),
        repeats in 1usize..4,
    ) {
        let set = suffix_set();
        let mut repeated = Vec::new();
        for _ in 0..repeats {
            repeated.extend(domains.iter().cloned());
        }

        let cert = NormalizedCert::from_record(&record_with_sans(&repeated), &set).unwrap();
        let expected: std::collections::BTreeSet<String> = domains
            .iter()
            .filter_map(|d| set.decompose(d).registrable())
            .collect();

        prop_assert_eq!(&cert.second_level_domains, &expected);
        prop_assert_eq!(cert.domains.len(), repeated.len());
    }
}
