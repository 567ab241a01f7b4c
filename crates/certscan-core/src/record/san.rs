//! Subject alternative name parsing

use crate::error::{Error, Result};

/// Placeholder the scan dumps use for an absent extension
const EMPTY_SENTINEL: &str = "<EMPTY>";

/// Extract DNS names from a `type:value, type:value` SAN field.
///
/// Only `DNS` entries are returned; emails, IPs and URIs are skipped. The
/// split is on the first colon so IPv6 values survive.
pub fn parse_alt_domains(field: &str) -> Result<Vec<String>> {
    let field = field.trim();
    if field.is_empty() || field == EMPTY_SENTINEL {
        return Ok(Vec::new());
    }

    let mut domains = Vec::new();
    for pair in field.split(',') {
        let Some((kind, value)) = pair.split_once(':') else {
            return Err(Error::AltNameSyntax {
                value: field.to_string(),
            });
        };
        if kind.trim().eq_ignore_ascii_case("DNS") {
            domains.push(value.trim().to_string());
        }
    }
    Ok(domains)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dns_only() {
        let domains = parse_alt_domains(
            "DNS:example.com, DNS:www.example.com, email:admin@example.com, IP Address:2001:db8::1",
        )
        .unwrap();
        assert_eq!(domains, vec!["example.com", "www.example.com"]);
    }

    #[test]
    fn test_type_case_insensitive() {
        let domains = parse_alt_domains("dns:a.example.com,Dns:b.example.com").unwrap();
        assert_eq!(domains, vec!["a.example.com", "b.example.com"]);
    }

    #[test]
    fn test_empty_and_sentinel() {
        assert!(parse_alt_domains("").unwrap().is_empty());
        assert!(parse_alt_domains(" <EMPTY> ").unwrap().is_empty());
    }

    #[test]
    fn test_missing_colon_is_error() {
        let err = parse_alt_domains("DNS:example.com, garbage").unwrap_err();
        assert!(matches!(err, Error::AltNameSyntax { .. }));
    }

    #[test]
    fn test_duplicates_preserved_in_order() {
        let domains = parse_alt_domains("DNS:b.com,DNS:a.com,DNS:b.com").unwrap();
        assert_eq!(domains, vec!["b.com", "a.com", "b.com"]);
    }
}
