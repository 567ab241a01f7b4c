//! `NAME=value, NAME=value` distinguished name parsing
//!
//! Values may contain commas ("O=Smith, Inc"), so a comma only starts a new
//! attribute when the text after it contains `=`. Anything else is glued
//! back onto the attribute in progress.

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Parsed attributes keyed by upper-cased name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMap {
    values: BTreeMap<String, String>,
}

impl AttributeMap {
    /// Value for a key such as `"CN"`, or `""`
    pub fn get(&self, key: &str) -> &str {
        self.values
            .get(&key.to_ascii_uppercase())
            .map_or("", String::as_str)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if nothing was parsed
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn insert(&mut self, field: &'static str, segment: &str) -> Result<()> {
        let segment = segment.trim();
        if segment.is_empty() {
            return Ok(());
        }
        let Some((key, value)) = segment.split_once('=') else {
            return Err(Error::attribute(field, segment));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::attribute(field, segment));
        }
        self.values
            .insert(key.to_ascii_uppercase(), unescape(value.trim()));
        Ok(())
    }
}

/// Parse a subject or issuer string. `field` names the column for errors.
pub fn parse_attributes(field: &'static str, s: &str) -> Result<AttributeMap> {
    let mut map = AttributeMap::default();
    if s.trim().is_empty() {
        return Ok(map);
    }
    let mut pending = String::new();

    for segment in s.split(',') {
        if segment.contains('=') {
            map.insert(field, &pending)?;
            pending = segment.to_string();
        } else {
            pending.push(',');
            pending.push_str(segment);
        }
    }
    map.insert(field, &pending)?;

    Ok(map)
}

/// Drop backslash escapes: `\,` becomes `,`, `\\` becomes `\`
fn unescape(value: &str) -> String {
    if !value.contains('\\') {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}
