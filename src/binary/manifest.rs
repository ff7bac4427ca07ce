// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Per-file manifest: a nested string-keyed map stored as JSON.
//!
//! Writers record whatever a reader will need later (collection statistics,
//! skip settings, the vocabulary checksum). Readers pull typed values out with
//! a default, so a missing key is never an error at this layer.

use serde_json::{Map, Value};

use crate::error::Result;

/// Nested key/value metadata stored at the end of a BlockStore file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    entries: Map<String, Value>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Ok(Self::new());
        }
        let entries: Map<String, Value> = serde_json::from_slice(bytes)?;
        Ok(Self { entries })
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.entries)?)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.entries.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    /// Integer value, accepting either a JSON number or a numeric string.
    pub fn get_u64(&self, key: &str, default: u64) -> u64 {
        match self.entries.get(key) {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(default),
            Some(Value::String(s)) => s.parse().unwrap_or(default),
            _ => default,
        }
    }

    /// Float value, accepting either a JSON number or a numeric string.
    pub fn get_f64(&self, key: &str, default: f64) -> f64 {
        match self.entries.get(key) {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(default),
            Some(Value::String(s)) => s.parse().unwrap_or(default),
            _ => default,
        }
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.entries.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.parse().unwrap_or(default),
            _ => default,
        }
    }

    /// Nested manifest under `key`, or an empty one.
    pub fn section(&self, key: &str) -> Manifest {
        match self.entries.get(key) {
            Some(Value::Object(map)) => Manifest {
                entries: map.clone(),
            },
            _ => Manifest::new(),
        }
    }

    pub fn set_section(&mut self, key: &str, section: Manifest) {
        self.entries
            .insert(key.to_string(), Value::Object(section.entries));
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Copy every entry of `other` over this manifest.
    pub fn merge(&mut self, other: &Manifest) {
        for (k, v) in &other.entries {
            self.entries.insert(k.clone(), v.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_getters_with_defaults() {
        let mut m = Manifest::new();
        m.set("documentCount", 10u64);
        m.set("mu", "2500");
        m.set("compressed", true);

        assert_eq!(m.get_u64("documentCount", 0), 10);
        assert_eq!(m.get_f64("mu", 1500.0), 2500.0);
        assert!(m.get_bool("compressed", false));
        assert_eq!(m.get_u64("missing", 7), 7);
        assert_eq!(m.get_f64("documentCount", 0.0), 10.0);
    }

    #[test]
    fn test_nested_sections_roundtrip() {
        let mut inner = Manifest::new();
        inner.set("skipDistance", 500u64);
        let mut m = Manifest::new();
        m.set("partName", "postings");
        m.set_section("writer", inner);

        let bytes = m.to_json_bytes().unwrap();
        let back = Manifest::from_json_bytes(&bytes).unwrap();
        assert_eq!(back, m);
        assert_eq!(back.section("writer").get_u64("skipDistance", 0), 500);
        assert_eq!(back.section("absent"), Manifest::new());
    }

    #[test]
    fn test_empty_bytes_is_empty_manifest() {
        assert_eq!(Manifest::from_json_bytes(&[]).unwrap(), Manifest::new());
        assert!(Manifest::from_json_bytes(b"[1,2]").is_err());
    }
}
