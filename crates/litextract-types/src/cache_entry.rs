//! Cache entries: the unit the Result Cache stores and invalidates.

use crate::tier::Tier;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// A single cached extraction result, keyed externally by
/// `(fingerprint, schema_version, field_key | "whole-document")`.
///
/// Invalidated when `producer_version` or the schema version for its field
/// changes; otherwise read-only once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub value: Value,
    pub confidence: f64,
    pub tier: Tier,
    pub token_count: u64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub producer_version: String,
}

impl CacheEntry {
    #[must_use]
    pub fn new(
        value: Value,
        confidence: f64,
        tier: Tier,
        token_count: u64,
        producer_version: impl Into<String>,
    ) -> Self {
        Self {
            value,
            confidence,
            tier,
            token_count,
            created_at: chrono::Utc::now(),
            producer_version: producer_version.into(),
        }
    }

    /// Whether this entry is still usable given the current producer version.
    /// A stale producer (e.g. a patched regex tier, a reprompted schema)
    /// invalidates the entry.
    #[must_use]
    pub fn is_fresh(&self, current_producer_version: &str) -> bool {
        self.producer_version == current_producer_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_producer_version_invalidates() {
        let entry = CacheEntry::new(Value::Missing, 0.9, Tier::Regex, 10, "v1");
        assert!(entry.is_fresh("v1"));
        assert!(!entry.is_fresh("v2"));
    }
}
