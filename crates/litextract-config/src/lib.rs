//! Configuration surface for the extraction pipeline.
//!
//! `Config` is a plain serde-deserializable struct covering every
//! recognized pipeline option. It does not discover files or read the
//! environment; that belongs to whatever external CLI wires this crate up.

pub mod error;

pub use error::ConfigError;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-tier confidence thresholds, defaulting to the values in
/// `litextract_types::Tier::accept_threshold_default`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub regex: f64,
    pub local: f64,
    pub cheap: f64,
    pub premium: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            regex: 0.90,
            local: 0.85,
            cheap: 0.80,
            premium: 0.0,
        }
    }
}

/// Pipeline configuration, covering every row of the configuration table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upper bound on validator revision loops per document.
    pub max_iterations: u32,
    /// Minimum overall validator score to accept an extraction.
    pub score_threshold: f64,
    /// Enable two-pass local-to-cloud tier cascade.
    pub hybrid_mode: bool,
    /// Schema chunker split point.
    pub max_fields_per_chunk: usize,
    /// Per-tier accept thresholds.
    pub confidence_thresholds: TierThresholds,
    /// Score multiplier on evidence audit failure.
    pub quality_audit_penalty: f64,
    /// Upper bound on prepared context size, in characters.
    pub max_context_chars: usize,
    /// Jaccard similarity threshold for quote verification.
    pub fuzzy_quote_threshold: f64,
    /// Per-field tier assignment overrides, keyed by field key.
    pub field_routing: HashMap<String, String>,
    /// Max estimated cost (in the rate table's currency) for unattended
    /// premium-tier calls.
    pub auto_approve_cost_threshold: f64,
    /// Whether a recall-boost revision pass is attempted after a passing
    /// validation with newly-missing fields.
    pub recall_boost_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_iterations: 3,
            score_threshold: 0.75,
            hybrid_mode: false,
            max_fields_per_chunk: 25,
            confidence_thresholds: TierThresholds::default(),
            quality_audit_penalty: 0.8,
            max_context_chars: 40_000,
            fuzzy_quote_threshold: 0.6,
            field_routing: HashMap::new(),
            auto_approve_cost_threshold: 1.0,
            recall_boost_enabled: true,
        }
    }
}

impl Config {
    /// Parses a `Config` from an in-memory TOML string. Does not read
    /// from disk or the environment; the caller owns file discovery.
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` on malformed TOML.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_thresholds() {
        let config = Config::default();
        assert_eq!(config.max_iterations, 3);
        assert!((config.score_threshold - 0.75).abs() < 1e-9);
        assert!(config.recall_boost_enabled);
    }

    #[test]
    fn parses_partial_toml_using_defaults_for_the_rest() {
        let config = Config::from_toml_str("max_iterations = 5\nhybrid_mode = true\n").unwrap();
        assert_eq!(config.max_iterations, 5);
        assert!(config.hybrid_mode);
        assert!((config.score_threshold - 0.75).abs() < 1e-9);
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(Config::from_toml_str("not = [valid").is_err());
    }
}
