//! Cost estimation for premium-tier calls.
//!
//! Before any premium-tier call, compute an estimated cost from token
//! counts and published per-token rates. The core only exposes the
//! estimate; suppressing or deferring the call is the caller's policy.

use serde::{Deserialize, Serialize};

/// Published per-million-token rates for a model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenRate {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

impl Default for TokenRate {
    /// A conservative mid-tier cloud-model rate, used when neither the
    /// backend nor the caller has a better number. Not a substitute for a
    /// real published rate table.
    fn default() -> Self {
        Self {
            input_per_million: 3.0,
            output_per_million: 15.0,
        }
    }
}

/// A cost estimate for one prospective call, in the same currency unit as
/// the configured rate table (typically USD).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub estimated_input_tokens: u64,
    pub estimated_output_tokens: u64,
    pub estimated_cost: f64,
}

/// Estimates cost from a rough token count and a rate table.
#[must_use]
pub fn estimate_cost(rate: TokenRate, input_tokens: u64, output_tokens: u64) -> CostEstimate {
    let cost = (input_tokens as f64 / 1_000_000.0) * rate.input_per_million
        + (output_tokens as f64 / 1_000_000.0) * rate.output_per_million;
    CostEstimate {
        estimated_input_tokens: input_tokens,
        estimated_output_tokens: output_tokens,
        estimated_cost: cost,
    }
}

/// Rough token count for English prose: ~4 characters per token.
///
/// This is a deliberately crude heuristic — good enough for a pre-call
/// budget gate, not for billing reconciliation.
#[must_use]
pub fn estimate_tokens(text: &str) -> u64 {
    (text.chars().count() as u64 / 4).max(1)
}
