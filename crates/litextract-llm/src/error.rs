//! Errors surfaced by the LLM transport boundary.

use thiserror::Error;

/// Errors an `LlmBackend` implementation may return.
///
/// This is a closed set deliberately narrower than a real provider's error
/// taxonomy: the core only needs to distinguish the cases that change its
/// own control flow.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM call timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("LLM transport failure: {0}")]
    Transport(String),

    #[error("LLM returned output that does not conform to the requested schema: {0}")]
    ContractViolation(String),

    #[error("LLM call budget exceeded: limit {limit}, attempted {attempted}")]
    BudgetExceeded { limit: u32, attempted: u32 },

    #[error("LLM backend misconfigured: {0}")]
    Misconfiguration(String),
}
