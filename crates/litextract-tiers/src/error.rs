//! Errors for the tier cascade and schema chunker.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TierError {
    #[error("no backend configured for tier {0:?}")]
    NoBackendForTier(litextract_types::Tier),

    #[error("tier backend call failed: {0}")]
    Backend(#[from] litextract_llm::LlmError),
}

#[derive(Debug, Error)]
pub enum ChunkerError {
    #[error("schema has no fields to chunk")]
    EmptySchema,
}
