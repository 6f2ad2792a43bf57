//! Errors for the content filter and relevance classifier.

use thiserror::Error;

/// Content Filter failures. Per the failure policy, a
/// `FilterError` never aborts extraction: the caller falls back to the
/// unfiltered document and attaches a warning.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("boilerplate pattern failed to compile: {0}")]
    InvalidPattern(String),
}

/// Relevance Classifier failures. Per the same failure policy, a chunk is
/// kept conservatively when classification fails rather than propagating.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier backend call failed: {0}")]
    Backend(#[from] litextract_llm::LlmError),

    #[error("classifier response did not contain a relevance score for the chunk")]
    MissingScore,
}
