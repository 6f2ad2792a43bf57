//! The aggregating error type for the extraction pipeline.
//!
//! One closed enum per crate, folded into a single top-level error via
//! `#[from]`. Only configuration-shaped failures reach the caller as
//! `Err`; per-document failures are reported inside a `PipelineResult`
//! with `status = failed` instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Cache(#[from] litextract_cache::CacheError),

    #[error(transparent)]
    Filter(#[from] litextract_filter::FilterError),

    #[error(transparent)]
    Classifier(#[from] litextract_filter::ClassifierError),

    #[error(transparent)]
    Tier(#[from] litextract_tiers::TierError),

    #[error(transparent)]
    Chunker(#[from] litextract_tiers::ChunkerError),

    #[error(transparent)]
    Validator(#[from] litextract_validator::ValidatorError),

    #[error(transparent)]
    Llm(#[from] litextract_llm::LlmError),
}
