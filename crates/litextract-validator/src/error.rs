//! Errors for the self-critic validator.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("validator backend call failed: {0}")]
    Backend(#[from] litextract_llm::LlmError),
}
