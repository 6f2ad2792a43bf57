//! Errors surfaced by the result cache.

use thiserror::Error;

/// Errors the cache can return. Most cache operations in the happy path do
/// not fail; these cover the corruption/contention edge cases.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cached entry for key {key} failed to deserialize: {reason}")]
    Corruption { key: String, reason: String },

    #[error("single-flight build for key {key} panicked or was cancelled before completion")]
    BuildAborted { key: String },
}
