//! Content filter and relevance classifier.
//!
//! Deterministic pruning (strip references, acknowledgments, boilerplate)
//! followed by probabilistic per-chunk relevance scoring against the
//! target schema and review theme, producing the reduced context fed to
//! the LLM.

pub mod classifier;
pub mod content_filter;
pub mod error;

pub use classifier::{ChunkRelevance, ClassificationOutcome, RelevanceClassifier};
pub use content_filter::ContentFilter;
pub use error::{ClassifierError, FilterError};
