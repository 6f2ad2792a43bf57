//! Tier cascade and schema chunker.
//!
//! The field-level router between {regex, local LLM, cheap cloud LLM,
//! premium cloud LLM}, and the splitter that lets large schemas survive a
//! provider's grammar-state limits.

pub mod cascade;
pub mod error;
pub mod schema_chunker;

pub use cascade::{merge_by_precedence, FieldEscalation, TierBackends, TierCascade, TierModelNames};
pub use error::{ChunkerError, TierError};
pub use schema_chunker::{chunk_schema, merge_chunked, DEFAULT_MAX_FIELDS_PER_CHUNK};
