//! Core data model for the litextract extraction pipeline
//!
//! These types are the read-only contract between the core (filter,
//! classifier, tier cascade, validator, executor) and its external
//! collaborators (PDF parser, LLM transport, CSV/state sink). Nothing in
//! this crate performs I/O.

pub mod cache_entry;
pub mod document;
pub mod evidence;
pub mod fingerprint;
pub mod result;
pub mod schema;
pub mod tier;
pub mod value;

pub use cache_entry::CacheEntry;
pub use document::{Chunk, ParsedDocument, SectionTag};
pub use evidence::{EvidenceItem, ExtractionWithEvidence};
pub use fingerprint::Fingerprint;
pub use result::{
    CheckerResult, FieldVerdict, FilterStats, IterationRecord, PipelineResult, Scores,
    TerminalStatus,
};
pub use schema::{AggregationUnit, ExtractionPolicy, Field, FieldType, Schema};
pub use tier::Tier;
pub use value::{FindingStatus, FindingValue, Value};
