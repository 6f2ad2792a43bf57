//! Aggregated library surface for the litextract extraction pipeline.
//!
//! Re-exports the pieces most callers need so that wiring the pipeline up
//! doesn't require depending on every member crate directly.

pub use litextract_cache::{CacheError, ResultCache};
pub use litextract_config::{Config, ConfigError};
pub use litextract_engine::{ExtractorError, PipelineOrchestrator};
pub use litextract_filter::{ClassifierError, ContentFilter, FilterError, RelevanceClassifier};
pub use litextract_llm::{LlmBackend, LlmError, Message, StructuredInvocation, StructuredResult};
pub use litextract_tiers::{FieldEscalation, TierBackends, TierCascade, TierModelNames};
pub use litextract_types::{
    AggregationUnit, CheckerResult, Chunk, EvidenceItem, ExtractionPolicy, ExtractionWithEvidence,
    Field, FieldType, Fingerprint, ParsedDocument, PipelineResult, Schema, SectionTag, Tier,
    TerminalStatus, Value,
};
pub use litextract_validator::SelfCriticValidator;
