//! Pipeline Orchestrator and Extraction Executor.
//!
//! Wires the cache, content filter, relevance classifier, tier cascade,
//! and self-critic validator crates into the single state machine that
//! turns a parsed document into a `PipelineResult`.

pub mod audit;
pub mod context;
pub mod error;
pub mod orchestrator;
pub mod recall_boost;
pub mod regex_prefill;

pub use context::{prepare_context, PreparedContext};
pub use error::ExtractorError;
pub use orchestrator::PipelineOrchestrator;
pub use recall_boost::boost_candidates;
pub use regex_prefill::{prefill, PrefillResult};
