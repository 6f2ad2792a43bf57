//! Self-critic validator.
//!
//! Scores an extraction's accuracy and internal consistency with an LLM
//! call, penalized by a deterministic evidence-quote audit.

pub mod checker;
pub mod error;
pub mod evidence_audit;

pub use checker::SelfCriticValidator;
pub use error::ValidatorError;
pub use evidence_audit::{audit_evidence, EvidenceVerdict, DEFAULT_JACCARD_THRESHOLD};
