//! Per-document results: validator verdicts, iteration history, pipeline output.

use crate::evidence::EvidenceItem;
use crate::fingerprint::Fingerprint;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-field accuracy/consistency verdict from the validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldVerdict {
    pub passed: bool,
    pub note: Option<String>,
}

/// Validator (self-critic) output for one iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckerResult {
    pub passed: bool,
    pub accuracy_score: f64,
    pub consistency_score: f64,
    pub overall_score: f64,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
    pub field_verdicts: HashMap<String, FieldVerdict>,
}

impl CheckerResult {
    #[must_use]
    pub fn unreachable_validator() -> Self {
        Self {
            passed: false,
            accuracy_score: 0.0,
            consistency_score: 0.0,
            overall_score: 0.0,
            issues: vec!["validator unreachable".to_string()],
            suggestions: Vec::new(),
            field_verdicts: HashMap::new(),
        }
    }

    /// A trivially passing verdict for the cases where no validator call is
    /// ever made because there was nothing to validate (e.g. a zero-field
    /// schema).
    #[must_use]
    pub fn vacuous_pass() -> Self {
        Self {
            passed: true,
            accuracy_score: 1.0,
            consistency_score: 1.0,
            overall_score: 1.0,
            issues: Vec::new(),
            suggestions: Vec::new(),
            field_verdicts: HashMap::new(),
        }
    }

    /// A verdict for the cases where extraction never reached the validator
    /// at all (e.g. empty context after filtering), distinct from
    /// `unreachable_validator` which implies a backend call was attempted
    /// and failed.
    #[must_use]
    pub fn not_attempted(reason: impl Into<String>) -> Self {
        Self {
            passed: false,
            accuracy_score: 0.0,
            consistency_score: 0.0,
            overall_score: 0.0,
            issues: vec![reason.into()],
            suggestions: Vec::new(),
            field_verdicts: HashMap::new(),
        }
    }
}

/// Component scores recorded for one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub accuracy: f64,
    pub consistency: f64,
    pub overall: f64,
}

/// Per-attempt history within one document's extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iteration: u32,
    pub scores: Scores,
    pub issue_count: usize,
    pub suggestions: Vec<String>,
}

/// Statistics from the content filter / relevance classifier stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterStats {
    pub chars_in: usize,
    pub chars_out: usize,
    pub sections_dropped: usize,
    pub chunks_classified: usize,
    pub chunks_kept: usize,
}

/// Terminal outcome of one document's extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TerminalStatus {
    Success,
    Partial,
    Failed { reason: String },
}

/// Per-document extraction result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub document_id: String,
    pub values: HashMap<String, Value>,
    pub evidence: Vec<EvidenceItem>,
    pub checker: CheckerResult,
    pub iterations: Vec<IterationRecord>,
    pub filter_stats: FilterStats,
    pub fingerprint: Fingerprint,
    pub cached: bool,
    pub status: TerminalStatus,
}

impl PipelineResult {
    #[must_use]
    pub fn iteration_count(&self) -> u32 {
        self.iterations.len() as u32
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.status, TerminalStatus::Success)
    }

    /// Clone this result and mark it as served from cache.
    #[must_use]
    pub fn as_cached(&self) -> Self {
        let mut clone = self.clone();
        clone.cached = true;
        clone
    }
}
