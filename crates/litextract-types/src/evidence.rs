//! Evidence-backed extraction output.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One quoted span supporting a field's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub field: String,
    pub quote: String,
    pub chunk_index: usize,
    pub confidence: f64,
}

impl EvidenceItem {
    #[must_use]
    pub fn new(field: impl Into<String>, quote: impl Into<String>, chunk_index: usize, confidence: f64) -> Self {
        Self {
            field: field.into(),
            quote: quote.into(),
            chunk_index,
            confidence,
        }
    }
}

/// Output of one LLM extraction call: values plus parallel evidence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionWithEvidence {
    pub values: HashMap<String, Value>,
    pub evidence: Vec<EvidenceItem>,
}

impl ExtractionWithEvidence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn evidence_for(&self, field: &str) -> Option<&EvidenceItem> {
        self.evidence.iter().find(|e| e.field == field)
    }

    /// Merge `other` into `self`, with `other`'s values taking precedence
    /// for keys present in both. Used to fold in recall-boost revisions and
    /// schema-chunker sub-schema results.
    pub fn merge(&mut self, other: ExtractionWithEvidence) {
        for (key, value) in other.values {
            self.values.insert(key, value);
        }
        for item in other.evidence {
            self.evidence.retain(|e| e.field != item.field);
            self.evidence.push(item);
        }
    }
}
