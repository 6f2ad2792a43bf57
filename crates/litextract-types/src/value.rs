//! Extracted field values.

use crate::schema::AggregationUnit;
use serde::{Deserialize, Serialize};

/// Presence/frequency status of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingStatus {
    Present,
    Absent,
    NotReported,
    Unclear,
}

/// A structured value capturing binary presence with frequency.
///
/// Invariant: `n <= N`, and when `aggregation_unit == Patient` and a cohort
/// size is known, `N <= cohort_size`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindingValue {
    pub status: FindingStatus,
    pub n: Option<u32>,
    pub big_n: Option<u32>,
    pub aggregation_unit: Option<AggregationUnit>,
    pub evidence_quote: Option<String>,
}

impl FindingValue {
    #[must_use]
    pub fn not_reported() -> Self {
        Self {
            status: FindingStatus::NotReported,
            n: None,
            big_n: None,
            aggregation_unit: None,
            evidence_quote: None,
        }
    }

    /// `true` unless the n/N relationship is internally contradictory.
    #[must_use]
    pub fn respects_denominator(&self) -> bool {
        match (self.n, self.big_n) {
            (Some(n), Some(big_n)) => n <= big_n,
            _ => true,
        }
    }

    #[must_use]
    pub fn respects_cohort_size(&self, cohort_size: Option<u32>) -> bool {
        match (self.aggregation_unit, self.big_n, cohort_size) {
            (Some(AggregationUnit::Patient), Some(big_n), Some(cohort_size)) => {
                big_n <= cohort_size
            }
            _ => true,
        }
    }
}

/// The value extracted for one field.
///
/// Adjacently tagged (`kind` + `data`) rather than internally tagged:
/// `Scalar`/`FreeText` wrap a bare string, which an internally tagged
/// representation cannot merge a discriminant into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Value {
    Scalar(String),
    Numeric { value: f64, unit: Option<String> },
    Finding(FindingValue),
    FreeText(String),
    Missing,
}

impl Value {
    #[must_use]
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Scalar(s) | Value::FreeText(s) => s.trim().is_empty(),
            Value::Finding(f) => f.status == FindingStatus::NotReported && f.n.is_none(),
            Value::Numeric { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finding_denominator_invariant() {
        let bad = FindingValue {
            status: FindingStatus::Present,
            n: Some(5),
            big_n: Some(3),
            aggregation_unit: Some(AggregationUnit::Patient),
            evidence_quote: None,
        };
        assert!(!bad.respects_denominator());
    }

    #[test]
    fn cohort_size_invariant() {
        let value = FindingValue {
            status: FindingStatus::Present,
            n: Some(2),
            big_n: Some(10),
            aggregation_unit: Some(AggregationUnit::Patient),
            evidence_quote: None,
        };
        assert!(!value.respects_cohort_size(Some(5)));
        assert!(value.respects_cohort_size(Some(10)));
        assert!(value.respects_cohort_size(None));
    }

    #[test]
    fn missing_detection() {
        assert!(Value::Missing.is_missing());
        assert!(Value::Scalar(String::new()).is_missing());
        assert!(!Value::Scalar("x".to_string()).is_missing());
    }
}
