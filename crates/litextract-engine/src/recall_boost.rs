//! Recall-boost candidate selection.
//!
//! After a passing validation, fields that look omitted rather than
//! confidently answered are re-tried once more with a recall-focused
//! prompt. A field whose value is an explicit `NotReported` finding is a
//! confident negative, not an omission, and is left alone; see
//! `is_boost_candidate` for the exact rule.

use litextract_types::{ExtractionPolicy, ExtractionWithEvidence, FindingStatus, Schema, Value};

/// Returns the keys of `schema` fields that look omitted in `extraction`
/// and are eligible for a recall-boost re-try.
///
/// `Derived` and `HumanReview` fields are never sent to an LLM and are
/// always excluded, regardless of their current value.
#[must_use]
pub fn boost_candidates(schema: &Schema, extraction: &ExtractionWithEvidence) -> Vec<String> {
    schema
        .fields
        .iter()
        .filter(|f| !matches!(f.policy, ExtractionPolicy::Derived | ExtractionPolicy::HumanReview))
        .filter(|f| is_boost_candidate(extraction.values.get(&f.key)))
        .map(|f| f.key.clone())
        .collect()
}

/// A field is a boost candidate when it was never filled in or came back
/// empty. A `Finding` whose status is explicitly `NotReported` is treated
/// as a confident negative answer, not an omission, and does not qualify
/// even though it reads as "missing" by the data model's own definition.
fn is_boost_candidate(value: Option<&Value>) -> bool {
    match value {
        None => true,
        Some(Value::Missing) => true,
        Some(Value::Scalar(s) | Value::FreeText(s)) => s.trim().is_empty(),
        Some(Value::Numeric { .. }) => false,
        Some(Value::Finding(finding)) => finding.status != FindingStatus::NotReported && finding.n.is_none() && finding.big_n.is_none(),
    }
}
