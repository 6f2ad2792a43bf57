//! Tier-0 deterministic pre-fill: regex extractors for DOI, year,
//! sample-size markers, and first-author heuristic.
//!
//! Fields whose regex match meets the tier-0 lock threshold are returned
//! alongside a `locked` set; the caller is responsible for re-asserting
//! locked fields into the result after the LLM call.

use std::collections::HashSet;
use std::sync::LazyLock;

use litextract_types::{EvidenceItem, ExtractionWithEvidence, Schema, Tier, Value};
use regex::Regex;

static DOI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b10\.\d{4,9}/[^\s,;]+\b").expect("valid regex"));
static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(19|20)\d{2}\b").expect("valid regex"));
static SAMPLE_SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bN\s*=\s*(\d+)\b").expect("valid regex"));
static FIRST_AUTHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z][a-z]+)\s+et\s+al\.?").expect("valid regex"));

/// Well-known field keys the tier-0 pre-fill recognizes. A schema is free
/// to not declare any of these; the pre-fill simply contributes nothing
/// for fields it doesn't recognize.
pub const DOI_FIELD_KEY: &str = "doi";
pub const YEAR_FIELD_KEY: &str = "year";
pub const SAMPLE_SIZE_FIELD_KEY: &str = "sample_size";
pub const FIRST_AUTHOR_FIELD_KEY: &str = "first_author";

/// Result of one tier-0 pass: the extracted values plus which field keys
/// are locked (regex confidence met the lock threshold).
pub struct PrefillResult {
    pub extraction: ExtractionWithEvidence,
    pub locked: HashSet<String>,
}

impl PrefillResult {
    /// The subset of `extraction` whose keys are in `locked`. This, not the
    /// full `extraction`, is what the tier cascade merges in under
    /// `Tier::Regex`: a sub-threshold regex match that never earned a lock
    /// has no business overriding an LLM result.
    #[must_use]
    pub fn locked_extraction(&self) -> ExtractionWithEvidence {
        let mut out = ExtractionWithEvidence::new();
        for key in &self.locked {
            if let Some(value) = self.extraction.values.get(key) {
                out.values.insert(key.clone(), value.clone());
            }
            if let Some(item) = self.extraction.evidence.iter().find(|e| &e.field == key) {
                out.evidence.push(item.clone());
            }
        }
        out
    }
}

/// Runs all tier-0 extractors over `full_text`, keeping only fields that
/// `schema` actually declares.
#[must_use]
pub fn prefill(full_text: &str, schema: &Schema) -> PrefillResult {
    let mut extraction = ExtractionWithEvidence::new();
    let mut locked = HashSet::new();
    let lock_threshold = Tier::Regex.accept_threshold_default();

    if schema.field(DOI_FIELD_KEY).is_some() {
        if let Some(m) = DOI_RE.find(full_text) {
            insert(&mut extraction, &mut locked, DOI_FIELD_KEY, m.as_str(), 0.95, lock_threshold);
        }
    }
    if schema.field(YEAR_FIELD_KEY).is_some() {
        if let Some(m) = YEAR_RE.find(full_text) {
            insert(&mut extraction, &mut locked, YEAR_FIELD_KEY, m.as_str(), 0.92, lock_threshold);
        }
    }
    if schema.field(SAMPLE_SIZE_FIELD_KEY).is_some() {
        if let Some(caps) = SAMPLE_SIZE_RE.captures(full_text) {
            let quote = caps.get(0).unwrap().as_str();
            let value = caps.get(1).unwrap().as_str();
            insert_value(
                &mut extraction,
                &mut locked,
                SAMPLE_SIZE_FIELD_KEY,
                Value::Scalar(value.to_string()),
                quote,
                0.93,
                lock_threshold,
            );
        }
    }
    if schema.field(FIRST_AUTHOR_FIELD_KEY).is_some() {
        if let Some(caps) = FIRST_AUTHOR_RE.captures(full_text) {
            let name = caps.get(1).unwrap().as_str();
            let quote = caps.get(0).unwrap().as_str();
            insert(&mut extraction, &mut locked, FIRST_AUTHOR_FIELD_KEY, quote, 0.90, lock_threshold);
            if let Some(Value::Scalar(v)) = extraction.values.get_mut(FIRST_AUTHOR_FIELD_KEY) {
                *v = name.to_string();
            }
        }
    }

    PrefillResult { extraction, locked }
}

fn insert(
    extraction: &mut ExtractionWithEvidence,
    locked: &mut HashSet<String>,
    field: &str,
    quote: &str,
    confidence: f64,
    lock_threshold: f64,
) {
    insert_value(extraction, locked, field, Value::Scalar(quote.to_string()), quote, confidence, lock_threshold);
}

fn insert_value(
    extraction: &mut ExtractionWithEvidence,
    locked: &mut HashSet<String>,
    field: &str,
    value: Value,
    quote: &str,
    confidence: f64,
    lock_threshold: f64,
) {
    extraction.values.insert(field.to_string(), value);
    extraction.evidence.push(EvidenceItem::new(field, quote, 0, confidence));
    if confidence >= lock_threshold {
        locked.insert(field.to_string());
    }
}
