//! Deterministic evidence-quote audit: fuzzy substring check by
//! token-set Jaccard similarity.

use std::collections::HashSet;

use litextract_types::{ExtractionWithEvidence, Schema};

/// Default similarity floor below which a quote fails the audit.
pub const DEFAULT_JACCARD_THRESHOLD: f64 = 0.6;

/// Outcome of auditing one field requiring a quote.
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceVerdict {
    pub field: String,
    pub similarity: f64,
    pub passed: bool,
}

/// Audits every field in `schema` that requires a quote, comparing its
/// evidence item (if any) against the concatenation of `source_chunks`.
/// A field with no evidence item fails outright.
#[must_use]
pub fn audit_evidence(
    schema: &Schema,
    extraction: &ExtractionWithEvidence,
    source_chunks: &[String],
    threshold: f64,
) -> Vec<EvidenceVerdict> {
    let source_tokens = tokenize(&source_chunks.join(" "));

    schema
        .fields
        .iter()
        .filter(|f| f.requires_quote)
        .map(|field| match extraction.evidence_for(&field.key) {
            Some(item) if !item.quote.trim().is_empty() => {
                let similarity = jaccard_similarity(&tokenize(&item.quote), &source_tokens);
                EvidenceVerdict {
                    field: field.key.clone(),
                    similarity,
                    passed: similarity >= threshold,
                }
            }
            _ => EvidenceVerdict {
                field: field.key.clone(),
                similarity: 0.0,
                passed: false,
            },
        })
        .collect()
}

fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

fn jaccard_similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn jaccard_similarity_is_bounded_and_symmetric(a in "[a-z ]{0,40}", b in "[a-z ]{0,40}") {
            let ta = tokenize(&a);
            let tb = tokenize(&b);
            let sim_ab = jaccard_similarity(&ta, &tb);
            let sim_ba = jaccard_similarity(&tb, &ta);
            prop_assert!((0.0..=1.0).contains(&sim_ab));
            prop_assert!((sim_ab - sim_ba).abs() < 1e-12);
        }

        #[test]
        fn identical_text_is_maximally_similar(a in "[a-z ]{1,40}") {
            let tokens = tokenize(&a);
            prop_assume!(!tokens.is_empty());
            prop_assert!((jaccard_similarity(&tokens, &tokens) - 1.0).abs() < 1e-12);
        }
    }
}
