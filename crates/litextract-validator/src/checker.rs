//! Self-critic validator: LLM-backed accuracy/consistency scoring plus the
//! deterministic evidence-quote audit.

use std::time::Duration;

use litextract_llm::{LlmBackend, Message, StructuredInvocation};
use litextract_types::{CheckerResult, ExtractionWithEvidence, FieldVerdict, Schema};
use serde::Deserialize;
use tracing::{info, warn};

use crate::evidence_audit::{audit_evidence, DEFAULT_JACCARD_THRESHOLD};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(45);
const DEFAULT_ACCURACY_WEIGHT: f64 = 0.6;
const DEFAULT_CONSISTENCY_WEIGHT: f64 = 0.4;
const DEFAULT_EVIDENCE_PENALTY: f64 = 0.8;

pub struct SelfCriticValidator<'a> {
    backend: &'a dyn LlmBackend,
    model: String,
    accuracy_weight: f64,
    consistency_weight: f64,
    evidence_penalty: f64,
    jaccard_threshold: f64,
}

impl<'a> SelfCriticValidator<'a> {
    #[must_use]
    pub fn new(backend: &'a dyn LlmBackend, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
            accuracy_weight: DEFAULT_ACCURACY_WEIGHT,
            consistency_weight: DEFAULT_CONSISTENCY_WEIGHT,
            evidence_penalty: DEFAULT_EVIDENCE_PENALTY,
            jaccard_threshold: DEFAULT_JACCARD_THRESHOLD,
        }
    }

    #[must_use]
    pub fn with_weights(mut self, accuracy_weight: f64, consistency_weight: f64) -> Self {
        self.accuracy_weight = accuracy_weight;
        self.consistency_weight = consistency_weight;
        self
    }

    #[must_use]
    pub fn with_evidence_penalty(mut self, penalty: f64) -> Self {
        self.evidence_penalty = penalty;
        self
    }

    /// Scores `extraction` against `source_chunks` and `theme`. Never
    /// returns an error: a backend failure is folded into a failed
    /// `CheckerResult` instead.
    pub async fn validate(
        &self,
        schema: &Schema,
        source_chunks: &[String],
        extraction: &ExtractionWithEvidence,
        theme: &str,
        threshold: f64,
    ) -> CheckerResult {
        let evidence_verdicts = audit_evidence(schema, extraction, source_chunks, self.jaccard_threshold);
        let evidence_failed = evidence_verdicts.iter().any(|v| !v.passed);

        let llm_scores = match self.call_backend(schema, source_chunks, extraction, theme).await {
            Ok(scores) => scores,
            Err(err) => {
                warn!(error = %err, "validator backend unreachable");
                return CheckerResult::unreachable_validator();
            }
        };

        let mut overall = self.accuracy_weight * llm_scores.accuracy + self.consistency_weight * llm_scores.consistency;
        let mut issues = llm_scores.issues;
        let mut suggestions = llm_scores.suggestions;
        let mut field_verdicts = llm_scores.field_verdicts;

        if evidence_failed {
            overall *= self.evidence_penalty;
            for verdict in &evidence_verdicts {
                if !verdict.passed {
                    issues.push(format!(
                        "evidence quote for '{}' did not match source text (similarity {:.2} < {:.2})",
                        verdict.field, verdict.similarity, self.jaccard_threshold
                    ));
                    suggestions.push(format!(
                        "For {}: re-quote a span that appears verbatim in the source context.",
                        verdict.field
                    ));
                    field_verdicts.insert(
                        verdict.field.clone(),
                        FieldVerdict {
                            passed: false,
                            note: Some("evidence quote failed verification".to_string()),
                        },
                    );
                }
            }
        }

        let passed = overall >= threshold && !evidence_failed;
        info!(passed, overall, "validation verdict");

        CheckerResult {
            passed,
            accuracy_score: llm_scores.accuracy,
            consistency_score: llm_scores.consistency,
            overall_score: overall,
            issues,
            suggestions,
            field_verdicts,
        }
    }

    async fn call_backend(
        &self,
        schema: &Schema,
        source_chunks: &[String],
        extraction: &ExtractionWithEvidence,
        theme: &str,
    ) -> Result<LlmScores, litextract_llm::LlmError> {
        let prompt = format!(
            "Theme: {theme}\nFields: {}\nExtracted values: {}\nSource:\n{}\n\nScore accuracy and consistency.",
            schema.field_keys().join(", "),
            serde_json::to_string(&extraction.values).unwrap_or_default(),
            source_chunks.join("\n")
        );
        let invocation = StructuredInvocation::new(
            "validator",
            self.model.clone(),
            DEFAULT_TIMEOUT,
            vec![Message::user(prompt)],
            llm_scores_schema(),
        );
        let result = self.backend.create_structured(invocation).await?;
        Ok(serde_json::from_value(result.object).unwrap_or_default())
    }
}

#[derive(Debug, Default, Deserialize)]
struct LlmScores {
    #[serde(default)]
    accuracy: f64,
    #[serde(default)]
    consistency: f64,
    #[serde(default)]
    issues: Vec<String>,
    #[serde(default)]
    suggestions: Vec<String>,
    #[serde(default)]
    field_verdicts: std::collections::HashMap<String, FieldVerdict>,
}

fn llm_scores_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "accuracy": { "type": "number", "minimum": 0.0, "maximum": 1.0 },
            "consistency": { "type": "number", "minimum": 0.0, "maximum": 1.0 },
            "issues": { "type": "array", "items": { "type": "string" } },
            "suggestions": { "type": "array", "items": { "type": "string" } },
            "field_verdicts": { "type": "object" }
        },
        "required": ["accuracy", "consistency"]
    })
}
