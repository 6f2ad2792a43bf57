//! Relevance classifier: per-chunk LLM scoring against a theme and schema.

use std::time::Duration;

use litextract_llm::{LlmBackend, Message, StructuredInvocation};
use litextract_types::Chunk;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ClassifierError;

/// Chunks longer than this are truncated before prompting, so the same
/// `(chunk, theme, field_keys)` always produces the same classification
/// regardless of how long the chunk actually is.
const CLASSIFIER_PREFIX_CHARS: usize = 2_000;

/// Default timeout for a single classification call.
const CLASSIFIER_TIMEOUT: Duration = Duration::from_secs(20);

/// Per-chunk relevance verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRelevance {
    pub score: f64,
    pub rationale: String,
    pub matching_field_keys: Vec<String>,
}

/// Outcome of classifying one chunk, distinguishing a real verdict from a
/// conservative keep issued after a classifier failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationOutcome {
    pub kept: bool,
    pub relevance: Option<ChunkRelevance>,
}

pub struct RelevanceClassifier<'a> {
    backend: &'a dyn LlmBackend,
    model: String,
    threshold: f64,
}

impl<'a> RelevanceClassifier<'a> {
    #[must_use]
    pub fn new(backend: &'a dyn LlmBackend, model: impl Into<String>, threshold: f64) -> Self {
        Self {
            backend,
            model: model.into(),
            threshold,
        }
    }

    /// Classifies a single chunk against `theme` and `field_keys`.
    ///
    /// Per the failure policy, a backend failure never
    /// propagates as a hard error here: the chunk is kept conservatively
    /// and the outcome carries no relevance verdict.
    pub async fn classify(&self, chunk: &Chunk, theme: &str, field_keys: &[String]) -> ClassificationOutcome {
        match self.classify_inner(chunk, theme, field_keys).await {
            Ok(relevance) => ClassificationOutcome {
                kept: relevance.score >= self.threshold,
                relevance: Some(relevance),
            },
            Err(err) => {
                warn!(error = %err, "relevance classifier failed; keeping chunk conservatively");
                ClassificationOutcome {
                    kept: true,
                    relevance: None,
                }
            }
        }
    }

    async fn classify_inner(
        &self,
        chunk: &Chunk,
        theme: &str,
        field_keys: &[String],
    ) -> Result<ChunkRelevance, ClassifierError> {
        let truncated: String = chunk.text.chars().take(CLASSIFIER_PREFIX_CHARS).collect();
        let prompt = format!(
            "Theme: {theme}\nTarget fields: {}\nChunk:\n{truncated}\n\nScore this chunk's relevance to the theme and fields.",
            field_keys.join(", ")
        );
        let invocation = StructuredInvocation::new(
            "classifier",
            self.model.clone(),
            CLASSIFIER_TIMEOUT,
            vec![Message::user(prompt)],
            relevance_schema(),
        );
        let result = self.backend.create_structured(invocation).await?;
        serde_json::from_value(result.object).map_err(|_| ClassifierError::MissingScore)
    }
}

fn relevance_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "score": { "type": "number", "minimum": 0.0, "maximum": 1.0 },
            "rationale": { "type": "string" },
            "matching_field_keys": { "type": "array", "items": { "type": "string" } }
        },
        "required": ["score", "rationale", "matching_field_keys"]
    })
}
