//! End-to-end scenarios driving `PipelineOrchestrator` with stub LLM
//! backends and an in-memory cache.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use litextract::{
    Chunk, Config, ContentFilter, ExtractionPolicy, Field, FieldType, LlmBackend, LlmError,
    ParsedDocument, PipelineOrchestrator, ResultCache, Schema, SectionTag, SelfCriticValidator,
    StructuredInvocation, StructuredResult, TierBackends, TierCascade, TierModelNames, Value,
};

fn age_schema() -> Schema {
    Schema::new(
        "case_report",
        1,
        vec![
            Field::new("age", FieldType::Scalar, "patient age", ExtractionPolicy::Inferable),
            Field::new("sex", FieldType::Scalar, "patient sex", ExtractionPolicy::Inferable),
        ],
    )
}

fn document() -> ParsedDocument {
    let chunks = vec![Chunk::new(
        "A 65-year-old male patient presented with cough.".to_string(),
        Some(SectionTag::Results),
        0,
    )];
    let full_text = chunks[0].text.clone();
    ParsedDocument::new("case.pdf", full_text, chunks)
}

fn model_names() -> TierModelNames {
    TierModelNames {
        local: "local-model".to_string(),
        cheap: "cheap-model".to_string(),
        premium: "premium-model".to_string(),
    }
}

/// Responds with a fixed extraction and a validator verdict that can be
/// toggled to fail on the first N calls before passing, to exercise the
/// iterate/revise loop.
struct ScriptedBackend {
    extraction: serde_json::Value,
    validator_calls: AtomicU32,
    fail_validator_times: u32,
}

impl ScriptedBackend {
    fn new(extraction: serde_json::Value, fail_validator_times: u32) -> Self {
        Self {
            extraction,
            validator_calls: AtomicU32::new(0),
            fail_validator_times,
        }
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    async fn create_structured(&self, inv: StructuredInvocation) -> Result<StructuredResult, LlmError> {
        let object = match inv.document_id.as_str() {
            "tier-cascade" => self.extraction.clone(),
            "validator" => {
                let call = self.validator_calls.fetch_add(1, Ordering::SeqCst);
                if call < self.fail_validator_times {
                    serde_json::json!({
                        "accuracy": 0.4, "consistency": 0.4,
                        "issues": ["low confidence"], "suggestions": ["re-check the source"],
                        "field_verdicts": {}
                    })
                } else {
                    serde_json::json!({
                        "accuracy": 0.95, "consistency": 0.95,
                        "issues": [], "suggestions": [], "field_verdicts": {}
                    })
                }
            }
            other => serde_json::json!({"score": 0.9, "rationale": other, "matching_field_keys": []}),
        };
        Ok(StructuredResult {
            object,
            model_used: "stub".to_string(),
            tokens_input: Some(5),
            tokens_output: Some(5),
        })
    }
}

fn full_extraction() -> serde_json::Value {
    serde_json::json!({
        "values": {
            "age": {"kind": "scalar", "data": "65"},
            "sex": {"kind": "scalar", "data": "male"}
        },
        "evidence": [
            {"field": "age", "quote": "65-year-old", "chunk_index": 0, "confidence": 0.9},
            {"field": "sex", "quote": "male patient", "chunk_index": 0, "confidence": 0.9}
        ]
    })
}

#[tokio::test]
async fn scenario_straight_through_success() {
    let backend = ScriptedBackend::new(full_extraction(), 0);
    let cache = ResultCache::new();
    let filter = ContentFilter::new().unwrap();
    let cascade = TierCascade::new(
        TierBackends {
            local: Some(&backend),
            cheap: None,
            premium: None,
        },
        false,
        litextract::Tier::Local,
    );
    let validator = SelfCriticValidator::new(&backend, "model");
    let orchestrator = PipelineOrchestrator::new(Config::default(), &cache, filter, None, cascade, validator, model_names());

    let result = orchestrator.extract_async(&document(), &age_schema(), "case reports").await.unwrap();
    assert!(result.is_success());
    assert_eq!(result.iteration_count(), 1);
    assert_eq!(result.values.get("age"), Some(&Value::Scalar("65".to_string())));
}

#[tokio::test]
async fn scenario_validator_driven_revision() {
    let backend = ScriptedBackend::new(full_extraction(), 2);
    let cache = ResultCache::new();
    let filter = ContentFilter::new().unwrap();
    let cascade = TierCascade::new(
        TierBackends {
            local: Some(&backend),
            cheap: None,
            premium: None,
        },
        false,
        litextract::Tier::Local,
    );
    let validator = SelfCriticValidator::new(&backend, "model");
    let orchestrator = PipelineOrchestrator::new(Config::default(), &cache, filter, None, cascade, validator, model_names());

    let result = orchestrator.extract_async(&document(), &age_schema(), "case reports").await.unwrap();
    assert!(result.is_success());
    assert_eq!(result.iteration_count(), 3);
}

#[tokio::test]
async fn scenario_exhausts_iterations_and_reports_partial() {
    let backend = ScriptedBackend::new(full_extraction(), u32::MAX);
    let cache = ResultCache::new();
    let filter = ContentFilter::new().unwrap();
    let cascade = TierCascade::new(
        TierBackends {
            local: Some(&backend),
            cheap: None,
            premium: None,
        },
        false,
        litextract::Tier::Local,
    );
    let validator = SelfCriticValidator::new(&backend, "model");
    let mut config = Config::default();
    config.max_iterations = 2;
    let orchestrator = PipelineOrchestrator::new(config, &cache, filter, None, cascade, validator, model_names());

    let result = orchestrator.extract_async(&document(), &age_schema(), "case reports").await.unwrap();
    assert!(!result.is_success());
    assert_eq!(result.iteration_count(), 2);
    assert!(!result.values.is_empty());
}

#[tokio::test]
async fn scenario_tier_escalation_prefers_cheap_over_local() {
    let local_extraction = serde_json::json!({
        "values": {"age": {"kind": "scalar", "data": "unknown"}},
        "evidence": [{"field": "age", "quote": "uncertain", "chunk_index": 0, "confidence": 0.2}]
    });
    let cheap_extraction = serde_json::json!({
        "values": {"age": {"kind": "scalar", "data": "65"}},
        "evidence": [{"field": "age", "quote": "65-year-old", "chunk_index": 0, "confidence": 0.95}]
    });

    struct TwoTierBackend {
        object: serde_json::Value,
        validator_pass: bool,
    }

    #[async_trait]
    impl LlmBackend for TwoTierBackend {
        async fn create_structured(&self, inv: StructuredInvocation) -> Result<StructuredResult, LlmError> {
            let object = match inv.document_id.as_str() {
                "tier-cascade" => self.object.clone(),
                "validator" => {
                    if self.validator_pass {
                        serde_json::json!({"accuracy": 0.95, "consistency": 0.95, "issues": [], "suggestions": [], "field_verdicts": {}})
                    } else {
                        serde_json::json!({"accuracy": 0.1, "consistency": 0.1, "issues": [], "suggestions": [], "field_verdicts": {}})
                    }
                }
                other => serde_json::json!({"score": 0.9, "rationale": other, "matching_field_keys": []}),
            };
            Ok(StructuredResult { object, model_used: "stub".to_string(), tokens_input: None, tokens_output: None })
        }
    }

    let local = TwoTierBackend { object: local_extraction, validator_pass: true };
    let cheap = TwoTierBackend { object: cheap_extraction, validator_pass: true };

    let cache = ResultCache::new();
    let filter = ContentFilter::new().unwrap();
    let cascade = TierCascade::new(
        TierBackends {
            local: Some(&local),
            cheap: Some(&cheap),
            premium: None,
        },
        true,
        litextract::Tier::Local,
    );
    let validator = SelfCriticValidator::new(&local, "model");
    let schema = Schema::new(
        "s",
        1,
        vec![Field::new("age", FieldType::Scalar, "patient age", ExtractionPolicy::Inferable)],
    );
    let orchestrator = PipelineOrchestrator::new(Config::default(), &cache, filter, None, cascade, validator, model_names());

    let result = orchestrator.extract_async(&document(), &schema, "case reports").await.unwrap();
    assert_eq!(result.values.get("age"), Some(&Value::Scalar("65".to_string())));
}

#[tokio::test]
async fn scenario_cache_single_flight_builds_once_under_concurrency() {
    struct CountingBackend {
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl LlmBackend for CountingBackend {
        async fn create_structured(&self, inv: StructuredInvocation) -> Result<StructuredResult, LlmError> {
            let object = match inv.document_id.as_str() {
                "tier-cascade" => {
                    self.calls.fetch_add(1, Ordering::SeqCst);
                    full_extraction()
                }
                "validator" => serde_json::json!({"accuracy": 0.9, "consistency": 0.9, "issues": [], "suggestions": [], "field_verdicts": {}}),
                other => serde_json::json!({"score": 0.9, "rationale": other, "matching_field_keys": []}),
            };
            Ok(StructuredResult { object, model_used: "stub".to_string(), tokens_input: None, tokens_output: None })
        }
    }

    let calls = Arc::new(AtomicU32::new(0));
    let backend = CountingBackend { calls: calls.clone() };
    let cache = ResultCache::new();
    let filter = ContentFilter::new().unwrap();
    let cascade = TierCascade::new(
        TierBackends {
            local: Some(&backend),
            cheap: None,
            premium: None,
        },
        false,
        litextract::Tier::Local,
    );
    let validator = SelfCriticValidator::new(&backend, "model");
    let orchestrator = PipelineOrchestrator::new(Config::default(), &cache, filter, None, cascade, validator, model_names());

    let doc = document();
    let schema = age_schema();
    let (a, b) = tokio::join!(
        orchestrator.extract_async(&doc, &schema, "case reports"),
        orchestrator.extract_async(&doc, &schema, "case reports"),
    );
    let a = a.unwrap();
    let b = b.unwrap();
    assert!(a.is_success());
    assert!(b.is_success());
    assert_eq!(calls.load(Ordering::SeqCst), 1, "single-flight should only call the backend once for the same document+schema");
}

#[test]
fn scenario_fingerprint_is_stable_across_formatting_noise() {
    let a = litextract::Fingerprint::compute("A 65-year-old male.\n14\nMore text here.");
    let b = litextract::Fingerprint::compute("a   65-year-old   male.\nmore text here.");
    assert_eq!(a, b);
}
