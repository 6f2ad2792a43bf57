//! Pipeline Orchestrator: the extraction state machine.
//!
//! fingerprint -> cache check -> context preparation -> tier-0 pre-fill ->
//! iterate{extract, validate, revise} -> recall boost -> finalize. A single
//! async implementation backs both the async and blocking entry points, per
//! the sync/async duality the LLM transport crate already establishes.

use std::collections::HashMap;

use litextract_cache::{ResultCache, WholeDocumentKey};
use litextract_config::Config;
use litextract_filter::{ContentFilter, RelevanceClassifier};
use litextract_tiers::{chunk_schema, merge_by_precedence, merge_chunked, TierCascade, TierModelNames};
use litextract_types::{
    CheckerResult, ExtractionWithEvidence, IterationRecord, ParsedDocument, PipelineResult,
    Schema, Scores, Tier, TerminalStatus,
};
use litextract_validator::SelfCriticValidator;

use crate::audit;
use crate::error::ExtractorError;
use crate::recall_boost::boost_candidates;
use crate::regex_prefill::{self, PrefillResult};

/// Owns the collaborators for one pipeline run: cache, filter, classifier,
/// tier cascade, validator. Constructed once per process and reused across
/// documents.
pub struct PipelineOrchestrator<'a> {
    config: Config,
    cache: &'a ResultCache,
    filter: ContentFilter,
    classifier: Option<RelevanceClassifier<'a>>,
    cascade: TierCascade<'a>,
    validator: SelfCriticValidator<'a>,
    model_names: TierModelNames,
}

impl<'a> PipelineOrchestrator<'a> {
    #[must_use]
    pub fn new(
        config: Config,
        cache: &'a ResultCache,
        filter: ContentFilter,
        classifier: Option<RelevanceClassifier<'a>>,
        cascade: TierCascade<'a>,
        validator: SelfCriticValidator<'a>,
        model_names: TierModelNames,
    ) -> Self {
        let cascade = cascade.with_config(&config);
        Self {
            config,
            cache,
            filter,
            classifier,
            cascade,
            validator,
            model_names,
        }
    }

    pub fn set_hybrid_mode(&mut self, enabled: bool) {
        self.cascade.set_hybrid_mode(enabled);
    }

    /// Runs the full pipeline for one document.
    ///
    /// # Errors
    /// Returns `ExtractorError` on a configuration-shaped failure (empty
    /// schema, missing tier backend). Per-document LLM/validator failures
    /// are absorbed into a `Failed`/`Partial` `PipelineResult` instead.
    pub async fn extract_async(
        &self,
        document: &ParsedDocument,
        schema: &Schema,
        theme: &str,
    ) -> Result<PipelineResult, ExtractorError> {
        let fingerprint = litextract_types::Fingerprint::compute(&document.full_text);
        let key = WholeDocumentKey {
            fingerprint,
            schema_version: schema.version.to_string(),
        };

        if let Some(hit) = self.cache.lookup_pipeline_result(&key).await {
            audit::cache_hit(&document.filename);
            return Ok(hit);
        }
        audit::cache_miss(&document.filename);

        let document_id = document.filename.clone();
        self.cache
            .get_or_build_pipeline_result(key, || {
                self.build_result(document, schema, theme, fingerprint, document_id)
            })
            .await
    }

    /// Blocking entry point: drives [`Self::extract_async`] to completion on
    /// a dedicated current-thread runtime, mirroring `BlockingLlmClient`.
    ///
    /// # Errors
    /// See [`Self::extract_async`].
    pub fn extract(
        &self,
        document: &ParsedDocument,
        schema: &Schema,
        theme: &str,
    ) -> Result<PipelineResult, ExtractorError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| ExtractorError::InvalidInput(format!("failed to start runtime: {e}")))?;
        rt.block_on(self.extract_async(document, schema, theme))
    }

    async fn build_result(
        &self,
        document: &ParsedDocument,
        schema: &Schema,
        theme: &str,
        fingerprint: litextract_types::Fingerprint,
        document_id: String,
    ) -> Result<PipelineResult, ExtractorError> {
        audit::extraction_started(&document_id);

        if schema.fields.is_empty() {
            audit::extraction_finished(&document_id, "success", 0);
            return Ok(PipelineResult {
                document_id,
                values: HashMap::new(),
                evidence: Vec::new(),
                checker: CheckerResult::vacuous_pass(),
                iterations: Vec::new(),
                filter_stats: litextract_types::FilterStats::default(),
                fingerprint,
                cached: false,
                status: TerminalStatus::Success,
            });
        }

        let prepared = crate::context::prepare_context(
            document,
            schema,
            theme,
            &self.filter,
            self.classifier.as_ref(),
            self.config.max_context_chars,
        )
        .await;

        if prepared.text.trim().is_empty() {
            audit::extraction_finished(&document_id, "failed", 0);
            return Ok(PipelineResult {
                document_id,
                values: HashMap::new(),
                evidence: Vec::new(),
                checker: CheckerResult::not_attempted("no relevant chunks"),
                iterations: Vec::new(),
                filter_stats: prepared.stats,
                fingerprint,
                cached: false,
                status: TerminalStatus::Failed {
                    reason: "no relevant chunks".to_string(),
                },
            });
        }

        let sub_schemas = chunk_schema(schema, self.config.max_fields_per_chunk)?;
        let mut sub_extractions = Vec::with_capacity(sub_schemas.len());
        let mut sub_checkers = Vec::with_capacity(sub_schemas.len());
        let mut iterations_all = Vec::new();

        for sub_schema in &sub_schemas {
            let prefill = regex_prefill::prefill(&document.full_text, sub_schema);
            let (extraction, checker, iterations) = self
                .run_iterations(sub_schema, &prepared.text, &prepared.source_chunks, theme, &prefill, &document_id)
                .await?;
            sub_extractions.push(extraction);
            sub_checkers.push(checker);
            iterations_all.extend(iterations);
        }

        let mut merged = merge_chunked(sub_extractions);
        let checker = combine_checker_results(sub_checkers);

        if self.config.recall_boost_enabled && checker.passed {
            self.apply_recall_boost(schema, &prepared.text, &mut merged, &document_id).await?;
        }

        let status = if checker.passed {
            TerminalStatus::Success
        } else if !merged.values.is_empty() {
            TerminalStatus::Partial
        } else {
            TerminalStatus::Failed {
                reason: "validator did not accept any extraction".to_string(),
            }
        };
        audit::extraction_finished(&document_id, status_label(&status), iterations_all.len() as u32);

        Ok(PipelineResult {
            document_id,
            values: merged.values,
            evidence: merged.evidence,
            checker,
            iterations: iterations_all,
            filter_stats: prepared.stats,
            fingerprint,
            cached: false,
            status,
        })
    }

    async fn run_iterations(
        &self,
        schema: &Schema,
        context_text: &str,
        source_chunks: &[String],
        theme: &str,
        prefill: &PrefillResult,
        document_id: &str,
    ) -> Result<(ExtractionWithEvidence, CheckerResult, Vec<IterationRecord>), ExtractorError> {
        let mut iterations = Vec::new();
        let mut extraction = ExtractionWithEvidence::new();
        let mut checker = CheckerResult::unreachable_validator();
        let mut revision_note = String::new();

        for iteration in 0..self.config.max_iterations {
            audit::iteration_boundary(document_id, iteration);

            let mut prompt_context = context_text.to_string();
            if !revision_note.is_empty() {
                prompt_context.push_str("\n\nRevision guidance from prior validation:\n");
                prompt_context.push_str(&revision_note);
            }

            let (llm_extraction, escalations) = self.cascade.route(schema, &prompt_context, &self.model_names).await?;
            for escalation in &escalations {
                audit::tier_escalated(&audit::AuditContext {
                    document_id,
                    field: audit::FieldScope::Field(escalation.field.clone()),
                    tier: Some(escalation.to_tier),
                    confidence: Some(escalation.pass1_confidence),
                    cost_estimate: escalation.cost_estimate,
                    latency: Some(escalation.latency),
                });
            }
            let merged = merge_by_precedence(vec![(Tier::Premium, llm_extraction), (Tier::Regex, prefill.locked_extraction())]);

            checker = self
                .validator
                .validate(schema, source_chunks, &merged, theme, self.config.score_threshold)
                .await;
            audit::validation_verdict(document_id, checker.passed, checker.overall_score);

            iterations.push(IterationRecord {
                iteration,
                scores: Scores {
                    accuracy: checker.accuracy_score,
                    consistency: checker.consistency_score,
                    overall: checker.overall_score,
                },
                issue_count: checker.issues.len(),
                suggestions: checker.suggestions.clone(),
            });

            let passed = checker.passed;
            extraction = merged;
            if passed {
                break;
            }
            revision_note = checker.suggestions.join("\n");
        }

        Ok((extraction, checker, iterations))
    }

    async fn apply_recall_boost(
        &self,
        schema: &Schema,
        context_text: &str,
        merged: &mut ExtractionWithEvidence,
        document_id: &str,
    ) -> Result<(), ExtractorError> {
        let candidates = boost_candidates(schema, merged);
        if candidates.is_empty() {
            return Ok(());
        }
        audit::recall_boost_triggered(document_id, &candidates);

        let restricted = schema.restricted_to(&candidates);
        let mut prompt_context = context_text.to_string();
        prompt_context.push_str(
            "\n\nThe following fields were not found in a first pass. Re-read the source \
             carefully; only report a field as not reported if the source genuinely never \
             addresses it.",
        );
        let (boosted, _escalations) = self.cascade.route(&restricted, &prompt_context, &self.model_names).await?;

        for (key, value) in boosted.values {
            if value.is_missing() {
                continue;
            }
            merged.values.insert(key.clone(), value);
            merged.evidence.retain(|e| e.field != key);
            if let Some(item) = boosted.evidence.iter().find(|e| e.field == key) {
                merged.evidence.push(item.clone());
            }
        }
        Ok(())
    }
}

fn combine_checker_results(results: Vec<CheckerResult>) -> CheckerResult {
    let count = results.len();
    if count <= 1 {
        return results.into_iter().next().unwrap_or_else(CheckerResult::unreachable_validator);
    }
    let n = count as f64;
    let passed = results.iter().all(|r| r.passed);
    let accuracy_score = results.iter().map(|r| r.accuracy_score).sum::<f64>() / n;
    let consistency_score = results.iter().map(|r| r.consistency_score).sum::<f64>() / n;
    let overall_score = results.iter().map(|r| r.overall_score).sum::<f64>() / n;

    let mut issues = Vec::new();
    let mut suggestions = Vec::new();
    let mut field_verdicts = HashMap::new();
    for r in results {
        issues.extend(r.issues);
        suggestions.extend(r.suggestions);
        field_verdicts.extend(r.field_verdicts);
    }

    CheckerResult {
        passed,
        accuracy_score,
        consistency_score,
        overall_score,
        issues,
        suggestions,
        field_verdicts,
    }
}

fn status_label(status: &TerminalStatus) -> &'static str {
    match status {
        TerminalStatus::Success => "success",
        TerminalStatus::Partial => "partial",
        TerminalStatus::Failed { .. } => "failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use litextract_llm::{LlmBackend, LlmError, StructuredInvocation, StructuredResult};
    use litextract_tiers::TierBackends;
    use litextract_types::{Chunk, ExtractionPolicy, Field, FieldType, SectionTag};

    struct StubBackend;

    #[async_trait]
    impl LlmBackend for StubBackend {
        async fn create_structured(&self, inv: StructuredInvocation) -> Result<StructuredResult, LlmError> {
            let object = match inv.document_id.as_str() {
                "tier-cascade" => serde_json::json!({
                    "values": {"age": {"kind": "scalar", "data": "65"}},
                    "evidence": [{"field": "age", "quote": "a 65-year-old patient", "chunk_index": 0, "confidence": 0.9}]
                }),
                "validator" => serde_json::json!({
                    "accuracy": 0.9,
                    "consistency": 0.9,
                    "issues": [],
                    "suggestions": [],
                    "field_verdicts": {}
                }),
                other => serde_json::json!({"score": 0.9, "rationale": other, "matching_field_keys": []}),
            };
            Ok(StructuredResult {
                object,
                model_used: "stub".to_string(),
                tokens_input: Some(10),
                tokens_output: Some(10),
            })
        }
    }

    fn schema() -> Schema {
        Schema::new("s", 1, vec![Field::new("age", FieldType::Scalar, "patient age", ExtractionPolicy::Inferable)])
    }

    fn doc() -> ParsedDocument {
        let chunks = vec![Chunk::new(
            "A 65-year-old patient presented with symptoms.".to_string(),
            Some(SectionTag::Results),
            0,
        )];
        let full_text = chunks[0].text.clone();
        ParsedDocument::new("case.pdf", full_text, chunks)
    }

    #[tokio::test]
    async fn straight_through_success() {
        let backend = StubBackend;
        let cache = ResultCache::new();
        let filter = ContentFilter::new().unwrap();
        let cascade = TierCascade::new(
            TierBackends {
                local: Some(&backend),
                cheap: None,
                premium: None,
            },
            false,
            Tier::Local,
        );
        let validator = SelfCriticValidator::new(&backend, "model");
        let model_names = TierModelNames {
            local: "local-model".to_string(),
            cheap: "cheap-model".to_string(),
            premium: "premium-model".to_string(),
        };
        let orchestrator = PipelineOrchestrator::new(Config::default(), &cache, filter, None, cascade, validator, model_names);

        let result = orchestrator.extract_async(&doc(), &schema(), "case reports").await.unwrap();
        assert!(result.is_success());
        assert!(!result.cached);
        assert_eq!(result.values.get("age"), Some(&litextract_types::Value::Scalar("65".to_string())));
    }

    #[tokio::test]
    async fn second_run_is_served_from_cache() {
        let backend = StubBackend;
        let cache = ResultCache::new();
        let filter = ContentFilter::new().unwrap();
        let cascade = TierCascade::new(
            TierBackends {
                local: Some(&backend),
                cheap: None,
                premium: None,
            },
            false,
            Tier::Local,
        );
        let validator = SelfCriticValidator::new(&backend, "model");
        let model_names = TierModelNames {
            local: "local-model".to_string(),
            cheap: "cheap-model".to_string(),
            premium: "premium-model".to_string(),
        };
        let orchestrator = PipelineOrchestrator::new(Config::default(), &cache, filter, None, cascade, validator, model_names);

        let first = orchestrator.extract_async(&doc(), &schema(), "case reports").await.unwrap();
        assert!(!first.cached);
        let second = orchestrator.extract_async(&doc(), &schema(), "case reports").await.unwrap();
        assert!(second.cached);
        assert_eq!(first.fingerprint, second.fingerprint);
    }

    #[tokio::test]
    async fn zero_field_schema_succeeds_without_an_llm_call() {
        let backend = StubBackend;
        let cache = ResultCache::new();
        let filter = ContentFilter::new().unwrap();
        let cascade = TierCascade::new(
            TierBackends {
                local: Some(&backend),
                cheap: None,
                premium: None,
            },
            false,
            Tier::Local,
        );
        let validator = SelfCriticValidator::new(&backend, "model");
        let model_names = TierModelNames {
            local: "local-model".to_string(),
            cheap: "cheap-model".to_string(),
            premium: "premium-model".to_string(),
        };
        let orchestrator = PipelineOrchestrator::new(Config::default(), &cache, filter, None, cascade, validator, model_names);

        let empty_schema = Schema::new("s", 1, vec![]);
        let result = orchestrator.extract_async(&doc(), &empty_schema, "case reports").await.unwrap();
        assert!(result.is_success());
        assert!(result.values.is_empty());
    }

    #[tokio::test]
    async fn empty_context_after_filtering_fails_without_an_llm_call() {
        let backend = StubBackend;
        let cache = ResultCache::new();
        let filter = ContentFilter::new().unwrap();
        let cascade = TierCascade::new(
            TierBackends {
                local: Some(&backend),
                cheap: None,
                premium: None,
            },
            false,
            Tier::Local,
        );
        let validator = SelfCriticValidator::new(&backend, "model");
        let model_names = TierModelNames {
            local: "local-model".to_string(),
            cheap: "cheap-model".to_string(),
            premium: "premium-model".to_string(),
        };
        let orchestrator = PipelineOrchestrator::new(Config::default(), &cache, filter, None, cascade, validator, model_names);

        let chunks = vec![Chunk::new("Smith et al. 2020. Citation text only.".to_string(), Some(SectionTag::References), 0)];
        let full_text = chunks[0].text.clone();
        let references_only_doc = ParsedDocument::new("refs.pdf", full_text, chunks);

        let result = orchestrator.extract_async(&references_only_doc, &schema(), "case reports").await.unwrap();
        assert!(!result.is_success());
        assert!(result.values.is_empty());
        assert!(matches!(result.status, TerminalStatus::Failed { ref reason } if reason == "no relevant chunks"));
    }
}
