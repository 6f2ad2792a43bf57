//! Tier cascade: a configuration-driven field-level router.
//!
//! Chooses among {regex, local LLM, cheap cloud LLM, premium cloud LLM}
//! per field, and merges results from a two-pass hybrid run.

use std::collections::HashMap;
use std::time::Duration;

use litextract_config::{Config, TierThresholds};
use litextract_llm::{estimate_cost, estimate_tokens, LlmBackend, Message, StructuredInvocation, TokenRate};
use litextract_types::{ExtractionPolicy, ExtractionWithEvidence, Schema, Tier};
use tracing::{debug, info, warn};

use crate::error::TierError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Backends available to the cascade, one per LLM-backed tier. A tier with
/// no backend configured is simply unreachable; routing to it fails with
/// `TierError::NoBackendForTier`.
pub struct TierBackends<'a> {
    pub local: Option<&'a dyn LlmBackend>,
    pub cheap: Option<&'a dyn LlmBackend>,
    pub premium: Option<&'a dyn LlmBackend>,
}

/// One field's outcome of a hybrid escalation decision, returned alongside
/// the merged extraction so the caller can emit an audit event: this crate
/// has no way to reach the engine's audit sink itself.
#[derive(Debug, Clone)]
pub struct FieldEscalation {
    pub field: String,
    pub from_tier: Tier,
    pub to_tier: Tier,
    pub pass1_confidence: f64,
    pub cost_estimate: Option<f64>,
    pub latency: Duration,
}

pub struct TierCascade<'a> {
    backends: TierBackends<'a>,
    hybrid_mode: bool,
    default_tier: Tier,
    thresholds: TierThresholds,
    field_routing: HashMap<String, String>,
    premium_rate: TokenRate,
    auto_approve_cost_threshold: f64,
}

impl<'a> TierCascade<'a> {
    #[must_use]
    pub fn new(backends: TierBackends<'a>, hybrid_mode: bool, default_tier: Tier) -> Self {
        Self {
            backends,
            hybrid_mode,
            default_tier,
            thresholds: TierThresholds::default(),
            field_routing: HashMap::new(),
            premium_rate: TokenRate::default(),
            auto_approve_cost_threshold: f64::INFINITY,
        }
    }

    /// Adopts `config`'s per-tier confidence thresholds, per-field routing
    /// overrides, and cost-approval threshold.
    #[must_use]
    pub fn with_config(mut self, config: &Config) -> Self {
        self.thresholds = config.confidence_thresholds;
        self.field_routing = config.field_routing.clone();
        self.auto_approve_cost_threshold = config.auto_approve_cost_threshold;
        self
    }

    #[must_use]
    pub fn with_premium_rate(mut self, rate: TokenRate) -> Self {
        self.premium_rate = rate;
        self
    }

    pub fn set_hybrid_mode(&mut self, enabled: bool) {
        self.hybrid_mode = enabled;
    }

    /// Looks up a per-field routing override, if `config.field_routing` named
    /// one for this field and it names a recognized tier.
    fn field_override(&self, field_key: &str) -> Option<Tier> {
        match self.field_routing.get(field_key)?.to_lowercase().as_str() {
            "local" => Some(Tier::Local),
            "cheap" => Some(Tier::Cheap),
            "premium" => Some(Tier::Premium),
            "regex" => Some(Tier::Regex),
            _ => None,
        }
    }

    /// Routes `schema` over `context`, running the full two-pass cascade
    /// when hybrid mode is enabled, or a single pass on `default_tier`
    /// otherwise. Alongside the merged extraction, returns the per-field
    /// escalation decisions made along the way (empty outside hybrid mode
    /// or when nothing needed escalating).
    ///
    /// # Errors
    /// Returns `TierError` if the backend for a required tier is missing
    /// or a backend call fails.
    pub async fn route(
        &self,
        schema: &Schema,
        context: &str,
        model_names: &TierModelNames,
    ) -> Result<(ExtractionWithEvidence, Vec<FieldEscalation>), TierError> {
        if !self.hybrid_mode {
            let (result, _cost) = self.call_tier(self.default_tier, schema, context, model_names).await?;
            return Ok((result, Vec::new()));
        }

        let (pass1, _cost) = self.call_tier(Tier::Local, schema, context, model_names).await?;
        let escalated_keys: Vec<String> = schema
            .fields
            .iter()
            .filter(|f| !matches!(f.policy, ExtractionPolicy::Derived | ExtractionPolicy::Metadata))
            .filter(|f| match self.field_override(&f.key) {
                Some(Tier::Local | Tier::Regex) => false,
                Some(Tier::Cheap | Tier::Premium) => true,
                None => {
                    let confidence = pass1.evidence_for(&f.key).map_or(0.0, |e| e.confidence);
                    confidence < self.thresholds.local
                }
            })
            .map(|f| f.key.clone())
            .collect();

        if escalated_keys.is_empty() {
            return Ok((pass1, Vec::new()));
        }

        let escalation_tier = if escalated_keys.iter().any(|k| self.field_override(k) == Some(Tier::Premium)) && self.backends.premium.is_some()
        {
            Tier::Premium
        } else if self.backends.cheap.is_some() {
            Tier::Cheap
        } else {
            Tier::Premium
        };
        let restricted = schema.restricted_to(&escalated_keys);
        let started = std::time::Instant::now();
        let (pass2, cost_estimate) = self
            .call_tier(escalation_tier, &restricted, context, model_names)
            .await?;
        let latency = started.elapsed();

        info!(fields = escalated_keys.len(), ?escalation_tier, "escalating low-confidence fields");
        let escalations = escalated_keys
            .iter()
            .map(|key| FieldEscalation {
                field: key.clone(),
                from_tier: Tier::Local,
                to_tier: escalation_tier,
                pass1_confidence: pass1.evidence_for(key).map_or(0.0, |e| e.confidence),
                cost_estimate,
                latency,
            })
            .collect();

        Ok((merge_by_precedence(vec![(Tier::Local, pass1), (escalation_tier, pass2)]), escalations))
    }

    /// Calls `tier`'s backend. For `Tier::Premium`, also computes an
    /// estimated cost before issuing the call, preferring the backend's own
    /// `token_cost_estimate` and falling back to `premium_rate`.
    async fn call_tier(
        &self,
        tier: Tier,
        schema: &Schema,
        context: &str,
        model_names: &TierModelNames,
    ) -> Result<(ExtractionWithEvidence, Option<f64>), TierError> {
        let (backend, model) = match tier {
            Tier::Local => (self.backends.local, &model_names.local),
            Tier::Cheap => (self.backends.cheap, &model_names.cheap),
            Tier::Premium => (self.backends.premium, &model_names.premium),
            Tier::Regex => return Ok((ExtractionWithEvidence::new(), None)),
        };
        let backend = backend.ok_or(TierError::NoBackendForTier(tier))?;
        debug!(?tier, "calling tier backend");

        let cost_estimate = (tier == Tier::Premium).then(|| {
            let input_tokens = estimate_tokens(context);
            let output_tokens = estimate_tokens(&schema.field_keys().join(", "));
            let cost = backend
                .token_cost_estimate(model, input_tokens, output_tokens)
                .unwrap_or_else(|| estimate_cost(self.premium_rate, input_tokens, output_tokens).estimated_cost);
            if cost > self.auto_approve_cost_threshold {
                warn!(cost, threshold = self.auto_approve_cost_threshold, "premium call exceeds auto-approve cost threshold");
            }
            cost
        });

        let invocation = StructuredInvocation::new(
            "tier-cascade",
            model.clone(),
            DEFAULT_TIMEOUT,
            vec![Message::user(build_prompt(schema, context))],
            schema_to_json_schema(schema),
        );
        let result = backend.create_structured(invocation).await?;
        Ok((parse_extraction(&result.object), cost_estimate))
    }
}

/// Model name per tier, supplied by the caller (the core never hardcodes a
/// provider model string).
pub struct TierModelNames {
    pub local: String,
    pub cheap: String,
    pub premium: String,
}

fn build_prompt(schema: &Schema, context: &str) -> String {
    format!(
        "Extract the following fields from the context below: {}\n\nContext:\n{context}",
        schema.field_keys().join(", ")
    )
}

fn schema_to_json_schema(schema: &Schema) -> serde_json::Value {
    let properties: serde_json::Map<String, serde_json::Value> = schema
        .fields
        .iter()
        .map(|f| (f.key.clone(), serde_json::json!({ "type": "object" })))
        .collect();
    serde_json::json!({
        "type": "object",
        "properties": { "values": { "type": "object", "properties": properties } }
    })
}

fn parse_extraction(object: &serde_json::Value) -> ExtractionWithEvidence {
    serde_json::from_value(object.clone()).unwrap_or_default()
}

/// Merges tier results by precedence: premium > regex-locked > cheap >
/// local, tie-broken by higher per-field confidence. A value already won
/// by `Tier::Regex` (meaning the caller only hands in locked regex fields
/// under that tag, see `regex_prefill::PrefillResult::locked_extraction`)
/// is special-cased: overriding it requires both a strictly higher tier
/// *and* a strictly higher confidence, and the override is logged.
#[must_use]
pub fn merge_by_precedence(mut results: Vec<(Tier, ExtractionWithEvidence)>) -> ExtractionWithEvidence {
    results.sort_by_key(|(tier, _)| *tier);
    let mut merged = ExtractionWithEvidence::new();
    let mut winning_tier: std::collections::HashMap<String, (Tier, f64)> = std::collections::HashMap::new();

    for (tier, extraction) in results {
        for (key, value) in extraction.values {
            let confidence = extraction
                .evidence
                .iter()
                .find(|e| e.field == key)
                .map_or(0.0, |e| e.confidence);
            let should_win = match winning_tier.get(&key) {
                None => true,
                Some((current_tier, current_confidence)) => {
                    if *current_tier == Tier::Regex {
                        let overrides = tier > *current_tier && confidence > *current_confidence;
                        if overrides {
                            info!(
                                field = %key,
                                tier = ?tier,
                                confidence,
                                locked_confidence = *current_confidence,
                                "premium result overrode regex-locked field"
                            );
                        }
                        overrides
                    } else {
                        tier > *current_tier || (tier == *current_tier && confidence > *current_confidence)
                    }
                }
            };
            if should_win {
                winning_tier.insert(key.clone(), (tier, confidence));
                merged.values.insert(key.clone(), value);
                merged.evidence.retain(|e| e.field != key);
                if let Some(item) = extraction.evidence.iter().find(|e| e.field == key) {
                    merged.evidence.push(item.clone());
                }
            }
        }
    }
    merged
}
