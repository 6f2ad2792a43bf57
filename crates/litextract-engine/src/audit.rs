//! Structured audit events emitted at the pipeline's transition points.
//! Emitted through `tracing::info!` structured fields; no bespoke sink is
//! introduced, the caller's subscriber decides where events go.

use std::time::Duration;

use litextract_types::Tier;
use tracing::info;

/// Identifies which part of a document an event concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldScope {
    Whole,
    Field(String),
}

impl std::fmt::Display for FieldScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldScope::Whole => write!(f, "whole"),
            FieldScope::Field(key) => write!(f, "{key}"),
        }
    }
}

pub struct AuditContext<'a> {
    pub document_id: &'a str,
    pub field: FieldScope,
    pub tier: Option<Tier>,
    pub confidence: Option<f64>,
    pub cost_estimate: Option<f64>,
    pub latency: Option<Duration>,
}

pub fn extraction_started(document_id: &str) {
    info!(event = "extraction_started", document_id, "extraction started");
}

pub fn extraction_finished(document_id: &str, status: &str, iteration_count: u32) {
    info!(
        event = "extraction_finished",
        document_id, status, iteration_count, "extraction finished"
    );
}

pub fn cache_hit(document_id: &str) {
    info!(event = "cache_hit", document_id, "cache hit");
}

pub fn cache_miss(document_id: &str) {
    info!(event = "cache_miss", document_id, "cache miss");
}

pub fn tier_escalated(ctx: &AuditContext<'_>) {
    info!(
        event = "tier_escalated",
        document_id = ctx.document_id,
        field = %ctx.field,
        tier = ?ctx.tier,
        confidence = ctx.confidence,
        cost_estimate = ctx.cost_estimate,
        latency_ms = ctx.latency.map(|d| d.as_millis() as u64),
        "tier escalated"
    );
}

pub fn iteration_boundary(document_id: &str, iteration: u32) {
    info!(event = "iteration_boundary", document_id, iteration, "iteration boundary");
}

pub fn validation_verdict(document_id: &str, passed: bool, overall_score: f64) {
    info!(
        event = "validation_verdict",
        document_id, passed, overall_score, "validation verdict"
    );
}

pub fn recall_boost_triggered(document_id: &str, fields: &[String]) {
    info!(
        event = "recall_boost_triggered",
        document_id,
        fields = ?fields,
        "recall boost triggered"
    );
}
