//! Core types for the LLM transport abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::error::LlmError;

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }
}

/// Input to a structured-output LLM call.
///
/// `response_schema` is a JSON Schema document describing the shape the
/// model must emit; the core never leaks this representation further than
/// the transport boundary.
#[derive(Debug, Clone)]
pub struct StructuredInvocation {
    pub document_id: String,
    pub model: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub temperature: f32,
    pub messages: Vec<Message>,
    pub response_schema: serde_json::Value,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl StructuredInvocation {
    #[must_use]
    pub fn new(
        document_id: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
        messages: Vec<Message>,
        response_schema: serde_json::Value,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            model: model.into(),
            timeout,
            max_retries: 2,
            // Fixed at 0 for determinism.
            temperature: 0.0,
            messages,
            response_schema,
            metadata: HashMap::new(),
        }
    }
}

/// Result of a structured-output call: the raw object plus bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredResult {
    pub object: serde_json::Value,
    pub model_used: String,
    pub tokens_input: Option<u64>,
    pub tokens_output: Option<u64>,
}

/// Trait for LLM transport implementations.
///
/// Implementations live outside the core (HTTP provider, CLI subprocess,
/// test double); the core only depends on this trait.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Invoke the model and parse its response against `response_schema`.
    ///
    /// # Errors
    /// Returns `LlmError::Timeout` if the call exceeds `timeout`,
    /// `LlmError::ContractViolation` if the response cannot be parsed
    /// against `response_schema`, or `LlmError::Transport`/`BudgetExceeded`
    /// for other failures.
    async fn create_structured(
        &self,
        inv: StructuredInvocation,
    ) -> Result<StructuredResult, LlmError>;

    /// Rough per-token cost for `model`, used by the tier cascade's cost
    /// control. Returns `None` if the backend has no
    /// pricing information (the caller then falls back to its own policy).
    fn token_cost_estimate(&self, _model: &str, _input_tokens: u64, _output_tokens: u64) -> Option<f64> {
        None
    }
}
