//! Blocking adapter over an async `LlmBackend`.
//!
//! A caller without an `async fn` still needs to invoke an `LlmBackend`.
//! Rather than duplicate the trait, we drive the same async implementation
//! to completion on a dedicated current-thread runtime, keeping a single
//! pure core that differs only at the suspension points.
use std::time::Duration;

use crate::error::LlmError;
use crate::types::{LlmBackend, StructuredInvocation, StructuredResult};

/// Runs a `create_structured` call to completion from synchronous code.
pub struct BlockingLlmClient<'a> {
    backend: &'a dyn LlmBackend,
}

impl<'a> BlockingLlmClient<'a> {
    #[must_use]
    pub fn new(backend: &'a dyn LlmBackend) -> Self {
        Self { backend }
    }

    /// # Errors
    /// Propagates whatever `LlmError` the wrapped backend returns, plus
    /// `LlmError::Transport` if a runtime could not be started.
    pub fn create_structured(&self, inv: StructuredInvocation) -> Result<StructuredResult, LlmError> {
        let timeout = inv.timeout;
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| LlmError::Transport(format!("failed to start blocking runtime: {e}")))?;
        rt.block_on(async move {
            tokio::time::timeout(timeout, self.backend.create_structured(inv))
                .await
                .unwrap_or(Err(LlmError::Timeout(timeout)))
        })
    }
}

/// Wraps a timeout around any future produced by an async backend call, used
/// by both the blocking and cooperative drivers so timeout semantics stay
/// identical between them.
pub async fn with_timeout<T>(
    timeout: Duration,
    fut: impl std::future::Future<Output = Result<T, LlmError>>,
) -> Result<T, LlmError> {
    tokio::time::timeout(timeout, fut)
        .await
        .unwrap_or(Err(LlmError::Timeout(timeout)))
}
