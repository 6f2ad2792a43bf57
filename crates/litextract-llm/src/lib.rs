//! LLM transport abstraction.
//!
//! This crate defines the trait boundary between the extraction core and
//! whatever actually invokes a language model. Concrete providers (HTTP
//! APIs, CLI subprocesses) live outside the core; this crate only needs to
//! agree with them on `LlmBackend`.

pub mod blocking;
pub mod cost;
pub mod error;
pub mod types;

pub use blocking::{with_timeout, BlockingLlmClient};
pub use cost::{estimate_cost, estimate_tokens, CostEstimate, TokenRate};
pub use error::LlmError;
pub use types::{LlmBackend, Message, Role, StructuredInvocation, StructuredResult};
