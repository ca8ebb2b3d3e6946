//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless LLM client - each call is independent (fresh context)
///
/// This is the critical seam for testability: the generation backend is an
/// untrusted black box that returns text, so the trait can be substituted
/// with a deterministic stub in tests.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request (blocking until complete)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}
