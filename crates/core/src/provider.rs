use crate::error::AnalyzeError;
use crate::types::openai::{ChatCompletionRequest, ChatCompletionResponse};
use async_trait::async_trait;

/// Sends one chat completion request to the upstream API.
///
/// Implementations make exactly one outbound call per invocation: no retry and
/// no fallback.
#[async_trait]
pub trait CompletionExecutor: Send + Sync {
    /// Identifier for logging (e.g. "openai-compat").
    fn identifier(&self) -> &str;

    async fn execute(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, AnalyzeError>;
}
