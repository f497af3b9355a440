use crate::common;
use ecolens_core::config::UpstreamConfig;
use ecolens_core::error::AnalyzeError;
use ecolens_core::provider::CompletionExecutor;
use ecolens_core::types::openai::{ChatCompletionRequest, ChatCompletionResponse};
use async_trait::async_trait;

/// Executor for any OpenAI-compatible `/chat/completions` endpoint (Groq by
/// default).
pub struct OpenAICompatExecutor {
    name: String,
    client: reqwest::Client,
    url: String,
}

impl OpenAICompatExecutor {
    pub fn new(client: reqwest::Client, upstream: &UpstreamConfig) -> Self {
        Self {
            name: "openai-compat".to_string(),
            client,
            url: upstream.completions_url(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CompletionExecutor for OpenAICompatExecutor {
    fn identifier(&self) -> &str {
        &self.name
    }

    async fn execute(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, AnalyzeError> {
        tracing::debug!(url = %self.url, model = %request.model, "Sending completion request");

        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        common::handle_response(resp).await
    }
}
