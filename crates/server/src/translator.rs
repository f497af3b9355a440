//! The request translator: analysis request in, extracted JSON object out.

use ecolens_core::analysis::{AnalysisRequest, AnalysisSummary};
use ecolens_core::config::Config;
use ecolens_core::error::AnalyzeError;
use ecolens_core::extract;
use ecolens_core::provider::CompletionExecutor;
use serde_json::Value;
use std::sync::Arc;

pub struct RequestTranslator {
    config: Arc<Config>,
    executor: Arc<dyn CompletionExecutor>,
}

impl RequestTranslator {
    pub fn new(config: Arc<Config>, executor: Arc<dyn CompletionExecutor>) -> Self {
        Self { config, executor }
    }

    /// Translate one request. `profile` of `None` selects the default profile.
    ///
    /// Checks run in order: profile, API key, body. The upstream is called at
    /// most once and only after all three pass.
    pub async fn translate(&self, profile: Option<&str>, body: &[u8]) -> Result<Value, AnalyzeError> {
        let profile_name = profile.unwrap_or(self.config.default_profile.as_str());
        let prompt = self
            .config
            .profile(profile_name)
            .ok_or_else(|| AnalyzeError::UnknownProfile(profile_name.to_string()))?;

        let Some(api_key) = self.config.api_key.as_deref() else {
            tracing::error!("Completion API key is not configured");
            return Err(AnalyzeError::Config(
                "Server misconfiguration: API key missing".into(),
            ));
        };

        let input = AnalysisRequest::from_json(body)?;
        let request = prompt.build_request(&self.config.upstream.model, &input);

        tracing::info!(
            profile = profile_name,
            model = %request.model,
            executor = self.executor.identifier(),
            "Requesting analysis"
        );

        let completion = self
            .executor
            .execute(api_key, &request)
            .await
            .inspect_err(|e| tracing::warn!(profile = profile_name, "Completion failed: {e}"))?;

        let text = completion
            .first_content()
            .ok_or(AnalyzeError::EmptyCompletion)?;

        let extraction = extract::extract_object(text).inspect_err(|e| {
            tracing::warn!(profile = profile_name, len = text.len(), "Extraction failed: {e}")
        })?;
        let stage = extraction.stage;
        let value = extraction.into_value();

        let summary = AnalysisSummary::from_value(&value);
        if !summary.score_in_range() {
            tracing::debug!(score = ?summary.score, "Score missing or outside 0-10");
        }
        tracing::info!(
            profile = profile_name,
            stage = stage.as_str(),
            score = ?summary.score,
            alternatives = summary.greener_alternatives,
            brands = summary.eco_brands,
            "Analysis completed"
        );

        Ok(value)
    }
}
