use crate::extract::ExtractError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Default message when the completion API fails without an `error.message`.
pub const DEFAULT_UPSTREAM_MESSAGE: &str = "Completion API error";

/// Unified error type for the analyze path.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unknown profile: {0}")]
    UnknownProfile(String),

    /// Non-success status from the completion API. `message` is the upstream
    /// `error.message` when present.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed completion response: {0}")]
    MalformedCompletion(String),

    #[error("Completion API returned empty response")]
    EmptyCompletion,

    #[error("could not extract JSON from completion: {0}")]
    Extraction(#[from] ExtractError),
}

impl AnalyzeError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::UnknownProfile(_) => StatusCode::NOT_FOUND,
            Self::Config(_)
            | Self::InvalidRequest(_)
            | Self::Upstream { .. }
            | Self::Network(_)
            | Self::MalformedCompletion(_)
            | Self::EmptyCompletion
            | Self::Extraction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Build an upstream error from a failed response body, preferring the
    /// OpenAI-style `{"error":{"message":..}}` text.
    pub fn from_upstream_body(status: u16, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| DEFAULT_UPSTREAM_MESSAGE.to_string());
        Self::Upstream { status, message }
    }
}

impl IntoResponse for AnalyzeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({ "error": self.to_string() });

        (
            status,
            [("content-type", "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}

impl From<reqwest::Error> for AnalyzeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Network(format!("request timed out: {e}"))
        } else if e.is_connect() {
            Self::Network(format!("connection failed: {e}"))
        } else if e.is_decode() {
            Self::MalformedCompletion(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}
