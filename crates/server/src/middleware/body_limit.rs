use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use ecolens_core::error::AnalyzeError;

/// Rewrite the plain-text 413 produced by the body limit into the JSON error
/// envelope. `limit_kb` is the configured `body-limit-kb`.
pub async fn body_limit_middleware(
    State(limit_kb): State<usize>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if response.status() != StatusCode::PAYLOAD_TOO_LARGE {
        return response;
    }
    tracing::warn!(limit_kb, "Request body over limit");
    AnalyzeError::InvalidRequest(format!("request body exceeds {limit_kb} KB")).into_response()
}
