pub mod analyze;
pub mod health;

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use ecolens_core::error::AnalyzeError;
use serde_json::json;

/// Method fallback for the analyze routes.
pub async fn method_not_allowed() -> AnalyzeError {
    AnalyzeError::MethodNotAllowed
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({"error": "Not found"})))
}
