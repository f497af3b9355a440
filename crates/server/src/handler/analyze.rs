use crate::AppState;
use crate::translator::RequestTranslator;
use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use bytes::Bytes;
use ecolens_core::error::AnalyzeError;
use serde_json::Value;

/// POST /api/analyze, using the default profile.
pub async fn analyze(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AnalyzeError> {
    run(&state, None, &body).await
}

/// POST /api/analyze/{profile}
pub async fn analyze_with_profile(
    State(state): State<AppState>,
    Path(profile): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, AnalyzeError> {
    run(&state, Some(&profile), &body).await
}

async fn run(
    state: &AppState,
    profile: Option<&str>,
    body: &[u8],
) -> Result<Json<Value>, AnalyzeError> {
    let translator = RequestTranslator::new(state.config.load_full(), state.executor.clone());
    let value = translator.translate(profile, body).await?;
    Ok(Json(value))
}
