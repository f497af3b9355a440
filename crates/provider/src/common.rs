use ecolens_core::error::AnalyzeError;
use ecolens_core::types::openai::ChatCompletionResponse;

/// Check the status and decode a non-streaming completion response.
///
/// Status >= 400 becomes `AnalyzeError::Upstream` carrying the upstream
/// `error.message`; a 2xx body that is not a completion object becomes
/// `AnalyzeError::MalformedCompletion`.
pub async fn handle_response(
    resp: reqwest::Response,
) -> Result<ChatCompletionResponse, AnalyzeError> {
    let status = resp.status().as_u16();
    let body = resp.bytes().await?;
    decode_body(status, &body)
}

pub(crate) fn decode_body(status: u16, body: &[u8]) -> Result<ChatCompletionResponse, AnalyzeError> {
    if status >= 400 {
        return Err(AnalyzeError::from_upstream_body(status, body));
    }
    serde_json::from_slice(body).map_err(|e| AnalyzeError::MalformedCompletion(e.to_string()))
}
