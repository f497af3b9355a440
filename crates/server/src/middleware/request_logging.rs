use axum::http::HeaderValue;
use axum::{extract::Request, middleware::Next, response::Response};
use ecolens_core::context::RequestContext;

/// Log request received/completed lines and echo the request id as
/// `x-request-id`.
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let ctx = request.extensions().get::<RequestContext>().cloned();
    let request_id = ctx
        .as_ref()
        .map(|c| c.request_id.clone())
        .unwrap_or_default();
    let client_ip = ctx
        .as_ref()
        .and_then(|c| c.client_ip.clone())
        .unwrap_or_else(|| "-".to_string());

    tracing::info!(
        request_id = %request_id,
        client_ip = %client_ip,
        method = %method,
        path = %path,
        "Request received"
    );

    let mut response = next.run(request).await;

    let elapsed = ctx.as_ref().map(|c| c.elapsed_ms()).unwrap_or(0);
    let status = response.status().as_u16();

    if status >= 500 {
        tracing::warn!(request_id = %request_id, status, elapsed_ms = elapsed, "Request failed");
    } else {
        tracing::info!(request_id = %request_id, status, elapsed_ms = elapsed, "Request completed");
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }

    response
}
