use arc_swap::ArcSwap;
use assert_json_diff::assert_json_eq;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use ecolens_core::config::Config;
use ecolens_core::error::AnalyzeError;
use ecolens_core::provider::CompletionExecutor;
use ecolens_core::types::openai::{ChatCompletionRequest, ChatCompletionResponse, Role};
use ecolens_server::{AppState, build_router};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helper: scripted executor that counts calls
// ---------------------------------------------------------------------------

enum Reply {
    Content(Option<String>),
    Error(fn() -> AnalyzeError),
}

struct FakeExecutor {
    reply: Reply,
    calls: AtomicUsize,
    last_request: Mutex<Option<ChatCompletionRequest>>,
}

impl FakeExecutor {
    fn content(text: &str) -> Arc<Self> {
        Self::new(Reply::Content(Some(text.to_string())))
    }

    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionExecutor for FakeExecutor {
    fn identifier(&self) -> &str {
        "fake"
    }

    async fn execute(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, AnalyzeError> {
        assert_eq!(api_key, "gsk_test");
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        match &self.reply {
            Reply::Content(content) => Ok(serde_json::from_value(json!({
                "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
            }))
            .unwrap()),
            Reply::Error(make) => Err(make()),
        }
    }
}

fn state_with(executor: Arc<FakeExecutor>, api_key: Option<&str>) -> AppState {
    let config = Config::default().with_api_key(api_key.map(str::to_string));
    AppState {
        config: Arc::new(ArcSwap::from_pointee(config)),
        executor,
    }
}

async fn send(state: AppState, request: Request<Body>) -> Response {
    build_router(state)
        .oneshot(request)
        .await
        .expect("request failed")
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&bytes).expect("body is not JSON")
}

fn analyze_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn product() -> Value {
    json!({"productName": "Plastic Water Bottle", "ingredientsText": "PET plastic, 500ml"})
}

fn assert_cors(response: &Response) {
    let h = response.headers();
    assert_eq!(h.get("access-control-allow-origin").unwrap(), "*");
    assert_eq!(h.get("access-control-allow-methods").unwrap(), "POST, OPTIONS");
    assert_eq!(h.get("access-control-allow-headers").unwrap(), "Content-Type");
}

// ---------------------------------------------------------------------------
// Method handling and CORS
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_non_post_methods_are_405() {
    let exec = FakeExecutor::content("{}");
    for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH, Method::HEAD] {
        for uri in ["/api/analyze", "/api/analyze/eco-lens"] {
            let req = Request::builder()
                .method(method.clone())
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let resp = send(state_with(exec.clone(), Some("gsk_test")), req).await;
            assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
            assert_cors(&resp);
            if method != Method::HEAD {
                assert_eq!(body_json(resp).await, json!({"error": "Method not allowed"}));
            }
        }
    }
    assert_eq!(exec.calls(), 0);
}

#[tokio::test]
async fn test_options_preflight_always_empty() {
    let exec = FakeExecutor::content("{}");
    // No API key, junk body, unknown path: preflight still succeeds.
    for uri in ["/api/analyze", "/api/analyze/nope", "/anything"] {
        let req = Request::builder()
            .method("OPTIONS")
            .uri(uri)
            .header("origin", "https://shop.example")
            .header("access-control-request-method", "POST")
            .body(Body::from("garbage"))
            .unwrap();
        let resp = send(state_with(exec.clone(), None), req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_cors(&resp);
        assert!(resp.headers().contains_key("x-request-id"), "{uri}");
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.is_empty());
    }
    assert_eq!(exec.calls(), 0);
}

// ---------------------------------------------------------------------------
// Success paths
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_valid_json_completion_is_relayed() {
    let payload = json!({
        "score": 3.2,
        "carbon_footprint": "0.08 kg CO2e",
        "tags": [{"label": "Single-use", "icon": "🚯"}],
        "certifications": [],
        "greener_alternatives": [{"name": "Steel bottle", "analyzed_score": 8.5, "why": "Reusable", "url": "https://example.com"}],
        "eco_brands": [{"name": "Klean Kanteen", "why": "B Corp", "url": "https://kleankanteen.com"}]
    });
    let exec = FakeExecutor::content(&payload.to_string());

    let resp = send(
        state_with(exec.clone(), Some("gsk_test")),
        analyze_request("/api/analyze", product()),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("content-type").unwrap(), "application/json");
    assert_cors(&resp);
    assert_json_eq!(body_json(resp).await, payload);
    assert_eq!(exec.calls(), 1);

    // Default profile drives the upstream request.
    let sent = exec.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(sent.model, "llama-3.1-8b-instant");
    assert_eq!(sent.temperature, 0.5);
    assert_eq!(sent.max_tokens, Some(800));
    assert_eq!(sent.messages[0].role, Role::System);
    assert!(sent.messages[0].content.starts_with("You are EcoLens AI"));
    assert_eq!(
        sent.messages[1].content,
        "Product: Plastic Water Bottle\nDescription/Ingredients: PET plastic, 500ml"
    );
}

#[tokio::test]
async fn test_brace_span_fallback() {
    let exec = FakeExecutor::content("Sure! {\"score\":7.5,\"tags\":[]} Thanks.");
    let resp = send(
        state_with(exec, Some("gsk_test")),
        analyze_request("/api/analyze", product()),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_json_eq!(body_json(resp).await, json!({"score": 7.5, "tags": []}));
}

#[tokio::test]
async fn test_named_profile() {
    let exec = FakeExecutor::content("{\"score\": 9}");
    let resp = send(
        state_with(exec.clone(), Some("gsk_test")),
        analyze_request("/api/analyze/category-expert", product()),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let sent = exec.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(sent.temperature, 0.2);
    assert!(sent.messages[0].content.contains("CATEGORY LOCK"));
}

// ---------------------------------------------------------------------------
// Failure paths
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_no_json_in_completion_is_500() {
    let exec = FakeExecutor::content("no json here");
    let resp = send(
        state_with(exec, Some("gsk_test")),
        analyze_request("/api/analyze", product()),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors(&resp);
    let body = body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("no JSON object"));
}

#[tokio::test]
async fn test_missing_api_key_makes_no_upstream_call() {
    let exec = FakeExecutor::content("{}");
    let resp = send(
        state_with(exec.clone(), None),
        analyze_request("/api/analyze", product()),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors(&resp);
    let body = body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("configuration"));
    assert_eq!(exec.calls(), 0);
}

#[tokio::test]
async fn test_upstream_error_propagates_once() {
    let exec = FakeExecutor::new(Reply::Error(|| AnalyzeError::Upstream {
        status: 429,
        message: "Rate limit reached for model".into(),
    }));
    let resp = send(
        state_with(exec.clone(), Some("gsk_test")),
        analyze_request("/api/analyze", product()),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(resp).await,
        json!({"error": "Rate limit reached for model"})
    );
    assert_eq!(exec.calls(), 1);
}

#[tokio::test]
async fn test_empty_completion_is_500() {
    let exec = FakeExecutor::new(Reply::Content(None));
    let resp = send(
        state_with(exec, Some("gsk_test")),
        analyze_request("/api/analyze", product()),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(resp).await,
        json!({"error": "Completion API returned empty response"})
    );
}

#[tokio::test]
async fn test_missing_fields_rejected_before_upstream() {
    let exec = FakeExecutor::content("{}");
    let resp = send(
        state_with(exec.clone(), Some("gsk_test")),
        analyze_request("/api/analyze", json!({"productName": "Soap"})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors(&resp);
    let body = body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("ingredientsText"));
    assert_eq!(exec.calls(), 0);
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let exec = FakeExecutor::content("{}");
    let req = Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = send(state_with(exec.clone(), Some("gsk_test")), req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.headers().get("content-type").unwrap(), "application/json");
    let body = body_json(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("invalid request"));
    assert_eq!(exec.calls(), 0);
}

#[tokio::test]
async fn test_oversized_body_gets_json_envelope() {
    let exec = FakeExecutor::content("{}");
    // Default body-limit-kb is 64.
    let body = json!({"productName": "Soap", "ingredientsText": "x".repeat(70 * 1024)});
    let resp = send(
        state_with(exec.clone(), Some("gsk_test")),
        analyze_request("/api/analyze", body),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.headers().get("content-type").unwrap(), "application/json");
    assert_cors(&resp);
    assert_eq!(
        body_json(resp).await,
        json!({"error": "invalid request: request body exceeds 64 KB"})
    );
    assert_eq!(exec.calls(), 0);
}

#[tokio::test]
async fn test_oversized_body_with_content_length() {
    let exec = FakeExecutor::content("{}");
    let payload = json!({"productName": "Soap", "ingredientsText": "x".repeat(70 * 1024)}).to_string();
    let req = Request::builder()
        .method("POST")
        .uri("/api/analyze/eco-lens")
        .header("content-type", "application/json")
        .header("content-length", payload.len())
        .body(Body::from(payload))
        .unwrap();
    let resp = send(state_with(exec.clone(), Some("gsk_test")), req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_json(resp).await["error"].as_str().unwrap().contains("64 KB"));
    assert_eq!(exec.calls(), 0);
}

#[tokio::test]
async fn test_unknown_profile_is_404() {
    let exec = FakeExecutor::content("{}");
    let resp = send(
        state_with(exec.clone(), Some("gsk_test")),
        analyze_request("/api/analyze/does-not-exist", product()),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(resp).await,
        json!({"error": "unknown profile: does-not-exist"})
    );
    assert_eq!(exec.calls(), 0);
}

// ---------------------------------------------------------------------------
// Shell routes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health() {
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let resp = send(state_with(FakeExecutor::content("{}"), None), req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    let body = body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["default_profile"], "eco-lens");
    assert_eq!(body["profiles"], json!(["category-expert", "eco-lens"]));
}

#[tokio::test]
async fn test_unknown_path_is_json_404() {
    let req = Request::builder().uri("/nope").body(Body::empty()).unwrap();
    let resp = send(state_with(FakeExecutor::content("{}"), None), req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_cors(&resp);
    assert_eq!(body_json(resp).await, json!({"error": "Not found"}));
}

#[tokio::test]
async fn test_config_swap_applies_to_next_request() {
    let exec = FakeExecutor::content("{\"score\": 5}");
    let state = state_with(exec.clone(), None);

    let resp = send(state.clone(), analyze_request("/api/analyze", product())).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let reloaded = Config::default().with_api_key(Some("gsk_test".into()));
    state.config.store(Arc::new(reloaded));

    let resp = send(state, analyze_request("/api/analyze", product())).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(exec.calls(), 1);
}
