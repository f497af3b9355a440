pub mod handler;
pub mod middleware;
pub mod translator;

use arc_swap::ArcSwap;
use axum::routing::{get, post};
use axum::{Router, middleware as axum_mw};
use ecolens_core::config::Config;
use ecolens_core::provider::CompletionExecutor;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    /// Swapped wholesale on reload; handlers take a snapshot per request.
    pub config: Arc<ArcSwap<Config>>,
    pub executor: Arc<dyn CompletionExecutor>,
}

pub fn build_router(state: AppState) -> Router {
    let body_limit_kb = state.config.load().body_limit_kb;

    // Public routes
    let public_routes = Router::new().route("/health", get(handler::health::health));

    // Analyze routes: POST only, anything else but OPTIONS is a JSON 405
    let analyze_routes = Router::new()
        .route(
            "/api/analyze",
            post(handler::analyze::analyze).fallback(handler::method_not_allowed),
        )
        .route(
            "/api/analyze/{profile}",
            post(handler::analyze::analyze_with_profile).fallback(handler::method_not_allowed),
        )
        .layer(RequestBodyLimitLayer::new(body_limit_kb * 1024))
        .layer(axum_mw::from_fn_with_state(
            body_limit_kb,
            middleware::body_limit::body_limit_middleware,
        ));

    // Compose, then global middleware layers (inner → outer). Preflights
    // answered by CORS still pass through request logging.
    Router::new()
        .merge(public_routes)
        .merge(analyze_routes)
        .fallback(handler::not_found)
        .layer(axum_mw::from_fn(middleware::cors::cors_middleware))
        .layer(axum_mw::from_fn(
            middleware::request_logging::request_logging_middleware,
        ))
        .layer(axum_mw::from_fn(
            middleware::request_context::request_context_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
