//! Dashboard HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum router, configures middleware, and defines the shared
//! application state injected into handlers.
//!
//! # Notes
//! Vanity paths are served from the router fallback against whatever snapshot
//! is current, so a refresh never requires rebuilding the router.
use crate::api;
use crate::observability;
use crate::registry::RegistrySnapshot;
use axum::Router;
use dashboard_authz::ClaimNamespace;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_opentelemetry::OpenTelemetrySpanExt;

#[derive(Clone)]
pub struct AppState {
    pub service_name: String,
    pub api_version: String,
    pub snapshot: Arc<RegistrySnapshot>,
    pub source_description: String,
    pub claims: ClaimNamespace,
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            let parent = observability::trace_context_from_headers(request.headers());
            let span = tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version()
            );
            span.set_parent(parent);
            span
        });

    Router::new()
        .route(
            "/v1/system/info",
            axum::routing::get(api::system::system_info),
        )
        .route(
            "/v1/system/health",
            axum::routing::get(api::system::system_health),
        )
        .route(
            "/v1/registry",
            axum::routing::get(api::apps::registry_status),
        )
        .route(
            "/v1/apps/authorize",
            axum::routing::post(api::apps::authorize_apps),
        )
        .route(
            "/v1/openapi.json",
            axum::routing::get(api::openapi::openapi_json),
        )
        .fallback(api::vanity::vanity_redirect)
        .layer(trace_layer)
        .with_state(state)
}
