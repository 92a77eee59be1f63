//! HTTP surface: shared state and router.

use std::sync::Arc;

use anyhow::Context;
use axum::body::Body;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router, middleware};
use rust_common::HttpConfig;
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::guard::{AccessGuard, access_guard};
use crate::observability::{EdgeMetrics, MakeCorrelationId, REQUEST_ID_HEADER, request_span};
use crate::proxy::{ProxyClient, proxy_handler};

/// Liveness endpoint
pub const HEALTH_PATH: &str = "/health";
/// Prometheus scrape endpoint
pub const METRICS_PATH: &str = "/metrics";

const SERVICE_NAME: &str = "portal-edge";

/// State shared by every handler and the guard middleware
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub guard: Arc<AccessGuard>,
    pub proxy: Arc<ProxyClient>,
    pub metrics: EdgeMetrics,
}

impl AppState {
    /// Builds the guard, the origin client and a fresh metrics registry.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let http = HttpConfig::default()
            .with_user_agent(format!("{SERVICE_NAME}/{}", env!("CARGO_PKG_VERSION")));
        let proxy = ProxyClient::new(config.backend_api_url.clone(), &http)
            .context("failed to build origin HTTP client")?;
        let metrics = EdgeMetrics::new().context("failed to register metrics")?;

        Ok(Self {
            guard: Arc::new(AccessGuard::from_config(&config)),
            proxy: Arc::new(proxy),
            metrics,
            config: Arc::new(config),
        })
    }
}

/// Full application router.
///
/// Layer order (outermost to innermost):
/// 1. Request id - assigns `x-request-id` when absent
/// 2. Trace - one span per request, keyed by that id
/// 3. Propagate request id - echoes the id on the response
/// 4. Access guard - redirects before any handler or static file runs
pub fn build_router(state: AppState) -> Router {
    let api_route = format!("{}/{{*path}}", state.config.api_prefix);
    let static_dir = &state.config.static_dir;
    let frontend =
        ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route(
            &api_route,
            get(proxy_handler)
                .post(proxy_handler)
                .put(proxy_handler)
                .patch(proxy_handler)
                .delete(proxy_handler)
                // Bodies are relayed whole; the origin enforces its own limit.
                .layer(DefaultBodyLimit::disable()),
        )
        .route(HEALTH_PATH, get(health))
        .route(METRICS_PATH, get(metrics))
        .fallback_service(frontend)
        .layer(middleware::from_fn_with_state(state.clone(), access_guard))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeCorrelationId))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|request: &Request<Body>| request_span(request)),
                )
                .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER)),
        )
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "service": SERVICE_NAME }))
}

async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(body) => ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
