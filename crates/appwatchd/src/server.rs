//! Metrics HTTP endpoint.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use tracing::warn;

use appwatch_metrics::MetricsRegistry;
use appwatch_metrics::registry::CONTENT_TYPE;

/// Build the router serving the exposition at `endpoint` plus `/healthz`.
pub fn metrics_router(registry: MetricsRegistry, endpoint: &str) -> Router {
    Router::new()
        .route(endpoint, get(prometheus_metrics))
        .route("/healthz", get(healthz))
        .with_state(registry)
}

/// GET {endpoint}
async fn prometheus_metrics(State(registry): State<MetricsRegistry>) -> impl IntoResponse {
    match registry.render() {
        Ok(body) => (StatusCode::OK, [("content-type", CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            warn!(error = %e, "failed to render metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn healthz() -> &'static str {
    "ok"
}
