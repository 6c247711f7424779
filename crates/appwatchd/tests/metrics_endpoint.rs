//! Metrics endpoint tests.
//!
//! Drives the axum router in-process and checks that router activity
//! shows up in the exposition.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use appwatch_controller::{PodEventRouter, ReconcileQueue};
use appwatch_metrics::{MetricsConfig, MetricsRegistry};
use appwatch_state::{APP_NAME_LABEL, ApplicationStore, Pod};
use appwatchd::server::metrics_router;

async fn body_string(resp: axum::response::Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn metrics_endpoint_serves_pod_counters() {
    let registry = MetricsRegistry::new();
    let queue = Arc::new(ReconcileQueue::new());
    let store = Arc::new(ApplicationStore::open_in_memory().unwrap());
    let router = PodEventRouter::new(queue.enqueue_fn(), store)
        .with_metrics(&MetricsConfig::with_prefix("spark_operator_"), &registry)
        .unwrap();

    let pod = Pod::new("default", "pi-driver", "1").with_label(APP_NAME_LABEL, "pi");
    router.on_added(&pod);

    let app = metrics_router(registry, "/metrics");
    let req = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.contains("text/plain"));

    let body = body_string(resp).await;
    assert!(body.contains("spark_operator_spark_pod_added_event_count 1"));
    assert!(body.contains("spark_operator_spark_pod_updated_event_count 0"));
    assert!(body.contains("spark_operator_spark_pod_deleted_event_count 0"));
}

#[tokio::test]
async fn custom_endpoint_path() {
    let app = metrics_router(MetricsRegistry::new(), "/custom-metrics");

    let req = Request::builder()
        .uri("/custom-metrics")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn healthz_is_ok() {
    let app = metrics_router(MetricsRegistry::new(), "/metrics");
    let req = Request::builder()
        .uri("/healthz")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "ok");
}
