use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;

use qr_backend::config::{ApiConfig, ImageConfig};
use qr_backend::features::qr::{MemoryStore, StorageGateway};
use qr_backend::{AppState, build_app};

fn build_test_app() -> Router {
    let gateway = StorageGateway::new(Arc::new(MemoryStore::new()), "bucket", "us-east-1");
    build_app(
        AppState::new(gateway, &ImageConfig::default()),
        &ApiConfig::default(),
    )
}

fn request_id_of(resp: &axum::response::Response) -> String {
    resp.headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

#[tokio::test]
async fn request_id_is_generated_when_missing() {
    let app = build_test_app();
    let resp = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .expect("request /health");

    assert_eq!(resp.status(), StatusCode::OK);
    let request_id = request_id_of(&resp);
    assert!(request_id.starts_with("req_"), "x-request-id should be generated");
}

#[tokio::test]
async fn request_id_uses_client_value_when_valid() {
    let app = build_test_app();
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/list")
                .header("x-request-id", "client.req-001")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("request /list");

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(request_id_of(&resp), "client.req-001");
}

#[tokio::test]
async fn request_id_replaces_unsafe_client_value() {
    let app = build_test_app();
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/info/qr_none.png")
                .header("x-request-id", "bad id/with spaces")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("request /info");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let request_id = request_id_of(&resp);
    assert_ne!(request_id, "bad id/with spaces");
    assert!(request_id.starts_with("req_"));
}
