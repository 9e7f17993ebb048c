//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint over the file and
//! memory backends.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use koi_cache::{
    api::create_router,
    cache::{BackendContext, CacheFactory, CacheOptions},
    AppState,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

// == Helper Functions ==

fn memory_app() -> Router {
    let factory = CacheFactory::with_context(BackendContext::isolated());
    let state = AppState::new(factory.open("memory").unwrap());
    create_router(state)
}

fn file_app(dir: &TempDir) -> Router {
    let factory = CacheFactory::with_context(BackendContext::isolated());
    let options = CacheOptions::new().with("directory", dir.path().to_string_lossy().into_owned());
    let state = AppState::new(factory.open(("file", options)).unwrap());
    create_router(state)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn set_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri("/set")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(key: &str) -> Request<Body> {
    Request::builder()
        .uri(format!("/get/{}", key))
        .body(Body::empty())
        .unwrap()
}

fn delete_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

// == SET Endpoint Tests ==

#[tokio::test]
async fn test_set_endpoint_success() {
    let app = memory_app();

    let response = app
        .oneshot(set_request(json!({"key": "test_key", "value": "test_value"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["key"], "test_key");
    assert!(json["message"].as_str().unwrap().contains("test_key"));
}

#[tokio::test]
async fn test_set_endpoint_empty_key() {
    let app = memory_app();

    let response = app
        .oneshot(set_request(json!({"key": "", "value": 1})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_set_endpoint_malformed_body() {
    let app = memory_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/set")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"value":"no key"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_set_then_get_structured_value() {
    let app = memory_app();
    let value = json!({"name": "Ada", "langs": ["en", "fr"], "age": 36});

    let response = app
        .clone()
        .oneshot(set_request(json!({"key": "person", "value": value})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get_request("person")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["key"], "person");
    assert_eq!(json["value"], value);
}

#[tokio::test]
async fn test_get_missing_key_memory() {
    let app = memory_app();

    let response = app.oneshot(get_request("missing")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("missing"));
}

#[tokio::test]
async fn test_file_backend_round_trip() {
    let dir = TempDir::new().unwrap();
    let app = file_app(&dir);

    let response = app
        .clone()
        .oneshot(set_request(json!({"key": "greeting", "value": [1, 2, 3]})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get_request("greeting")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["value"], json!([1, 2, 3]));

    let response = app.oneshot(get_request("other")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == DELETE Endpoint Tests ==

#[tokio::test]
async fn test_delete_endpoint_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let app = file_app(&dir);

    app.clone()
        .oneshot(set_request(json!({"key": "gone", "value": true})))
        .await
        .unwrap();

    for _ in 0..2 {
        let response = app.clone().oneshot(delete_request("/del/gone")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.oneshot(get_request("gone")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == FLUSH Endpoint Tests ==

#[tokio::test]
async fn test_flush_endpoint_clears_every_key() {
    let dir = TempDir::new().unwrap();
    let app = file_app(&dir);

    for key in ["a", "b", "c"] {
        app.clone()
            .oneshot(set_request(json!({"key": key, "value": key})))
            .await
            .unwrap();
    }

    let response = app.clone().oneshot(delete_request("/flush")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert!(json["message"].as_str().unwrap().contains("file"));

    for key in ["a", "b", "c"] {
        let response = app.clone().oneshot(get_request(key)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint_reports_backend() {
    let app = memory_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["backend"], "memory");
    assert!(json.get("timestamp").is_some());
}
