//! Router-level tests against a store that fails every call, covering how
//! store errors map onto response codes for each operation.

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use common::{test_config, UnavailableStore};
use http_body_util::BodyExt;
use mongodb::bson::oid::ObjectId;
use product_service::config::StoreBackend;
use product_service::{build_router, AppState};
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;

fn app() -> Router {
    build_router(AppState {
        config: test_config(StoreBackend::Memory),
        store: Arc::new(UnavailableStore),
    })
}

async fn send(method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn some_id() -> String {
    ObjectId::new().to_hex()
}

#[tokio::test]
async fn list_failure_is_server_error_with_message() {
    let (status, body) = send(Method::GET, "/products", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "connection refused");
}

#[tokio::test]
async fn get_failure_is_server_error() {
    let (status, body) = send(Method::GET, &format!("/products/{}", some_id()), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "connection refused");
}

#[tokio::test]
async fn name_search_failure_is_server_error() {
    let (status, _) = send(Method::GET, "/products/name/widget", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = send(Method::GET, "/products/name/exact/widget", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn create_failure_is_bad_request() {
    let (status, body) = send(Method::POST, "/products", Some(r#"{"name":"Widget"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "connection refused");
}

#[tokio::test]
async fn update_failure_is_bad_request() {
    let (status, body) = send(
        Method::PUT,
        &format!("/products/{}", some_id()),
        Some(r#"{"price":5}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "connection refused");
}

#[tokio::test]
async fn delete_failures_are_server_errors() {
    let (status, _) = send(Method::DELETE, &format!("/products/{}", some_id()), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, body) = send(Method::DELETE, "/products", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "connection refused");
}

#[tokio::test]
async fn health_reports_unhealthy_store() {
    let (status, body) = send(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["service"], "product-service");
}

#[tokio::test]
async fn readiness_fails_when_store_is_down() {
    let (status, body) = send(Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["message"], "Service unavailable");
}
