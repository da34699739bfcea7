//! Shared test utilities for statusboard integration tests.
//!
//! Provides service JSON builders, wiremock backend helpers and router
//! construction against a mock backend.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use serde_json::{json, Value};
use statusboard::api::{create_router, AppState};
use statusboard::config::StatusboardConfig;
use statusboard::gateway::{GatewayConfig, ProxyGateway};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// UUID v4 string length: "xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx"
pub const UUID_V4_STRING_LEN: usize = 36;

/// Default timestamp used in fixtures.
pub const CHECKED_AT: &str = "2024-05-01T12:00:00Z";

// =============================================================================
// Service JSON Builders
// =============================================================================

/// Canonical service record.
pub fn service_json(url: &str, is_up: bool) -> Value {
    json!({
        "url": url,
        "isUp": is_up,
        "statusCode": if is_up { 200 } else { 503 },
        "responseTimeMs": 120.0,
        "lastCheckedAt": CHECKED_AT,
        "uptimePercentage": 99.5
    })
}

/// Record in the older snake_case schema with a word status.
pub fn legacy_service_json(url: &str, status: &str) -> Value {
    json!({
        "url": url,
        "status": status,
        "status_code": 200,
        "response_time_ms": 80,
        "last_checked": "2024-05-01 12:00:00",
        "uptime": 100
    })
}

pub fn snapshot_json(services: &[(&str, bool)]) -> Value {
    Value::Array(
        services
            .iter()
            .map(|(url, up)| service_json(url, *up))
            .collect(),
    )
}

// =============================================================================
// Mock Backend
// =============================================================================

/// Mount `GET /api/monitor` returning `body`.
pub async fn mount_list(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/api/monitor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount `GET /api/monitor` returning `status` with `body`.
pub async fn mount_list_status(server: &MockServer, status: u16, body: Value) {
    Mock::given(method("GET"))
        .and(path("/api/monitor"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount `POST /api/monitor/add` returning `status` with `body`.
pub async fn mount_add(server: &MockServer, status: u16, body: Value) {
    Mock::given(method("POST"))
        .and(path("/api/monitor/add"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Number of requests the mock received for `method` + `path`.
pub async fn request_count(server: &MockServer, http_method: &str, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == http_method && r.url.path() == request_path)
        .count()
}

/// Wait until the mock has seen at least `n` matching requests.
pub async fn wait_for_requests(server: &MockServer, http_method: &str, request_path: &str, n: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while request_count(server, http_method, request_path).await < n {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("backend did not receive the expected requests");
}

// =============================================================================
// Gateway / App Builders
// =============================================================================

pub fn gateway_for(server: &MockServer) -> ProxyGateway {
    gateway_with_timeout(server, 2_000)
}

pub fn gateway_with_timeout(server: &MockServer, timeout_ms: u64) -> ProxyGateway {
    ProxyGateway::new(GatewayConfig::new(server.uri(), timeout_ms)).expect("valid mock uri")
}

pub fn config_for(server: &MockServer) -> StatusboardConfig {
    let mut config = StatusboardConfig::default();
    config.gateway.base_url = server.uri();
    config.gateway.timeout_ms = 2_000;
    config
}

/// Router with no server-side poller.
pub fn make_app(server: &MockServer) -> (axum::Router, Arc<AppState>) {
    let config = Arc::new(config_for(server));
    let state = Arc::new(AppState::new(config).expect("valid gateway config"));
    (create_router(Arc::clone(&state)), state)
}

// =============================================================================
// Request Helpers
// =============================================================================

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

/// Wait until `pred` holds for the published state.
pub async fn wait_for_state<T, F>(rx: &mut watch::Receiver<T>, pred: F) -> T
where
    T: Clone,
    F: FnMut(&T) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(pred))
        .await
        .expect("timed out waiting for state")
        .expect("view-model dropped")
        .clone()
}
