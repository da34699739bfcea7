//! Proxy endpoints: list and add monitors.

use super::error::ApiError;
use crate::api::AppState;
use crate::logging::request_id_from_headers;
use crate::monitor::MonitoredService;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;

/// GET /api/monitor - Forward to the backend and return the canonical snapshot.
pub async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<MonitoredService>>, ApiError> {
    let request_id = request_id_from_headers(&headers);

    match state.gateway.list(&request_id).await {
        Ok(services) => Ok(Json(services)),
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Monitor list failed");
            Err(ApiError::from_list_failure(&e))
        }
    }
}

/// Pull a non-blank `url` string out of an add request body.
fn extract_url(body: &[u8]) -> Result<String, ApiError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|_| ApiError::bad_request("Invalid JSON body"))?;

    value
        .get("url")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::bad_request("URL is required"))
}

/// POST /api/monitor/add - Validate, forward, relay the backend's answer.
pub async fn add(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request_id = request_id_from_headers(&headers);
    let url = extract_url(&body)?;

    let confirmation = state.gateway.add(&url, &request_id).await.map_err(|e| {
        tracing::warn!(request_id = %request_id, url = %url, error = %e, "Monitor add failed");
        ApiError::from_add_failure(&e)
    })?;

    // Pull the new entry into the server-side dashboard without waiting for it.
    if let Some(viewmodel) = state.viewmodel.clone() {
        tokio::spawn(async move {
            viewmodel.refresh().await;
        });
    }

    let status = StatusCode::from_u16(confirmation.status).unwrap_or(StatusCode::OK);
    Ok((status, Json(confirmation.body)).into_response())
}
