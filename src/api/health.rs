//! Health check endpoint handler.

use crate::api::AppState;
use crate::viewmodel::{OverallStatus, ServiceCounts};
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    /// Backend base URL the proxy forwards to
    pub backend: String,
    /// Tally from the server-side poller, when it runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<ServiceCounts>,
    /// Message of the poller's last failed tick, if the failure is current
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_poll_error: Option<String>,
}

/// GET /health - Status derived from the latest snapshot.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let snapshot = state.viewmodel.as_ref().map(|vm| vm.snapshot());

    let status = match snapshot.as_ref().map(|s| s.overall()) {
        Some(OverallStatus::AllUp) => "healthy",
        Some(OverallStatus::Degraded) => "degraded",
        Some(OverallStatus::Unknown) | None => "unknown",
    };

    Json(HealthResponse {
        status: status.to_string(),
        uptime_seconds: state.metrics_collector.uptime_seconds(),
        backend: state.gateway.base_url().to_string(),
        services: snapshot.as_ref().map(|s| s.counts()),
        last_poll_error: snapshot
            .as_ref()
            .and_then(|s| s.last_failure.as_ref())
            .map(|f| f.message.clone()),
    })
}
