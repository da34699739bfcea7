//! Proxy gateway to the monitoring backend.
//!
//! [`ProxyGateway`] forwards two operations to a configured backend base URL
//! and normalizes every response into a `Result`:
//!
//! - `GET  {base}/api/monitor` returns a validated snapshot
//! - `POST {base}/api/monitor/add` with `{"url": ...}` relays the backend's
//!   confirmation
//!
//! The gateway is stateless apart from its pooled HTTP client. Transport
//! failures, timeouts and malformed payloads never escape as panics; they
//! become [`GatewayError::Transport`].

mod config;
mod error;

pub use config::{validate_base_url, GatewayConfig};
pub use error::{GatewayError, TransportErrorKind};

use crate::logging::generate_request_id;
use crate::monitor::{parse_snapshot, MonitoredService};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Instant;

/// Header used to correlate a proxied request with backend logs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Backend list endpoint, relative to the base URL.
pub const LIST_PATH: &str = "/api/monitor";

/// Backend add endpoint, relative to the base URL.
pub const ADD_PATH: &str = "/api/monitor/add";

/// Successful add, relayed verbatim from the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddConfirmation {
    /// Backend's success status (200, 201, ...)
    pub status: u16,
    /// Backend's response body
    pub body: serde_json::Value,
}

/// Anything that can produce snapshots and accept new monitors.
///
/// The polling view-model depends on this trait rather than on
/// [`ProxyGateway`] directly so tests can drive it with scripted sources.
#[async_trait]
pub trait MonitorSource: Send + Sync + 'static {
    /// Fetch the current snapshot.
    async fn list_services(&self) -> Result<Vec<MonitoredService>, GatewayError>;

    /// Ask the backend to start monitoring `url`.
    async fn add_service(&self, url: &str) -> Result<AddConfirmation, GatewayError>;
}

/// HTTP client for the backend's list/add endpoints.
pub struct ProxyGateway {
    client: reqwest::Client,
    base_url: String,
    config: GatewayConfig,
}

impl ProxyGateway {
    /// Build a gateway with its own pooled client.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        validate_base_url(&config.base_url).map_err(GatewayError::Configuration)?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| GatewayError::Configuration(e.to_string()))?;
        Ok(Self::with_client(config, client))
    }

    /// Build a gateway around an existing client (for testing).
    pub fn with_client(config: GatewayConfig, client: reqwest::Client) -> Self {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            config,
        }
    }

    /// Base URL with trailing slashes removed.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Fetch and validate the backend's current snapshot.
    pub async fn list(&self, request_id: &str) -> Result<Vec<MonitoredService>, GatewayError> {
        let start = Instant::now();
        let result = self.fetch_list(request_id).await;
        record_outcome("list", start, &result);
        match &result {
            Ok(services) => tracing::debug!(
                request_id,
                services = services.len(),
                "Fetched monitor snapshot"
            ),
            Err(e) => tracing::debug!(request_id, error = %e, "Monitor list failed"),
        }
        result
    }

    /// Forward an add request. Blank URLs are rejected without a network call.
    pub async fn add(&self, url: &str, request_id: &str) -> Result<AddConfirmation, GatewayError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(GatewayError::Validation("URL is required".to_string()));
        }

        let start = Instant::now();
        let result = self.forward_add(url, request_id).await;
        record_outcome("add", start, &result);
        match &result {
            Ok(confirmation) => tracing::info!(
                request_id,
                url,
                status = confirmation.status,
                "Monitor added"
            ),
            Err(e) => tracing::debug!(request_id, url, error = %e, "Monitor add failed"),
        }
        result
    }

    async fn fetch_list(&self, request_id: &str) -> Result<Vec<MonitoredService>, GatewayError> {
        let endpoint = format!("{}{}", self.base_url, LIST_PATH);

        let response = self
            .client
            .get(&endpoint)
            .header(REQUEST_ID_HEADER, request_id)
            .send()
            .await
            .map_err(|e| self.classify_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.classify_error(e))?;

        if !status.is_success() {
            return Err(GatewayError::Upstream {
                status: status.as_u16(),
                body: relay_body(&body),
            });
        }

        Ok(parse_snapshot(&body)?)
    }

    async fn forward_add(&self, url: &str, request_id: &str) -> Result<AddConfirmation, GatewayError> {
        let endpoint = format!("{}{}", self.base_url, ADD_PATH);

        let response = self
            .client
            .post(&endpoint)
            .header(REQUEST_ID_HEADER, request_id)
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await
            .map_err(|e| self.classify_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.classify_error(e))?;

        if !status.is_success() {
            return Err(GatewayError::Upstream {
                status: status.as_u16(),
                body: relay_body(&body),
            });
        }

        Ok(AddConfirmation {
            status: status.as_u16(),
            body: relay_body(&body),
        })
    }

    /// Classify a reqwest error into a transport failure.
    fn classify_error(&self, e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::transport(
                TransportErrorKind::Timeout,
                format!("no response within {}ms", self.config.timeout_ms),
            )
        } else if e.is_decode() {
            GatewayError::transport(TransportErrorKind::MalformedPayload, e.to_string())
        } else {
            GatewayError::transport(TransportErrorKind::Unreachable, e.to_string())
        }
    }
}

#[async_trait]
impl MonitorSource for ProxyGateway {
    async fn list_services(&self) -> Result<Vec<MonitoredService>, GatewayError> {
        self.list(&generate_request_id()).await
    }

    async fn add_service(&self, url: &str) -> Result<AddConfirmation, GatewayError> {
        self.add(url, &generate_request_id()).await
    }
}

/// Backend body as JSON if it is JSON, as a string if it is text, null if empty.
fn relay_body(text: &str) -> serde_json::Value {
    if text.trim().is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| serde_json::Value::String(text.to_string()))
}

fn record_outcome<T>(operation: &'static str, start: Instant, result: &Result<T, GatewayError>) {
    let outcome = match result {
        Ok(_) => "success",
        Err(e) => e.outcome(),
    };
    metrics::counter!("statusboard_gateway_requests_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("statusboard_gateway_request_duration_seconds",
        "operation" => operation
    )
    .record(start.elapsed().as_secs_f64());
}
