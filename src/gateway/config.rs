//! Configuration for the proxy gateway.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where the monitoring backend lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Backend base URL, e.g. `http://localhost:8080`
    pub base_url: String,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_ms: 5000,
        }
    }
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Check that `raw` is an absolute http(s) URL with a host.
pub fn validate_base_url(raw: &str) -> Result<(), String> {
    if raw.trim().is_empty() {
        return Err("URL cannot be empty".to_string());
    }
    let url = reqwest::Url::parse(raw).map_err(|e| format!("invalid URL '{}': {}", raw, e))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme '{}', expected http or https", other)),
    }
    if url.host_str().is_none() {
        return Err(format!("URL '{}' has no host", raw));
    }
    Ok(())
}
