//! Configuration module for statusboard
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`STATUSBOARD_*`, plus `BACKEND_API_URL`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use statusboard::config::StatusboardConfig;
//!
//! let config = StatusboardConfig::default();
//! assert_eq!(config.server.port, 3000);
//! assert_eq!(config.gateway.base_url, "http://localhost:8080");
//!
//! let toml = r#"
//! [gateway]
//! base_url = "http://monitor:9000"
//! "#;
//! let config: StatusboardConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.gateway.base_url, "http://monitor:9000");
//! ```

pub mod dashboard;
pub mod error;
pub mod logging;
pub mod server;

pub use dashboard::{DashboardConfig, REFRESH_INTERVAL_RANGE};
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use server::ServerConfig;

// Re-export GatewayConfig from gateway module
pub use crate::gateway::GatewayConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Commented example written by `statusboard config init`.
pub const EXAMPLE_CONFIG: &str = include_str!("../../statusboard.example.toml");

/// Unified configuration for the statusboard server.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StatusboardConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Monitoring backend the proxy forwards to
    pub gateway: GatewayConfig,
    /// Server-side dashboard and polling
    pub dashboard: DashboardConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl StatusboardConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_env_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides from an arbitrary lookup.
    ///
    /// Invalid values are silently ignored (previous values are kept).
    pub fn with_env_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        // Server settings
        if let Some(port) = lookup("STATUSBOARD_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Some(host) = lookup("STATUSBOARD_HOST") {
            self.server.host = host;
        }

        // Backend
        if let Some(url) = lookup("BACKEND_API_URL") {
            if !url.trim().is_empty() {
                self.gateway.base_url = url;
            }
        }
        if let Some(timeout) = lookup("STATUSBOARD_BACKEND_TIMEOUT_MS") {
            if let Ok(t) = timeout.parse() {
                self.gateway.timeout_ms = t;
            }
        }

        // Logging settings
        if let Some(level) = lookup("STATUSBOARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("STATUSBOARD_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        // Dashboard
        if let Some(dashboard) = lookup("STATUSBOARD_DASHBOARD") {
            self.dashboard.enabled = dashboard.to_lowercase() == "true";
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "port must be non-zero",
            ));
        }

        crate::gateway::validate_base_url(&self.gateway.base_url)
            .map_err(|message| ConfigError::validation("gateway.base_url", message))?;

        if self.gateway.timeout_ms == 0 {
            return Err(ConfigError::validation(
                "gateway.timeout_ms",
                "timeout must be greater than zero",
            ));
        }

        if !REFRESH_INTERVAL_RANGE.contains(&self.dashboard.refresh_interval_seconds) {
            return Err(ConfigError::validation(
                "dashboard.refresh_interval_seconds",
                format!(
                    "must be between {} and {} seconds",
                    REFRESH_INTERVAL_RANGE.start(),
                    REFRESH_INTERVAL_RANGE.end()
                ),
            ));
        }

        Ok(())
    }
}
