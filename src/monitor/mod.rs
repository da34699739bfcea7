//! Monitored service data model.
//!
//! A [`MonitoredService`] is one row of a snapshot returned by the monitoring
//! backend. The client has no server-assigned identifier, so `url` is the
//! primary key within a snapshot.
//!
//! Backends in the wild speak more than one field-naming convention. Incoming
//! payloads are normalized by [`parse_snapshot`] into the canonical camelCase
//! schema, which is also what the proxy emits:
//!
//! ```json
//! {
//!   "url": "https://example.com",
//!   "isUp": true,
//!   "statusCode": 200,
//!   "responseTimeMs": 84.2,
//!   "lastCheckedAt": "2024-05-01T12:00:00Z",
//!   "uptimePercentage": 99.95
//! }
//! ```

mod error;
mod wire;

pub use error::SnapshotError;
pub use wire::parse_snapshot;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single monitored service as of the backend's last check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoredService {
    /// Identity key within a snapshot
    pub url: String,
    /// Liveness as of the last check
    pub is_up: bool,
    /// Last observed HTTP status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Last observed round-trip latency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<f64>,
    /// When the backend last checked this service
    pub last_checked_at: DateTime<Utc>,
    /// Rolling uptime computed by the backend, 0..=100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime_percentage: Option<f64>,
}

impl MonitoredService {
    /// Minimal service with only the required fields set.
    pub fn new(url: impl Into<String>, is_up: bool, last_checked_at: DateTime<Utc>) -> Self {
        Self {
            url: url.into(),
            is_up,
            status_code: None,
            response_time_ms: None,
            last_checked_at,
            uptime_percentage: None,
        }
    }

    /// Case-insensitive substring match on the url.
    ///
    /// `needle_lower` must already be lowercased; an empty needle matches
    /// everything.
    pub fn matches(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty() || self.url.to_lowercase().contains(needle_lower)
    }

    /// Human label for the liveness flag.
    pub fn status_label(&self) -> &'static str {
        if self.is_up {
            "Up"
        } else {
            "Down"
        }
    }
}
