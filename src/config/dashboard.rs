//! Dashboard configuration

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::time::Duration;

/// Accepted polling periods, in seconds.
pub const REFRESH_INTERVAL_RANGE: RangeInclusive<u64> = 5..=30;

/// Server-side dashboard and its polling view-model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Run a polling view-model behind `GET /`
    pub enabled: bool,
    /// Seconds between poll ticks (and between page auto-refreshes)
    pub refresh_interval_seconds: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            refresh_interval_seconds: 5,
        }
    }
}

impl DashboardConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_seconds)
    }
}
