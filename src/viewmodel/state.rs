//! Published view state and its derived views.

use crate::gateway::{GatewayError, TransportErrorKind};
use crate::monitor::MonitoredService;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Everything a renderer needs, published as one value.
///
/// `services` is only ever replaced wholesale, never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    /// Most recently applied snapshot, in backend order
    pub services: Arc<Vec<MonitoredService>>,
    /// Free-text url filter
    pub search_term: String,
    /// No data yet and the first tick has not resolved
    pub is_loading: bool,
    /// A fetch is in flight
    pub is_refreshing: bool,
    /// Set by a failed tick, cleared by the next applied snapshot
    pub last_failure: Option<PollFailure>,
    /// When the last snapshot was applied
    pub last_success_at: Option<DateTime<Utc>>,
    /// Number of snapshots applied so far
    pub generation: u64,
}

impl ViewState {
    /// Initial state: the seed if there is one, otherwise empty and loading.
    pub fn seeded(seed: Option<Vec<MonitoredService>>) -> Self {
        let is_loading = seed.is_none();
        Self {
            services: Arc::new(seed.unwrap_or_default()),
            search_term: String::new(),
            is_loading,
            is_refreshing: false,
            last_failure: None,
            last_success_at: None,
            generation: 0,
        }
    }

    /// Services whose url contains the search term, case-insensitively.
    ///
    /// Lazy and restartable: clone the iterator to walk it again. Nothing is
    /// cached between calls.
    pub fn filtered_services(&self) -> FilteredServices<'_> {
        FilteredServices {
            inner: self.services.iter(),
            needle: self.search_term.to_lowercase(),
        }
    }

    /// True only for a non-empty snapshot where every service is up.
    pub fn all_up(&self) -> bool {
        !self.services.is_empty() && self.services.iter().all(|s| s.is_up)
    }

    pub fn overall(&self) -> OverallStatus {
        if self.services.is_empty() {
            OverallStatus::Unknown
        } else if self.all_up() {
            OverallStatus::AllUp
        } else {
            OverallStatus::Degraded
        }
    }

    pub fn has_failure(&self) -> bool {
        self.last_failure.is_some()
    }

    pub fn counts(&self) -> ServiceCounts {
        let up = self.services.iter().filter(|s| s.is_up).count();
        ServiceCounts {
            total: self.services.len(),
            up,
            down: self.services.len() - up,
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::seeded(None)
    }
}

/// Iterator returned by [`ViewState::filtered_services`].
#[derive(Debug, Clone)]
pub struct FilteredServices<'a> {
    inner: std::slice::Iter<'a, MonitoredService>,
    needle: String,
}

impl<'a> Iterator for FilteredServices<'a> {
    type Item = &'a MonitoredService;

    fn next(&mut self) -> Option<Self::Item> {
        let needle = &self.needle;
        self.inner.find(|s| s.matches(needle))
    }
}

/// Aggregate status of the whole snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    /// Empty snapshot, nothing known yet
    Unknown,
    AllUp,
    /// At least one service is down
    Degraded,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Unknown => "unknown",
            OverallStatus::AllUp => "all_up",
            OverallStatus::Degraded => "degraded",
        }
    }

    /// Banner text for dashboards.
    pub fn headline(&self) -> &'static str {
        match self {
            OverallStatus::Unknown => "Status unknown",
            OverallStatus::AllUp => "All systems operational",
            OverallStatus::Degraded => "Some systems are down",
        }
    }
}

/// Up/down tally of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ServiceCounts {
    pub total: usize,
    pub up: usize,
    pub down: usize,
}

/// What went wrong on a failed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Backend answered with a non-success status
    Upstream { status: u16 },
    /// Backend unreachable, timed out, or sent a malformed snapshot
    Transport(TransportErrorKind),
    /// Anything else (misconfiguration)
    Other,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Upstream { .. } => "upstream",
            FailureKind::Transport(kind) => kind.as_str(),
            FailureKind::Other => "other",
        }
    }
}

impl From<&GatewayError> for FailureKind {
    fn from(err: &GatewayError) -> Self {
        match err {
            GatewayError::Upstream { status, .. } => FailureKind::Upstream { status: *status },
            GatewayError::Transport { kind, .. } => FailureKind::Transport(*kind),
            GatewayError::Validation(_)
            | GatewayError::Configuration(_)
            | GatewayError::Disposed => FailureKind::Other,
        }
    }
}

/// Failure indicator surfaced to renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct PollFailure {
    pub kind: FailureKind,
    /// User-facing summary; transport details stay in the logs
    pub message: String,
    pub at: DateTime<Utc>,
    /// Failed ticks in a row, including this one
    pub consecutive: u32,
}

impl PollFailure {
    pub(crate) fn from_error(err: &GatewayError, at: DateTime<Utc>, consecutive: u32) -> Self {
        let kind = FailureKind::from(err);
        let message = match (kind, err.upstream_message()) {
            (FailureKind::Upstream { .. }, Some(msg)) => msg,
            (FailureKind::Upstream { status }, None) => format!("Backend returned HTTP {}", status),
            (FailureKind::Transport(TransportErrorKind::Timeout), _) => {
                "Backend did not respond in time".to_string()
            }
            (FailureKind::Transport(TransportErrorKind::MalformedPayload), _) => {
                "Backend sent an invalid response".to_string()
            }
            (FailureKind::Transport(TransportErrorKind::Unreachable), _) => {
                "Backend is unreachable".to_string()
            }
            (FailureKind::Other, _) => "Failed to fetch monitoring data".to_string(),
        };
        Self {
            kind,
            message,
            at,
            consecutive,
        }
    }
}

/// Result of one poll tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// A snapshot of `services` entries replaced the previous one
    Applied { services: usize },
    /// The fetch failed; the previous snapshot is still in place
    Failed(FailureKind),
    /// Another fetch was already in flight
    Skipped,
    /// The view-model was disposed; nothing was written
    Disposed,
}

impl TickOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            TickOutcome::Applied { .. } => "applied",
            TickOutcome::Failed(_) => "failed",
            TickOutcome::Skipped => "skipped",
            TickOutcome::Disposed => "disposed",
        }
    }
}
