//! # HTTP Surface
//!
//! Proxy endpoints consumed by the browser, plus health, metrics and the
//! server-rendered dashboard.
//!
//! ## Endpoints
//!
//! - `GET /api/monitor` - Current snapshot from the backend (canonical JSON)
//! - `POST /api/monitor/add` - Forward `{"url": ...}` to the backend
//! - `GET /health` - Overall status from the server-side poller
//! - `GET /metrics` - Prometheus exposition
//! - `GET /` - HTML dashboard (`?q=` filters by url)
//!
//! ## Example
//!
//! ```no_run
//! use statusboard::api::{create_router, AppState};
//! use statusboard::config::StatusboardConfig;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(StatusboardConfig::default());
//! let state = Arc::new(AppState::new(config)?);
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Errors are JSON objects with a single `error` string. Transport failures
//! are reported generically; details go to the log only.

mod error;
mod health;
mod monitor;

pub use error::{ApiError, ADD_FAILED_MESSAGE, LIST_FAILED_MESSAGE};
pub use health::HealthResponse;

use crate::config::StatusboardConfig;
use crate::gateway::{GatewayError, ProxyGateway};
use crate::metrics::MetricsCollector;
use crate::viewmodel::PollingViewModel;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Maximum request body size (64 KiB).
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Shared application state accessible to all handlers.
pub struct AppState {
    pub config: Arc<StatusboardConfig>,
    /// Client for the monitoring backend
    pub gateway: Arc<ProxyGateway>,
    /// Server-side poller backing the dashboard and /health, if enabled
    pub viewmodel: Option<Arc<PollingViewModel>>,
    /// Server startup time for uptime tracking
    pub start_time: Instant,
    /// Metrics collector for observability
    pub metrics_collector: Arc<MetricsCollector>,
}

impl AppState {
    /// Create application state with a gateway built from `config.gateway`.
    pub fn new(config: Arc<StatusboardConfig>) -> Result<Self, GatewayError> {
        let gateway = Arc::new(ProxyGateway::new(config.gateway.clone())?);
        Ok(Self::with_gateway(config, gateway))
    }

    /// Create application state around an existing gateway.
    pub fn with_gateway(config: Arc<StatusboardConfig>, gateway: Arc<ProxyGateway>) -> Self {
        let start_time = Instant::now();
        let metrics_collector = Arc::new(MetricsCollector::install(start_time));

        Self {
            config,
            gateway,
            viewmodel: None,
            start_time,
            metrics_collector,
        }
    }

    /// Attach the server-side polling view-model.
    pub fn with_viewmodel(mut self, viewmodel: Arc<PollingViewModel>) -> Self {
        self.viewmodel = Some(viewmodel);
        self
    }
}

/// Create the main router with all endpoints configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(crate::dashboard::handler::handle))
        .route("/api/monitor", get(monitor::list))
        .route("/api/monitor/add", post(monitor::add))
        .route("/health", get(health::handle))
        .route("/metrics", get(crate::metrics::handler::metrics_handler))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
