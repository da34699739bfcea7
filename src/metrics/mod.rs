//! # Metrics Collection Module
//!
//! Prometheus export for the proxy and the server-side poller.
//!
//! ## Metrics Tracked
//!
//! **Counters:**
//! - `statusboard_gateway_requests_total{operation, outcome}` - Backend calls
//! - `statusboard_poll_ticks_total{outcome}` - Poll ticks by outcome
//!
//! **Histograms:**
//! - `statusboard_gateway_request_duration_seconds{operation}` - Backend latency
//!
//! **Gauges:**
//! - `statusboard_services{state}` - Up/down services in the last applied snapshot
//! - `statusboard_uptime_seconds` - Seconds since the server started

pub mod handler;

pub use metrics_exporter_prometheus::PrometheusBuilder;

use metrics_exporter_prometheus::PrometheusHandle;
use std::time::Instant;

/// Histogram buckets for backend round trips, in seconds.
const DURATION_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Owns the Prometheus handle and the server start time.
pub struct MetricsCollector {
    start_time: Instant,
    prometheus_handle: PrometheusHandle,
}

impl MetricsCollector {
    pub fn new(start_time: Instant, prometheus_handle: PrometheusHandle) -> Self {
        Self {
            start_time,
            prometheus_handle,
        }
    }

    /// Install the global recorder, or fall back to a detached handle when
    /// one is already installed (tests build many routers per process).
    pub fn install(start_time: Instant) -> Self {
        let handle = setup_metrics().unwrap_or_else(|e| {
            tracing::debug!("Metrics already initialized, creating new handle: {}", e);
            PrometheusBuilder::new().build_recorder().handle()
        });
        Self::new(start_time, handle)
    }

    /// Get uptime in seconds since server startup.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Render Prometheus metrics in text format.
    pub fn render_metrics(&self) -> String {
        metrics::gauge!("statusboard_uptime_seconds").set(self.uptime_seconds() as f64);
        self.prometheus_handle.render()
    }
}

/// Initialize the Prometheus recorder with latency buckets.
pub fn setup_metrics() -> Result<PrometheusHandle, Box<dyn std::error::Error>> {
    use metrics_exporter_prometheus::Matcher;

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("statusboard_gateway_request_duration_seconds".to_string()),
            DURATION_BUCKETS,
        )?
        .install_recorder()?;

    Ok(handle)
}
