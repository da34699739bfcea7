//! statusboard - uptime status dashboard
//!
//! Keeps a locally fresh view of a monitoring backend's services and serves it
//! as a dashboard, behind a thin proxy that forwards list and add requests to
//! the backend.
//!
//! - [`viewmodel`] - polling view-model: periodic fetch, search filter, teardown
//! - [`gateway`] - backend client: list and add, error taxonomy
//! - [`monitor`] - the service record and snapshot parsing
//! - [`api`] - HTTP proxy endpoints, health and metrics
//! - [`dashboard`] - server-rendered status page

pub mod api;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod gateway;
pub mod logging;
pub mod metrics;
pub mod monitor;
pub mod viewmodel;
