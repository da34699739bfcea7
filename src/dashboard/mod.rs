//! Server-rendered status page served at `/`
//!
//! Renders the server-side view-model's current state as plain HTML:
//! overall banner, stale-data notice, search form and one card per service.
//! The page reloads itself on the polling interval; no JavaScript.

pub mod handler;
pub mod render;

pub use handler::{handle, DashboardQuery};
pub use render::{escape_html, render_page, PageOptions};
