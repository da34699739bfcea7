//! HTTP handler for the dashboard route

use super::render::{render_page, PageOptions};
use crate::api::AppState;
use crate::logging::generate_request_id;
use crate::viewmodel::{PollFailure, ViewState};
use axum::extract::{Query, State};
use axum::response::Html;
use serde::Deserialize;
use std::sync::Arc;

/// Query string of `GET /`.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// Search term
    #[serde(default)]
    pub q: Option<String>,
}

/// GET / - Render the dashboard.
///
/// Uses the server-side view-model when it runs; otherwise fetches once
/// through the gateway for this request.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Html<String> {
    let mut view = match &state.viewmodel {
        Some(viewmodel) => viewmodel.snapshot(),
        None => one_shot(&state).await,
    };
    view.search_term = query.q.unwrap_or_default();

    let options = PageOptions {
        refresh_seconds: state.config.dashboard.refresh_interval_seconds,
        backend: state.gateway.base_url(),
    };
    Html(render_page(&view, &options))
}

/// Single fetch reconciled into a fresh state.
async fn one_shot(state: &AppState) -> ViewState {
    let now = chrono::Utc::now();
    match state.gateway.list(&generate_request_id()).await {
        Ok(services) => {
            let mut view = ViewState::seeded(Some(services));
            view.generation = 1;
            view.last_success_at = Some(now);
            view
        }
        Err(e) => {
            tracing::warn!(error = %e, "Dashboard fetch failed");
            let mut view = ViewState::seeded(None);
            view.is_loading = false;
            view.last_failure = Some(PollFailure::from_error(&e, now, 1));
            view
        }
    }
}
