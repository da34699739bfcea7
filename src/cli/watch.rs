//! Watch command implementation
//!
//! Drives a [`PollingViewModel`] against a statusboard server and redraws
//! the terminal on every published state change until Ctrl-C.

use crate::cli::{output, WatchArgs};
use crate::viewmodel::{PollingViewModel, ViewState};
use colored::Colorize;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

/// One full screen for `state`.
pub fn render_watch_frame(state: &ViewState, server: &str, interval_secs: u64) -> String {
    let mut frame = format!(
        "{} {} (every {}s, Ctrl-C to quit)\n",
        "statusboard".bold(),
        server,
        interval_secs
    );

    if !state.search_term.is_empty() {
        frame.push_str(&format!("Filter: {}\n", state.search_term));
    }

    if state.is_loading {
        frame.push_str("Loading status...\n");
        return frame;
    }

    if let Some(failure) = &state.last_failure {
        let notice = if state.services.is_empty() {
            format!("Could not load monitoring data: {}", failure.message)
        } else {
            format!(
                "Showing last known data. Refresh failed at {}: {}",
                failure.at.format("%H:%M:%S UTC"),
                failure.message
            )
        };
        frame.push_str(&notice.yellow().to_string());
        frame.push('\n');
    }

    frame.push_str(&output::format_status_report(state));
    frame.push('\n');

    if let Some(at) = state.last_success_at {
        frame.push_str(&format!("Updated {}", at.format("%H:%M:%S UTC")));
        if state.is_refreshing {
            frame.push_str(" (refreshing)");
        }
        frame.push('\n');
    }

    frame
}

/// Handle `statusboard watch` command
pub async fn run_watch(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let gateway = Arc::new(args.server.gateway()?);
    let server = gateway.base_url().to_string();

    let viewmodel = PollingViewModel::initialize(gateway, Duration::from_secs(args.interval), None);
    if let Some(search) = &args.search {
        viewmodel.set_search_term(search.clone());
    }

    let mut updates = viewmodel.subscribe();
    let mut stdout = std::io::stdout();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let state = updates.borrow_and_update().clone();
        write!(
            stdout,
            "{}{}",
            CLEAR_SCREEN,
            render_watch_frame(&state, &server, args.interval)
        )?;
        stdout.flush()?;

        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    viewmodel.dispose().await;
    Ok(())
}
