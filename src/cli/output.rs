//! Output formatting helpers for CLI commands

use crate::monitor::MonitoredService;
use crate::viewmodel::{OverallStatus, ServiceCounts, ViewState};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde::Serialize;

/// JSON shape of `statusboard status --json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusView<'a> {
    pub overall: OverallStatus,
    pub counts: ServiceCounts,
    pub search_term: &'a str,
    pub services: Vec<&'a MonitoredService>,
}

impl<'a> From<&'a ViewState> for StatusView<'a> {
    fn from(state: &'a ViewState) -> Self {
        Self {
            overall: state.overall(),
            counts: state.counts(),
            search_term: &state.search_term,
            services: state.filtered_services().collect(),
        }
    }
}

fn dash<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Format services as a table
pub fn format_services_table<'a>(services: impl IntoIterator<Item = &'a MonitoredService>) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "URL",
        "Status",
        "Code",
        "Response",
        "Uptime",
        "Last checked",
    ]);

    for s in services {
        let status_str = if s.is_up {
            "Up".green().to_string()
        } else {
            "Down".red().to_string()
        };

        table.add_row(vec![
            Cell::new(&s.url),
            Cell::new(status_str),
            Cell::new(dash(s.status_code)),
            Cell::new(dash(s.response_time_ms.map(|ms| format!("{:.0}ms", ms)))),
            Cell::new(dash(s.uptime_percentage.map(|pct| format!("{:.2}%", pct)))),
            Cell::new(s.last_checked_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        ]);
    }

    table.to_string()
}

/// Format the filtered view as JSON
pub fn format_status_json(state: &ViewState) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&StatusView::from(state))
}

/// One-line overall banner, colored by status.
pub fn format_banner(state: &ViewState) -> String {
    let overall = state.overall();
    let counts = state.counts();
    let headline = match overall {
        OverallStatus::AllUp => overall.headline().green().bold(),
        OverallStatus::Degraded => overall.headline().red().bold(),
        OverallStatus::Unknown => overall.headline().yellow(),
    };

    if overall == OverallStatus::Unknown {
        headline.to_string()
    } else {
        format!(
            "{} ({} up, {} down, {} total)",
            headline, counts.up, counts.down, counts.total
        )
    }
}

/// Banner, table, and a note when the filter hides everything.
pub fn format_status_report(state: &ViewState) -> String {
    let mut out = format_banner(state);
    out.push('\n');

    if state.services.is_empty() {
        out.push_str("No services are being monitored yet.");
        return out;
    }

    let mut matches = state.filtered_services().peekable();
    if matches.peek().is_none() {
        out.push_str(&format!("No services match \"{}\".", state.search_term));
    } else {
        out.push_str(&format_services_table(matches));
    }
    out
}
