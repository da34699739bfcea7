//! HTML rendering for the status page.

use crate::monitor::MonitoredService;
use crate::viewmodel::{OverallStatus, ViewState};

/// Page-level settings that are not part of the view state.
#[derive(Debug, Clone)]
pub struct PageOptions<'a> {
    /// Seconds between automatic page reloads
    pub refresh_seconds: u64,
    /// Backend base URL, shown in the footer
    pub backend: &'a str,
}

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;margin:0;background:#f5f6f8;color:#1d2330}\
main{max-width:960px;margin:0 auto;padding:24px}\
h1{font-size:1.6rem;margin:0 0 16px}\
.banner{padding:14px 18px;border-radius:8px;font-weight:600;margin-bottom:12px}\
.banner.unknown{background:#e4e7ec}\
.banner.all_up{background:#d3f5de;color:#0b5d27}\
.banner.degraded{background:#fde2e1;color:#8a1c16}\
.notice{padding:10px 14px;border-radius:6px;background:#fff4d6;margin-bottom:12px}\
.counts{color:#5b6474;margin-bottom:16px}\
form{margin-bottom:16px}\
input[type=search]{padding:8px;width:320px;max-width:100%}\
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(280px,1fr));gap:12px}\
.card{background:#fff;border-radius:8px;padding:14px;box-shadow:0 1px 2px rgba(0,0,0,.08)}\
.url{font-weight:600;word-break:break-all;margin-bottom:8px}\
.badge{display:inline-block;padding:2px 8px;border-radius:10px;font-size:.8rem;font-weight:600}\
.badge.up{background:#d3f5de;color:#0b5d27}\
.badge.down{background:#fde2e1;color:#8a1c16}\
dl{display:grid;grid-template-columns:auto 1fr;gap:2px 10px;margin:10px 0 0;font-size:.9rem}\
dt{color:#5b6474}dd{margin:0}\
footer{margin-top:24px;color:#8a93a3;font-size:.8rem}";

/// Escape text for use in HTML content and double-quoted attributes.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_card(service: &MonitoredService) -> String {
    let badge = if service.is_up { "up" } else { "down" };
    let status_code = service
        .status_code
        .map(|code| code.to_string())
        .unwrap_or_else(|| "-".to_string());
    let response_time = service
        .response_time_ms
        .map(|ms| format!("{:.0} ms", ms))
        .unwrap_or_else(|| "-".to_string());
    let uptime = service
        .uptime_percentage
        .map(|pct| format!("{:.2}%", pct))
        .unwrap_or_else(|| "-".to_string());

    format!(
        "<article class=\"card\">\
<div class=\"url\">{url}</div>\
<span class=\"badge {badge}\">{label}</span>\
<dl>\
<dt>Status code</dt><dd>{status_code}</dd>\
<dt>Response time</dt><dd>{response_time}</dd>\
<dt>Uptime</dt><dd>{uptime}</dd>\
<dt>Last checked</dt><dd>{checked}</dd>\
</dl></article>",
        url = escape_html(&service.url),
        badge = badge,
        label = service.status_label(),
        status_code = status_code,
        response_time = response_time,
        uptime = uptime,
        checked = service.last_checked_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

/// Render the whole page for `state`.
pub fn render_page(state: &ViewState, options: &PageOptions<'_>) -> String {
    let overall = state.overall();
    let counts = state.counts();
    let search = escape_html(&state.search_term);

    let mut body = String::new();

    let headline = if state.is_loading {
        "Loading status..."
    } else {
        overall.headline()
    };
    body.push_str(&format!(
        "<div class=\"banner {}\">{}</div>",
        overall.as_str(),
        headline
    ));

    if let Some(failure) = &state.last_failure {
        let notice = if state.services.is_empty() {
            format!("Could not load monitoring data. {}", escape_html(&failure.message))
        } else {
            format!(
                "Showing last known data. Refresh failed at {}: {}",
                failure.at.format("%H:%M:%S UTC"),
                escape_html(&failure.message)
            )
        };
        body.push_str(&format!("<div class=\"notice\">{}</div>", notice));
    }

    if overall != OverallStatus::Unknown {
        body.push_str(&format!(
            "<div class=\"counts\">{} up, {} down, {} total</div>",
            counts.up, counts.down, counts.total
        ));
    }

    body.push_str(&format!(
        "<form method=\"get\" action=\"/\">\
<input type=\"search\" name=\"q\" placeholder=\"Filter by URL\" value=\"{}\">\
</form>",
        search
    ));

    let cards: Vec<String> = state.filtered_services().map(render_card).collect();
    if cards.is_empty() {
        let empty = if state.is_loading {
            String::new()
        } else if state.services.is_empty() {
            "<p>No services are being monitored yet.</p>".to_string()
        } else {
            format!("<p>No services match &quot;{}&quot;.</p>", search)
        };
        body.push_str(&empty);
    } else {
        body.push_str("<section class=\"grid\">");
        for card in cards {
            body.push_str(&card);
        }
        body.push_str("</section>");
    }

    format!(
        "<!DOCTYPE html>\
<html lang=\"en\"><head><meta charset=\"utf-8\">\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
<meta http-equiv=\"refresh\" content=\"{refresh}\">\
<title>Service Status</title><style>{style}</style></head>\
<body><main><h1>Service Status</h1>{body}\
<footer>Backend: {backend}</footer></main></body></html>",
        refresh = options.refresh_seconds,
        style = STYLE,
        body = body,
        backend = escape_html(options.backend),
    )
}
