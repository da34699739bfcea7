//! Status command implementation

use crate::cli::{output, StatusArgs};
use crate::gateway::GatewayError;
use crate::logging::generate_request_id;
use crate::viewmodel::ViewState;

/// Describe a failed client request for the terminal.
pub(crate) fn describe_error(server: &str, err: &GatewayError) -> String {
    match err {
        GatewayError::Upstream { status, .. } => format!(
            "{} returned HTTP {}: {}",
            server,
            status,
            err.upstream_message()
                .unwrap_or_else(|| "no error message".to_string())
        ),
        GatewayError::Transport { kind, detail } => {
            format!("Could not reach {} ({}): {}", server, kind, detail)
        }
        other => other.to_string(),
    }
}

/// Handle `statusboard status` command
pub async fn handle_status(args: &StatusArgs) -> Result<String, Box<dyn std::error::Error>> {
    let gateway = args.server.gateway()?;
    let services = gateway
        .list(&generate_request_id())
        .await
        .map_err(|e| describe_error(gateway.base_url(), &e))?;

    let mut state = ViewState::seeded(Some(services));
    if let Some(search) = &args.search {
        state.search_term = search.clone();
    }

    if args.json {
        Ok(output::format_status_json(&state)?)
    } else {
        Ok(output::format_status_report(&state))
    }
}
