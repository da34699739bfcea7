//! Add command implementation

use crate::cli::{status::describe_error, AddArgs};
use crate::logging::generate_request_id;

/// Handle `statusboard add` command
pub async fn handle_add(args: &AddArgs) -> Result<String, Box<dyn std::error::Error>> {
    let url = args.url.trim();
    if url.is_empty() {
        return Err("URL is required".into());
    }

    let gateway = args.server.gateway()?;
    let confirmation = gateway
        .add(url, &generate_request_id())
        .await
        .map_err(|e| describe_error(gateway.base_url(), &e))?;

    let mut message = format!("✓ Now monitoring {} (HTTP {})", url, confirmation.status);
    if !confirmation.body.is_null() {
        message.push('\n');
        message.push_str(&serde_json::to_string_pretty(&confirmation.body)?);
    }
    Ok(message)
}
