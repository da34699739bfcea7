//! Request ID generation

use axum::http::HeaderMap;
use uuid::Uuid;

/// Generate a new request ID using UUID v4
///
/// # Examples
///
/// ```
/// use statusboard::logging::generate_request_id;
///
/// let request_id = generate_request_id();
/// assert!(!request_id.is_empty());
/// ```
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Reuse the caller's `x-request-id` when it is sane, otherwise mint one.
pub fn request_id_from_headers(headers: &HeaderMap) -> String {
    headers
        .get(crate::gateway::REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= 128)
        .map(str::to_string)
        .unwrap_or_else(generate_request_id)
}
