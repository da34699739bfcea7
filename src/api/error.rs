//! HTTP error responses for the proxy surface.
//!
//! Every error body is `{"error": "<message>"}`, except add rejections from
//! the backend whose JSON object body is relayed unchanged.

use crate::gateway::GatewayError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Shown to browsers when listing fails below the HTTP layer.
pub const LIST_FAILED_MESSAGE: &str = "Failed to fetch monitoring data";

/// Shown to browsers when adding fails below the HTTP layer.
pub const ADD_FAILED_MESSAGE: &str = "Failed to add monitor";

/// An error response: status plus JSON body.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    body: serde_json::Value,
}

impl ApiError {
    pub fn new(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": message }),
        }
    }

    /// 400 with the given message.
    pub fn bad_request(message: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 500 with the given message.
    pub fn internal(message: &str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Backend status and body, unchanged when the body is a JSON object.
    pub fn relay(status: u16, body: serde_json::Value) -> Self {
        let status = upstream_status(status);
        match body {
            serde_json::Value::Object(_) => Self { status, body },
            serde_json::Value::String(text) if !text.trim().is_empty() => {
                Self::new(status, &text)
            }
            _ => Self::new(status, &format!("Backend returned HTTP {}", status.as_u16())),
        }
    }

    /// Map a failed list into the response the browser sees.
    pub fn from_list_failure(err: &GatewayError) -> Self {
        match err {
            GatewayError::Validation(msg) => Self::bad_request(msg),
            GatewayError::Upstream { status, .. } => {
                let message = err
                    .upstream_message()
                    .unwrap_or_else(|| format!("Backend returned HTTP {}", status));
                Self::new(upstream_status(*status), &message)
            }
            GatewayError::Transport { .. }
            | GatewayError::Configuration(_)
            | GatewayError::Disposed => Self::internal(LIST_FAILED_MESSAGE),
        }
    }

    /// Map a failed add into the response the browser sees.
    pub fn from_add_failure(err: &GatewayError) -> Self {
        match err {
            GatewayError::Validation(msg) => Self::bad_request(msg),
            GatewayError::Upstream { status, body } => Self::relay(*status, body.clone()),
            GatewayError::Transport { .. }
            | GatewayError::Configuration(_)
            | GatewayError::Disposed => Self::internal(ADD_FAILED_MESSAGE),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &serde_json::Value {
        &self.body
    }
}

/// Backend statuses outside the valid range become 502.
fn upstream_status(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
