//! Error taxonomy for gateway operations.

use crate::monitor::SnapshotError;
use std::fmt;
use thiserror::Error;

/// Why a request never produced a usable backend response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection refused, DNS failure, reset mid-body
    Unreachable,
    /// No response within the configured timeout
    Timeout,
    /// Response arrived but is not a valid snapshot
    MalformedPayload,
}

impl TransportErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportErrorKind::Unreachable => "unreachable",
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::MalformedPayload => "malformed_payload",
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every way a gateway operation can fail. Never a panic, never a raw
/// transport error.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// Rejected locally; no network call was made.
    #[error("{0}")]
    Validation(String),

    /// Backend answered with a non-success status. `body` is relayed as-is
    /// (JSON when the backend sent JSON, otherwise its text as a string).
    #[error("backend returned HTTP {status}")]
    Upstream {
        status: u16,
        body: serde_json::Value,
    },

    /// Backend could not be reached, timed out, or sent garbage.
    #[error("transport error ({kind}): {detail}")]
    Transport {
        kind: TransportErrorKind,
        detail: String,
    },

    /// Gateway could not be constructed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The owning view-model was disposed; no request was sent.
    #[error("view-model has been disposed")]
    Disposed,
}

impl GatewayError {
    pub fn transport(kind: TransportErrorKind, detail: impl Into<String>) -> Self {
        GatewayError::Transport {
            kind,
            detail: detail.into(),
        }
    }

    /// Short label used for metrics and log fields.
    pub fn outcome(&self) -> &'static str {
        match self {
            GatewayError::Validation(_) => "validation",
            GatewayError::Upstream { .. } => "upstream",
            GatewayError::Transport { kind, .. } => kind.as_str(),
            GatewayError::Configuration(_) => "configuration",
            GatewayError::Disposed => "disposed",
        }
    }

    /// The backend's own error message, if it sent one.
    ///
    /// Looks for an `error` or `message` string in a JSON object body, or
    /// uses a bare string body.
    pub fn upstream_message(&self) -> Option<String> {
        let GatewayError::Upstream { body, .. } = self else {
            return None;
        };
        match body {
            serde_json::Value::Object(map) => ["error", "message"]
                .iter()
                .find_map(|key| map.get(*key).and_then(|v| v.as_str()))
                .map(str::to_string),
            serde_json::Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
            _ => None,
        }
    }
}

impl From<SnapshotError> for GatewayError {
    fn from(err: SnapshotError) -> Self {
        GatewayError::transport(TransportErrorKind::MalformedPayload, err.to_string())
    }
}
