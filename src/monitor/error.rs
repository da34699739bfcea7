//! Error types for snapshot validation.

use thiserror::Error;

/// Reasons a backend payload is rejected as a snapshot.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnapshotError {
    /// Body is not valid JSON
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// Body is JSON but not an array
    #[error("expected a JSON array of services, got {0}")]
    NotAnArray(&'static str),

    /// An element does not match the service shape
    #[error("entry {index}: {reason}")]
    InvalidEntry { index: usize, reason: String },

    /// The same url appears twice in one snapshot
    #[error("duplicate url in snapshot: {0}")]
    DuplicateUrl(String),
}
