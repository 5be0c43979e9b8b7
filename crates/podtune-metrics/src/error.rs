//! Signal source error types.

use std::time::Duration;

use thiserror::Error;

pub type SignalResult<T> = Result<T, SignalError>;

/// Reasons a metrics query produced no usable value.
///
/// The controller does not branch on these; they exist for logging.
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("invalid prometheus address: {0}")]
    Address(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected status: {0}")]
    Status(u16),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("query rejected by backend: {0}")]
    Backend(String),

    #[error("sample is not a non-negative number: {0:?}")]
    InvalidValue(String),
}
