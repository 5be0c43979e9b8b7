//! podtune-metrics — the controller's load signal.
//!
//! ```text
//! PrometheusSource
//!   ├── query()      → Result<u64, SignalError>   (GET /api/v1/query)
//!   └── sessions()   → u64, FALLBACK_SESSIONS on any error
//! ```
//!
//! A missing signal biases toward the lowest resource tier instead of
//! stalling the loop, so `sessions()` never fails.

pub mod error;
pub mod prometheus;

pub use error::{SignalError, SignalResult};
pub use prometheus::{PrometheusSource, parse_query_response};

/// Session count reported when the backend cannot be queried.
pub const FALLBACK_SESSIONS: u64 = 0;

/// Source of the active-session signal.
#[async_trait::async_trait]
pub trait SignalSource: Send + Sync {
    /// Current active session count.
    ///
    /// Infallible by contract: implementations log failures and return
    /// [`FALLBACK_SESSIONS`].
    async fn sessions(&self) -> u64;
}
