//! Orchestrator error types.

use std::time::Duration;

use thiserror::Error;

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("failed to load kubernetes client config: {0}")]
    Config(String),

    #[error("kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    #[error("kubernetes API call timed out after {0:?}")]
    Timeout(Duration),

    #[error("no pod in namespace {namespace} matches selector {selector}")]
    NoMatch { namespace: String, selector: String },

    #[error("{count} pods match selector {selector}, expected exactly one")]
    Ambiguous { count: usize, selector: String },
}
