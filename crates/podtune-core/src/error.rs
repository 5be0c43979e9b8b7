//! Error types for rule and configuration loading.
//!
//! Both are fatal at startup: there is no safe default policy to fall
//! back to, so callers abort instead of retrying.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for rule loading.
pub type RuleResult<T> = Result<T, RuleError>;

/// Result type alias for config loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading an intent (rule) file.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("failed to read intent file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed intent document: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("intent contains no rules")]
    Empty,

    #[error("rule with threshold {threshold} has an empty limit")]
    EmptyLimit { threshold: u64 },
}

/// Errors raised while loading the controller configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid duration for {field}: {value:?}")]
    Duration { field: &'static str, value: String },

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
