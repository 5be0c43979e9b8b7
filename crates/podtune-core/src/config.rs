//! podtune.toml configuration.
//!
//! Every field has a default, so the controller runs without a config
//! file. Durations are written as strings (`"10s"`, `"500ms"`, `"1m"`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Top-level controller configuration. Built once at startup and passed
/// by reference to every component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Path to the intent (rule) file.
    pub intent: PathBuf,
    pub prometheus: PrometheusConfig,
    pub target: TargetConfig,
    pub kubernetes: KubernetesConfig,
    #[serde(rename = "loop")]
    pub schedule: LoopConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrometheusConfig {
    /// Base address of the Prometheus HTTP API, e.g. `http://prometheus:9090`.
    pub address: String,
    /// Instant-query expression yielding the active session count.
    pub query: String,
    pub timeout: String,
}

/// Which pod and container to control, and which limit to set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub namespace: String,
    /// Label selector used to locate the pod.
    pub selector: String,
    /// Container within the pod whose limit is resized.
    pub container: String,
    /// Resource name under `resources.limits` (`cpu`, `memory`).
    pub resource: String,
    /// Treat more than one selector match as fatal instead of taking the first.
    pub require_unique: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KubernetesConfig {
    /// Upper bound on any single API call.
    pub timeout: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    pub interval: String,
    pub cadence: Cadence,
    /// Log decisions without patching.
    pub dry_run: bool,
}

/// How the poll interval is measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cadence {
    /// Wait a full interval after each cycle finishes (end-to-start).
    #[default]
    FixedDelay,
    /// Start cycles on a fixed period (start-to-start); overrunning
    /// cycles push the next tick back rather than bursting.
    FixedRate,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            intent: PathBuf::from("intent.yaml"),
            prometheus: PrometheusConfig::default(),
            target: TargetConfig::default(),
            kubernetes: KubernetesConfig::default(),
            schedule: LoopConfig::default(),
        }
    }
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            address: "http://localhost:9090".to_string(),
            query: r#"amf_session{service="open5gs-amf-metrics",namespace="default"}"#.to_string(),
            timeout: "5s".to_string(),
        }
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            selector: "app.kubernetes.io/name=open5gs-upf".to_string(),
            container: "open5gs-upf".to_string(),
            resource: "cpu".to_string(),
            require_unique: false,
        }
    }
}

impl Default for KubernetesConfig {
    fn default() -> Self {
        Self {
            timeout: "10s".to_string(),
        }
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            interval: "10s".to_string(),
            cadence: Cadence::default(),
            dry_run: false,
        }
    }
}

impl ControllerConfig {
    /// Read and validate a TOML config file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: ControllerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check durations parse and are non-zero, and required strings are present.
    pub fn validate(&self) -> ConfigResult<()> {
        for (field, value) in [
            ("loop.interval", &self.schedule.interval),
            ("prometheus.timeout", &self.prometheus.timeout),
            ("kubernetes.timeout", &self.kubernetes.timeout),
        ] {
            if duration_field(field, value)?.is_zero() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }

        for (field, value) in [
            ("prometheus.address", &self.prometheus.address),
            ("prometheus.query", &self.prometheus.query),
            ("target.namespace", &self.target.namespace),
            ("target.selector", &self.target.selector),
            ("target.container", &self.target.container),
            ("target.resource", &self.target.resource),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        parse_duration(&self.schedule.interval).unwrap_or(Duration::from_secs(10))
    }

    pub fn prometheus_timeout(&self) -> Duration {
        parse_duration(&self.prometheus.timeout).unwrap_or(Duration::from_secs(5))
    }

    pub fn kubernetes_timeout(&self) -> Duration {
        parse_duration(&self.kubernetes.timeout).unwrap_or(Duration::from_secs(10))
    }
}

fn duration_field(field: &'static str, value: &str) -> ConfigResult<Duration> {
    parse_duration(value).ok_or_else(|| ConfigError::Duration {
        field,
        value: value.to_string(),
    })
}

/// Parse a duration string like "5s", "500ms", "1m". A bare number is seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        ms.parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}
