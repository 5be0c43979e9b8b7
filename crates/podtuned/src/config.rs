//! Config assembly: file (optional) + command-line overrides.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use podtune_core::ControllerConfig;

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub intent: Option<PathBuf>,
    pub interval: Option<String>,
    pub dry_run: bool,
}

pub fn load(path: Option<&Path>, overrides: Overrides) -> anyhow::Result<ControllerConfig> {
    let mut config = match path {
        Some(path) => ControllerConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ControllerConfig::default(),
    };

    if let Some(intent) = overrides.intent {
        config.intent = intent;
    }
    if let Some(interval) = overrides.interval {
        config.schedule.interval = interval;
    }
    if overrides.dry_run {
        config.schedule.dry_run = true;
    }

    config.validate().context("invalid configuration")?;
    debug!(?config, "configuration loaded");
    Ok(config)
}
