//! podtuned — the podtune daemon.
//!
//! Watches the active session count in Prometheus and resizes one pod
//! container's resource limit in place according to an intent file.
//!
//! # Usage
//!
//! ```text
//! podtuned run --config /etc/podtune/podtune.toml
//! podtuned run --intent intent.yaml --interval 10s --dry-run
//! podtuned check --intent intent.yaml --sessions 30
//! ```
//!
//! Any startup failure (config, intent, cluster access, pod lookup) exits
//! with status 1. Otherwise the daemon runs until interrupted.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

mod check;
mod config;
mod run;

/// Used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info,podtuned=debug,podtune=debug";

#[derive(Parser)]
#[command(name = "podtuned", about = "Session-driven in-place pod resizer", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the control loop.
    Run {
        #[command(flatten)]
        source: ConfigArgs,

        /// Poll interval, e.g. "10s" (overrides [loop].interval).
        #[arg(long)]
        interval: Option<String>,

        /// Log decisions without patching the pod.
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate an intent file and print its tiers.
    Check {
        #[command(flatten)]
        source: ConfigArgs,

        /// Also show which tier this session count resolves to.
        #[arg(long)]
        sessions: Option<u64>,
    },
}

#[derive(Args)]
struct ConfigArgs {
    /// Controller config file (TOML). Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Intent file (overrides the `intent` config key).
    #[arg(short, long)]
    intent: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            source,
            interval,
            dry_run,
        } => {
            let overrides = config::Overrides {
                intent: source.intent,
                interval,
                dry_run,
            };
            let config = config::load(source.config.as_deref(), overrides)?;
            run::run_controller(config).await
        }
        Command::Check { source, sessions } => {
            let overrides = config::Overrides {
                intent: source.intent,
                ..config::Overrides::default()
            };
            let config = config::load(source.config.as_deref(), overrides)?;
            check::check_intent(&config, sessions)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_log_filter_parses() {
        let filter = tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG_FILTER).unwrap();
        let rendered = filter.to_string();
        assert!(rendered.contains("podtuned=debug"), "{rendered}");
        assert!(rendered.contains("podtune=debug"), "{rendered}");
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
