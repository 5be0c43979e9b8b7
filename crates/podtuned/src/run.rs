//! `podtuned run` — startup sequence and the control loop.

use std::future::Future;

use anyhow::Context;
use tokio::sync::watch;
use tracing::{info, warn};

use podtune_controller::{Controller, Ticker};
use podtune_core::{ControllerConfig, RuleSet};
use podtune_kube::KubeOrchestrator;
use podtune_metrics::PrometheusSource;

pub async fn run_controller(config: ControllerConfig) -> anyhow::Result<()> {
    info!("podtune controller starting");

    // ── Startup (any failure is fatal) ─────────────────────────

    let rules = RuleSet::load(&config.intent)
        .with_context(|| format!("loading intent {}", config.intent.display()))?;
    for rule in rules.rules() {
        info!(threshold = rule.threshold, limit = %rule.limit, "tier");
    }

    let source = PrometheusSource::new(&config.prometheus, config.prometheus_timeout())
        .context("configuring prometheus source")?;
    info!(uri = %source.uri(), "signal source ready");

    let orchestrator = KubeOrchestrator::connect(config.kubernetes_timeout())
        .await
        .context("connecting to kubernetes")?;

    let mut controller = Controller::start(&config, rules, source, orchestrator)
        .await
        .with_context(|| {
            format!(
                "locating pod {} in namespace {}",
                config.target.selector, config.target.namespace
            )
        })?;

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(forward_shutdown(tokio::signal::ctrl_c(), shutdown_tx));

    // ── Control loop ───────────────────────────────────────────

    let ticker = Ticker::new(config.schedule.cadence, config.interval());
    controller.run(ticker, shutdown_rx).await;

    info!("podtune controller stopped");
    Ok(())
}

/// Flip `shutdown` once `signal` fires.
///
/// If the signal cannot be listened for, shutdown is never requested and
/// the sender is held so the loop keeps running.
async fn forward_shutdown<F>(signal: F, shutdown: watch::Sender<bool>)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            info!("shutdown signal received");
            let _ = shutdown.send(true);
        }
        Err(e) => {
            warn!(error = %e, "failed to listen for shutdown signal, running until killed");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn signal_requests_shutdown() {
        let (tx, rx) = watch::channel(false);
        forward_shutdown(async { Ok(()) }, tx).await;
        assert!(*rx.borrow());
    }

    #[tokio::test]
    async fn failed_signal_listener_keeps_running() {
        let (tx, mut rx) = watch::channel(false);
        let handle = tokio::spawn(forward_shutdown(
            async { Err(std::io::Error::other("no signal handler")) },
            tx,
        ));

        let changed = tokio::time::timeout(Duration::from_millis(50), rx.changed()).await;
        assert!(changed.is_err(), "shutdown must not be requested or dropped");
        assert!(!*rx.borrow());
        assert!(!handle.is_finished());
        handle.abort();
    }
}
