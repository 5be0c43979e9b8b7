//! Controller — startup and the steady-state cycle loop.

use tokio::sync::watch;
use tracing::{debug, info, warn};

use podtune_core::{ControllerConfig, RuleSet};
use podtune_kube::{Orchestrator, OrchestratorResult, WorkloadRef};
use podtune_metrics::SignalSource;

use crate::reconcile::{PatchOutcome, reconcile};
use crate::ticker::Ticker;

/// Everything observed and decided in one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub iteration: u64,
    pub sessions: u64,
    pub target: String,
    /// Applied limit before reconciliation; `None` when unknown.
    pub current: Option<String>,
    pub outcome: PatchOutcome,
}

/// Drives the control loop for a single workload.
///
/// The rule set and workload reference are fixed for the controller's
/// lifetime; signal and applied limit are re-read every cycle.
pub struct Controller<S, O> {
    rules: RuleSet,
    workload: WorkloadRef,
    source: S,
    orchestrator: O,
    dry_run: bool,
    iteration: u64,
}

impl<S, O> Controller<S, O>
where
    S: SignalSource,
    O: Orchestrator,
{
    /// Resolve the workload and build a controller.
    ///
    /// A lookup failure is returned to the caller, which treats it as
    /// fatal: there is nothing to control.
    pub async fn start(
        config: &ControllerConfig,
        rules: RuleSet,
        source: S,
        orchestrator: O,
    ) -> OrchestratorResult<Self> {
        let workload = orchestrator.locate(&config.target).await?;
        info!(%workload, tiers = rules.len(), "controlling workload");

        Ok(Self {
            rules,
            workload,
            source,
            orchestrator,
            dry_run: config.schedule.dry_run,
            iteration: 0,
        })
    }

    pub fn workload(&self) -> &WorkloadRef {
        &self.workload
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Number of cycles run so far.
    pub fn iterations(&self) -> u64 {
        self.iteration
    }

    /// Run one signal → resolve → read → reconcile pass.
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.iteration += 1;
        let iteration = self.iteration;

        let sessions = self.source.sessions().await;
        let target = self.rules.resolve(sessions).to_string();
        info!(iteration, sessions, target_limit = %target, "cycle");

        let current = match self.orchestrator.current_limit(&self.workload).await {
            Ok(current) => current,
            Err(e) => {
                warn!(
                    workload = %self.workload,
                    error = %e,
                    "failed to read applied limit, treating as unknown"
                );
                None
            }
        };
        debug!(iteration, ?current, "applied limit read");

        let outcome = reconcile(
            &self.orchestrator,
            &self.workload,
            current.as_deref(),
            &target,
            self.dry_run,
        )
        .await;

        CycleReport {
            iteration,
            sessions,
            target,
            current,
            outcome,
        }
    }

    /// Cycle until `shutdown` flips (or its sender is dropped).
    ///
    /// The first cycle starts immediately. Shutdown is observed only
    /// between cycles; a cycle in progress always completes.
    pub async fn run(&mut self, mut ticker: Ticker, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_ms = ticker.period().as_millis() as u64,
            dry_run = self.dry_run,
            "controller started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let report = self.run_cycle().await;
            debug!(?report, "cycle complete");

            tokio::select! {
                _ = ticker.wait() => {}
                _ = shutdown.changed() => break,
            }
        }

        info!(cycles = self.iteration, "controller shutting down");
    }
}
