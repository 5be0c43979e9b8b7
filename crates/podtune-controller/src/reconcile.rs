//! Reconciler — patch only when the applied limit diverges from the target.

use tracing::{info, warn};

use podtune_kube::{Orchestrator, WorkloadRef};

/// Relationship between the applied limit and the target for one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// Applied limit already equals the target.
    Aligned,
    /// Applied limit differs, or is unknown (`None`).
    Divergent { current: Option<String> },
}

impl Reconciliation {
    pub fn assess(current: Option<&str>, target: &str) -> Self {
        match current {
            Some(applied) if applied == target => Self::Aligned,
            _ => Self::Divergent {
                current: current.map(str::to_string),
            },
        }
    }
}

/// What the reconciler did this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// Already aligned; no call made.
    Unchanged,
    /// Resize patch accepted.
    Patched,
    /// Divergent, but dry-run mode suppressed the patch.
    Skipped,
    /// Resize patch rejected or timed out; retried next cycle.
    Failed,
}

/// Compare `current` against `desired` and issue at most one resize patch.
///
/// Patch errors are logged, not returned: the divergence persists, so the
/// next cycle tries again.
pub async fn reconcile<O>(
    orchestrator: &O,
    workload: &WorkloadRef,
    current: Option<&str>,
    desired: &str,
    dry_run: bool,
) -> PatchOutcome
where
    O: Orchestrator + ?Sized,
{
    let current = match Reconciliation::assess(current, desired) {
        Reconciliation::Aligned => {
            info!(%workload, limit = desired, "limit already applied, no change");
            return PatchOutcome::Unchanged;
        }
        Reconciliation::Divergent { current } => current,
    };

    if dry_run {
        info!(%workload, ?current, desired, "dry run, skipping resize");
        return PatchOutcome::Skipped;
    }

    match orchestrator.resize(workload, desired).await {
        Ok(()) => {
            info!(%workload, ?current, desired, "limit resized");
            PatchOutcome::Patched
        }
        Err(e) => {
            warn!(%workload, desired, error = %e, "resize patch failed");
            PatchOutcome::Failed
        }
    }
}
