//! podtune-kube — the controller's view of the orchestrator.
//!
//! The [`Orchestrator`] trait is the seam between the control loop and
//! Kubernetes. [`KubeOrchestrator`] implements it with the `kube` client
//! using ambient credentials (in-cluster service account or kubeconfig).
//!
//! ```text
//! locate()         → list pods by label selector, first match
//! current_limit()  → spec.containers[name].resources.limits[resource]
//! resize()         → strategic-merge patch on pods/{name}/resize
//! ```

pub mod client;
pub mod error;
pub mod workload;

pub use client::KubeOrchestrator;
pub use error::{OrchestratorError, OrchestratorResult};
pub use workload::{WorkloadRef, container_limit, resize_patch, select_pod};

use podtune_core::config::TargetConfig;

/// Read and write access to the controlled workload.
#[async_trait::async_trait]
pub trait Orchestrator: Send + Sync {
    /// Resolve the single pod to control.
    async fn locate(&self, target: &TargetConfig) -> OrchestratorResult<WorkloadRef>;

    /// Limit currently applied to the controlled container, or `None`
    /// when it is unset.
    async fn current_limit(&self, workload: &WorkloadRef) -> OrchestratorResult<Option<String>>;

    /// Resize the controlled container's limit in place.
    async fn resize(&self, workload: &WorkloadRef, limit: &str) -> OrchestratorResult<()>;
}
