//! `kube`-backed orchestrator.

use std::future::Future;
use std::time::Duration;

use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, ListParams, Patch, PatchParams};
use kube::{Client, Config, ResourceExt};
use tracing::{debug, info};

use podtune_core::config::TargetConfig;

use crate::Orchestrator;
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::workload::{WorkloadRef, container_limit, resize_patch, select_pod};

/// Subresource that changes container resources without recreating the pod.
const RESIZE_SUBRESOURCE: &str = "resize";

const FIELD_MANAGER: &str = "podtune";

/// Orchestrator backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeOrchestrator {
    client: Client,
    timeout: Duration,
}

impl KubeOrchestrator {
    /// Connect using the ambient config (in-cluster, then kubeconfig).
    ///
    /// `timeout` bounds connect, read and write on the underlying client
    /// and every API call as a whole.
    pub async fn connect(timeout: Duration) -> OrchestratorResult<Self> {
        let mut config = Config::infer()
            .await
            .map_err(|e| OrchestratorError::Config(e.to_string()))?;
        config.connect_timeout = Some(timeout);
        config.read_timeout = Some(timeout);
        config.write_timeout = Some(timeout);

        let cluster = config.cluster_url.to_string();
        let client = Client::try_from(config)?;
        info!(%cluster, ?timeout, "kubernetes client ready");

        Ok(Self::from_client(client, timeout))
    }

    pub fn from_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }

    async fn bounded<T, F>(&self, call: F) -> OrchestratorResult<T>
    where
        F: Future<Output = Result<T, kube::Error>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| OrchestratorError::Timeout(self.timeout))?
            .map_err(OrchestratorError::from)
    }
}

#[async_trait::async_trait]
impl Orchestrator for KubeOrchestrator {
    async fn locate(&self, target: &TargetConfig) -> OrchestratorResult<WorkloadRef> {
        let params = ListParams::default().labels(&target.selector);
        let pods = self.bounded(self.pods(&target.namespace).list(&params)).await?;

        let names: Vec<String> = pods.items.iter().map(|p| p.name_any()).collect();
        debug!(
            namespace = %target.namespace,
            selector = %target.selector,
            matches = names.len(),
            "pod lookup"
        );

        let pod = select_pod(&names, target)?;
        Ok(WorkloadRef::new(target, pod))
    }

    async fn current_limit(&self, workload: &WorkloadRef) -> OrchestratorResult<Option<String>> {
        let pod = self
            .bounded(self.pods(&workload.namespace).get(&workload.pod))
            .await?;
        Ok(container_limit(&pod, &workload.container, &workload.resource))
    }

    async fn resize(&self, workload: &WorkloadRef, limit: &str) -> OrchestratorResult<()> {
        let patch = resize_patch(&workload.container, &workload.resource, limit);
        let params = PatchParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..PatchParams::default()
        };
        let pods = self.pods(&workload.namespace);

        self.bounded(pods.patch_subresource(
            RESIZE_SUBRESOURCE,
            &workload.pod,
            &params,
            &Patch::Strategic(&patch),
        ))
        .await?;

        debug!(%workload, limit, "resize patch accepted");
        Ok(())
    }
}
