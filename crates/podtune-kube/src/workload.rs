//! Workload identity and the pure pieces of pod inspection.

use std::fmt;

use k8s_openapi::api::core::v1::Pod;
use serde_json::json;
use tracing::warn;

use podtune_core::config::TargetConfig;

use crate::error::{OrchestratorError, OrchestratorResult};

/// The controlled pod and container. Resolved once at startup; if the pod
/// is replaced the controller keeps addressing the old name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadRef {
    pub namespace: String,
    pub pod: String,
    pub container: String,
    /// Key under `resources.limits`, e.g. `cpu`.
    pub resource: String,
}

impl WorkloadRef {
    pub fn new(target: &TargetConfig, pod: impl Into<String>) -> Self {
        Self {
            namespace: target.namespace.clone(),
            pod: pod.into(),
            container: target.container.clone(),
            resource: target.resource.clone(),
        }
    }
}

impl fmt::Display for WorkloadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}[{}]", self.namespace, self.pod, self.container)
    }
}

/// Pick the pod to control from the names matching the selector, in
/// API list order.
///
/// Precondition: the selector identifies exactly one pod. With
/// `require_unique` unset, extra matches are logged and the first wins.
pub fn select_pod(names: &[String], target: &TargetConfig) -> OrchestratorResult<String> {
    match names {
        [] => Err(OrchestratorError::NoMatch {
            namespace: target.namespace.clone(),
            selector: target.selector.clone(),
        }),
        [only] => Ok(only.clone()),
        [first, ..] if !target.require_unique => {
            warn!(
                count = names.len(),
                selector = %target.selector,
                chosen = %first,
                "selector matches multiple pods, using the first"
            );
            Ok(first.clone())
        }
        _ => Err(OrchestratorError::Ambiguous {
            count: names.len(),
            selector: target.selector.clone(),
        }),
    }
}

/// Read `resources.limits[resource]` of the named container.
///
/// Returns `None` when the container is missing or the limit is unset.
pub fn container_limit(pod: &Pod, container: &str, resource: &str) -> Option<String> {
    pod.spec
        .as_ref()?
        .containers
        .iter()
        .find(|c| c.name == container)?
        .resources
        .as_ref()?
        .limits
        .as_ref()?
        .get(resource)
        .map(|q| q.0.clone())
}

/// Strategic-merge patch touching only the container's limit.
///
/// Containers merge by name, so other containers and fields are left as is.
pub fn resize_patch(container: &str, resource: &str, limit: &str) -> serde_json::Value {
    let mut limits = serde_json::Map::new();
    limits.insert(resource.to_string(), json!(limit));
    json!({
        "spec": {
            "containers": [{
                "name": container,
                "resources": {
                    "limits": limits
                }
            }]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use k8s_openapi::api::core::v1::{Container, PodSpec, ResourceRequirements};
    use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

    fn target() -> TargetConfig {
        TargetConfig {
            namespace: "core".to_string(),
            selector: "app=upf".to_string(),
            container: "upf".to_string(),
            resource: "cpu".to_string(),
            require_unique: false,
        }
    }

    fn container(name: &str, limits: &[(&str, &str)]) -> Container {
        let limits: BTreeMap<String, Quantity> = limits
            .iter()
            .map(|(k, v)| (k.to_string(), Quantity(v.to_string())))
            .collect();
        Container {
            name: name.to_string(),
            resources: Some(ResourceRequirements {
                limits: Some(limits),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn pod(containers: Vec<Container>) -> Pod {
        Pod {
            spec: Some(PodSpec {
                containers,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn select_single_match() {
        assert_eq!(select_pod(&names(&["upf-0"]), &target()).unwrap(), "upf-0");
    }

    #[test]
    fn select_no_match_fails() {
        let err = select_pod(&[], &target()).unwrap_err();
        assert!(matches!(err, OrchestratorError::NoMatch { .. }));
    }

    #[test]
    fn select_multiple_takes_first() {
        let chosen = select_pod(&names(&["upf-b", "upf-a"]), &target()).unwrap();
        assert_eq!(chosen, "upf-b");
    }

    #[test]
    fn select_multiple_fails_when_unique_required() {
        let mut t = target();
        t.require_unique = true;
        let err = select_pod(&names(&["upf-a", "upf-b"]), &t).unwrap_err();
        assert!(matches!(err, OrchestratorError::Ambiguous { count: 2, .. }));

        // A single match is still fine.
        assert_eq!(select_pod(&names(&["upf-a"]), &t).unwrap(), "upf-a");
    }

    #[test]
    fn reads_limit_of_named_container() {
        let p = pod(vec![
            container("sidecar", &[("cpu", "50m")]),
            container("upf", &[("cpu", "500m"), ("memory", "1Gi")]),
        ]);
        assert_eq!(container_limit(&p, "upf", "cpu").as_deref(), Some("500m"));
        assert_eq!(container_limit(&p, "upf", "memory").as_deref(), Some("1Gi"));
    }

    #[test]
    fn missing_container_or_limit_is_none() {
        let p = pod(vec![container("upf", &[("memory", "1Gi")])]);
        assert_eq!(container_limit(&p, "upf", "cpu"), None);
        assert_eq!(container_limit(&p, "other", "memory"), None);
        assert_eq!(container_limit(&Pod::default(), "upf", "cpu"), None);

        let bare = pod(vec![Container {
            name: "upf".to_string(),
            ..Default::default()
        }]);
        assert_eq!(container_limit(&bare, "upf", "cpu"), None);
    }

    #[test]
    fn patch_targets_single_container_limit() {
        let patch = resize_patch("upf", "cpu", "500m");
        assert_eq!(
            patch,
            json!({"spec":{"containers":[{"name":"upf","resources":{"limits":{"cpu":"500m"}}}]}})
        );
    }

    #[test]
    fn workload_display() {
        let w = WorkloadRef::new(&target(), "upf-0");
        assert_eq!(w.to_string(), "core/upf-0[upf]");
        assert_eq!(w.resource, "cpu");
    }
}
