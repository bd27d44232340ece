//! Immutable per-request view of the cluster inventory.

use k8s_openapi::api::core::v1::{Namespace, Pod};
use k8s_openapi::api::networking::v1::NetworkPolicy;

use crate::error::{Error, Result};

/// Point-in-time inventory of pods, namespaces and NetworkPolicies.
///
/// Taken once per request and never mutated; every evaluation in this crate
/// reads from a single snapshot so all verdicts are mutually consistent.
pub struct ClusterSnapshot {
    pub pods: Vec<Pod>,
    pub namespaces: Vec<Namespace>,
    pub policies: Vec<NetworkPolicy>,
}

impl ClusterSnapshot {
    pub fn new(pods: Vec<Pod>, namespaces: Vec<Namespace>, policies: Vec<NetworkPolicy>) -> Self {
        Self {
            pods,
            namespaces,
            policies,
        }
    }

    /// Find a pod by name, searching every namespace. First match wins.
    pub fn pod_named(&self, name: &str) -> Result<&Pod> {
        self.pods
            .iter()
            .find(|pod| pod.metadata.name.as_deref() == Some(name))
            .ok_or_else(|| Error::PodNotFound(name.to_string()))
    }

    /// Look up a namespace object by name. A pod whose namespace is missing
    /// from the snapshot evaluates against empty namespace labels.
    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.namespaces
            .iter()
            .find(|ns| ns.metadata.name.as_deref() == Some(name))
    }
}

/// Namespace a pod belongs to, defaulting to the empty string when unset.
pub(crate) fn pod_namespace(pod: &Pod) -> &str {
    pod.metadata.namespace.as_deref().unwrap_or_default()
}

/// Pod IP as reported by the kubelet; empty until the pod is scheduled.
pub(crate) fn pod_ip(pod: &Pod) -> &str {
    pod.status
        .as_ref()
        .and_then(|status| status.pod_ip.as_deref())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pod(namespace: &str, name: &str) -> Pod {
        let mut pod = Pod::default();
        pod.metadata.name = Some(name.to_string());
        pod.metadata.namespace = Some(namespace.to_string());
        pod
    }

    #[test]
    fn finds_pod_by_name_across_namespaces() {
        let snapshot = ClusterSnapshot::new(
            vec![pod("default", "a"), pod("other", "b")],
            Vec::new(),
            Vec::new(),
        );

        let found = snapshot.pod_named("b").unwrap();
        assert_eq!(found.metadata.namespace.as_deref(), Some("other"));
    }

    #[test]
    fn missing_pod_is_an_error() {
        let snapshot = ClusterSnapshot::new(vec![pod("default", "a")], Vec::new(), Vec::new());
        assert!(matches!(
            snapshot.pod_named("ghost"),
            Err(Error::PodNotFound(name)) if name == "ghost"
        ));
    }
}
