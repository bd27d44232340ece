//! JSON view models: projections of evaluator verdicts and inventory objects
//! into the shapes the API serves.

use k8s_openapi::api::core::v1::{Node, Pod};
use reachmap_core::{Admission, AllowedPort, PortSpan, Protocol, Reachability};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Serialize)]
pub struct Label {
    pub key: String,
    pub value: String,
}

fn labels_of(pod: &Pod) -> Vec<Label> {
    pod.metadata
        .labels
        .as_ref()
        .map(|labels| {
            labels
                .iter()
                .map(|(key, value)| Label {
                    key: key.clone(),
                    value: value.clone(),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn pod_name(pod: &Pod) -> String {
    pod.metadata.name.clone().unwrap_or_default()
}

fn pod_ip(pod: &Pod) -> String {
    pod.status
        .as_ref()
        .and_then(|status| status.pod_ip.clone())
        .unwrap_or_default()
}

/// One permitted protocol/port tuple. Fields meaning "any" are omitted.
#[derive(Debug, Serialize)]
pub struct PortInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_port: Option<i32>,
}

impl From<&AllowedPort> for PortInfo {
    fn from(rule: &AllowedPort) -> Self {
        let (port, end_port) = match rule.span {
            PortSpan::All => (None, None),
            PortSpan::Single(port) => (Some(port), None),
            PortSpan::Range { lo, hi } => (Some(lo), Some(hi)),
        };
        Self {
            protocol: rule.protocol.map(Protocol::as_str),
            port,
            end_port,
        }
    }
}

/// One direction's verdict. `ports` is omitted when nothing narrowed the
/// traffic (or when access is denied).
#[derive(Debug, Serialize)]
pub struct AccessVerdict {
    pub can_access: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<PortInfo>>,
}

impl From<&Admission> for AccessVerdict {
    fn from(admission: &Admission) -> Self {
        match admission {
            Admission::Denied => Self {
                can_access: false,
                ports: None,
            },
            Admission::Allowed(ports) if ports.is_empty() => Self {
                can_access: true,
                ports: None,
            },
            Admission::Allowed(ports) => Self {
                can_access: true,
                ports: Some(ports.iter().map(PortInfo::from).collect()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccessPod {
    pub name: String,
    pub ip: String,
    pub namespace: String,
    pub labels: Vec<Label>,
    pub ingress: AccessVerdict,
    pub egress: AccessVerdict,
}

/// The pod-detail response: the target, the policies that govern it, and a
/// bidirectional verdict for every pod in the cluster.
#[derive(Debug, Serialize)]
pub struct PodDetail {
    pub name: String,
    pub ip: String,
    pub namespace: String,
    pub labels: Vec<Label>,
    pub policy_names: Vec<String>,
    pub access_pods: Vec<AccessPod>,
}

impl From<&Reachability<'_>> for PodDetail {
    fn from(reachability: &Reachability<'_>) -> Self {
        let target = reachability.target;
        Self {
            name: pod_name(target),
            ip: pod_ip(target),
            namespace: target.metadata.namespace.clone().unwrap_or_default(),
            labels: labels_of(target),
            policy_names: reachability.policy_names.clone(),
            access_pods: reachability
                .peers
                .iter()
                .map(|peer| AccessPod {
                    name: pod_name(peer.pod),
                    ip: pod_ip(peer.pod),
                    namespace: peer.pod.metadata.namespace.clone().unwrap_or_default(),
                    labels: labels_of(peer.pod),
                    ingress: AccessVerdict::from(&peer.ingress),
                    egress: AccessVerdict::from(&peer.egress),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PodName {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct NodeSummary {
    pub name: String,
    pub total_pod: usize,
    pub pods: Vec<PodName>,
}

#[derive(Debug, Serialize)]
pub struct NodeList {
    pub total_node: usize,
    pub nodes: Vec<NodeSummary>,
}

impl NodeList {
    /// Group the cluster's pods under the node each is scheduled on.
    pub fn build(nodes: &[Node], pods: &[Pod]) -> Self {
        let mut by_node: HashMap<&str, Vec<PodName>> = HashMap::new();
        for pod in pods {
            let Some(node_name) = pod.spec.as_ref().and_then(|spec| spec.node_name.as_deref())
            else {
                continue;
            };
            by_node
                .entry(node_name)
                .or_default()
                .push(PodName { name: pod_name(pod) });
        }

        let nodes: Vec<NodeSummary> = nodes
            .iter()
            .map(|node| {
                let name = node.metadata.name.clone().unwrap_or_default();
                let pods = by_node.remove(name.as_str()).unwrap_or_default();
                NodeSummary {
                    total_pod: pods.len(),
                    name,
                    pods,
                }
            })
            .collect();

        Self {
            total_node: nodes.len(),
            nodes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NodeDetail {
    pub name: String,
    pub ip: String,
    pub pod_cidr: String,
}

impl From<&Node> for NodeDetail {
    fn from(node: &Node) -> Self {
        Self {
            name: node.metadata.name.clone().unwrap_or_default(),
            ip: node
                .status
                .as_ref()
                .and_then(|status| status.addresses.as_ref())
                .and_then(|addresses| addresses.first())
                .map(|address| address.address.clone())
                .unwrap_or_default(),
            pod_cidr: node
                .spec
                .as_ref()
                .and_then(|spec| spec.pod_cidr.clone())
                .unwrap_or_default(),
        }
    }
}
