//! Bidirectional reachability between a target pod and every other pod.

use k8s_openapi::api::core::v1::Pod;

use crate::error::Result;
use crate::policy::{self, applicable_policies, classify, Direction};
use crate::ports::{self, AllowedPort};
use crate::snapshot::{pod_namespace, ClusterSnapshot};

/// Outcome of one direction for one peer.
///
/// `Allowed` with an empty port list means no rule narrowed the traffic:
/// every port is open. That is a different thing from `Denied`, which is why
/// this is a variant and not an empty list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Denied,
    Allowed(Vec<AllowedPort>),
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed(_))
    }

    pub fn ports(&self) -> &[AllowedPort] {
        match self {
            Self::Denied => &[],
            Self::Allowed(ports) => ports,
        }
    }
}

/// Verdict for a single peer pod, both directions.
pub struct PeerVerdict<'a> {
    pub pod: &'a Pod,
    /// Can the peer reach the target?
    pub ingress: Admission,
    /// Can the target reach the peer?
    pub egress: Admission,
}

/// Reachability of a target pod against the whole inventory.
pub struct Reachability<'a> {
    pub target: &'a Pod,
    /// Names of the policies governing the target, in inventory order.
    pub policy_names: Vec<String>,
    /// One verdict per pod in the inventory, the target itself included.
    pub peers: Vec<PeerVerdict<'a>>,
}

/// Evaluate bidirectional reachability for the pod with the given name.
///
/// A flow is admitted only when both ends agree: the target's ingress and the
/// peer's egress for traffic toward the target, and symmetrically the other
/// way. The admitted ports are the intersection of what the two sides permit.
pub fn evaluate<'a>(snapshot: &'a ClusterSnapshot, target_name: &str) -> Result<Reachability<'a>> {
    let target = snapshot.pod_named(target_name)?;
    let target_ns = snapshot.namespace(pod_namespace(target));

    let applicable = applicable_policies(&snapshot.policies, target);
    let (target_ingress, target_egress) = classify(&applicable);
    let policy_names = applicable
        .iter()
        .filter_map(|p| p.metadata.name.clone())
        .collect();

    tracing::debug!(
        pods = snapshot.pods.len(),
        policies = applicable.len(),
        "evaluating reachability for {target_name}",
    );

    let mut peers = Vec::with_capacity(snapshot.pods.len());
    for pod in &snapshot.pods {
        if pod.metadata.name == target.metadata.name {
            // A pod always reaches itself, on every port.
            peers.push(PeerVerdict {
                pod,
                ingress: Admission::Allowed(Vec::new()),
                egress: Admission::Allowed(Vec::new()),
            });
            continue;
        }

        let peer_ns = snapshot.namespace(pod_namespace(pod));

        // Target side first; the peer's own policies only matter once the
        // target side admits.
        let (to_target_ports, to_target_ok) =
            policy::admitted_ports(pod, peer_ns, &target_ingress, Direction::Ingress)?;
        let ingress = if to_target_ok {
            let (from_peer_ports, from_peer_ok) = policy::direction_ports(
                pod,
                target,
                target_ns,
                &snapshot.policies,
                Direction::Egress,
            )?;
            if from_peer_ok {
                admission(&to_target_ports, &from_peer_ports)
            } else {
                Admission::Denied
            }
        } else {
            Admission::Denied
        };

        let (from_target_ports, from_target_ok) =
            policy::admitted_ports(pod, peer_ns, &target_egress, Direction::Egress)?;
        let egress = if from_target_ok {
            let (at_peer_ports, at_peer_ok) = policy::direction_ports(
                pod,
                target,
                target_ns,
                &snapshot.policies,
                Direction::Ingress,
            )?;
            if at_peer_ok {
                admission(&from_target_ports, &at_peer_ports)
            } else {
                Admission::Denied
            }
        } else {
            Admission::Denied
        };

        peers.push(PeerVerdict { pod, ingress, egress });
    }

    Ok(Reachability {
        target,
        policy_names,
        peers,
    })
}

/// Combine the two sides' port lists into a final verdict.
fn admission(ours: &[AllowedPort], theirs: &[AllowedPort]) -> Admission {
    let (shared, admitted) = ports::intersect_all(&ports::dedupe(ours), &ports::dedupe(theirs));
    if admitted {
        Admission::Allowed(shared)
    } else {
        Admission::Denied
    }
}
