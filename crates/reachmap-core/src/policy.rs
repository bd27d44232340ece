//! NetworkPolicy selection: which policies govern a pod, and which peers
//! their rules admit.

use k8s_openapi::api::core::v1::{Namespace, Pod};
use k8s_openapi::api::networking::v1::{NetworkPolicy, NetworkPolicyPeer, NetworkPolicyPort};

use crate::error::Result;
use crate::ports::AllowedPort;
use crate::snapshot::{pod_ip, pod_namespace};
use crate::{ipblock, selector};

/// Traffic direction relative to the pod under evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ingress,
    Egress,
}

/// The policies that govern a pod: same namespace, subject selector matches.
pub fn applicable_policies<'a>(policies: &'a [NetworkPolicy], pod: &Pod) -> Vec<&'a NetworkPolicy> {
    policies
        .iter()
        .filter(|policy| {
            policy.metadata.namespace.as_deref().unwrap_or_default() == pod_namespace(pod)
                && policy
                    .spec
                    .as_ref()
                    .map_or(true, |spec| {
                        selector::matches(pod.metadata.labels.as_ref(), Some(&spec.pod_selector))
                    })
        })
        .collect()
}

/// Split policies into the ingress-bearing and egress-bearing sublists.
///
/// Empty or absent `policyTypes` implies Ingress. A policy naming both
/// directions lands in both sublists.
pub fn classify<'a>(
    policies: &[&'a NetworkPolicy],
) -> (Vec<&'a NetworkPolicy>, Vec<&'a NetworkPolicy>) {
    let mut ingress = Vec::with_capacity(policies.len());
    let mut egress = Vec::with_capacity(policies.len());

    for policy in policies {
        let types = policy
            .spec
            .as_ref()
            .and_then(|spec| spec.policy_types.as_deref())
            .unwrap_or_default();

        if types.is_empty() || types.iter().any(|t| t == "Ingress") {
            ingress.push(*policy);
        }
        if types.iter().any(|t| t == "Egress") {
            egress.push(*policy);
        }
    }

    (ingress, egress)
}

/// Whether one peer expression admits a candidate pod.
///
/// The three sub-selectors are AND-combined. An absent namespace selector
/// restricts the peer to the policy's own namespace; a present-but-empty one
/// admits any namespace.
pub fn peer_admits(
    peer: &NetworkPolicyPeer,
    candidate: &Pod,
    candidate_ns: Option<&Namespace>,
    policy_ns: &str,
) -> Result<bool> {
    match &peer.namespace_selector {
        None => {
            if pod_namespace(candidate) != policy_ns {
                return Ok(false);
            }
        }
        Some(ns_selector) => {
            let ns_labels = candidate_ns.and_then(|ns| ns.metadata.labels.as_ref());
            if !selector::matches(ns_labels, Some(ns_selector)) {
                return Ok(false);
            }
        }
    }

    if !selector::matches(candidate.metadata.labels.as_ref(), peer.pod_selector.as_ref()) {
        return Ok(false);
    }

    ipblock::contains(peer.ip_block.as_ref(), pod_ip(candidate))
}

/// Walk the rules of one direction's policies and collect the ports on which
/// they admit the candidate.
///
/// An empty policy list means the pod is not isolated in this direction:
/// every peer is admitted on every port. Otherwise a rule with no peers
/// admits everyone on its ports, and each listed peer is an independent
/// (OR-combined) chance to admit. The returned list may hold duplicates;
/// dedup happens at intersection time.
pub fn admitted_ports(
    candidate: &Pod,
    candidate_ns: Option<&Namespace>,
    policies: &[&NetworkPolicy],
    direction: Direction,
) -> Result<(Vec<AllowedPort>, bool)> {
    if policies.is_empty() {
        return Ok((Vec::new(), true));
    }

    let mut ports = Vec::new();
    let mut admitted = false;

    for policy in policies {
        let Some(spec) = &policy.spec else {
            continue;
        };
        let policy_ns = policy.metadata.namespace.as_deref().unwrap_or_default();

        match direction {
            Direction::Ingress => {
                for rule in spec.ingress.as_deref().unwrap_or_default() {
                    let peers = rule.from.as_deref().unwrap_or_default();
                    let rule_ports = rule.ports.as_deref().unwrap_or_default();
                    if admit_rule(peers, rule_ports, candidate, candidate_ns, policy_ns, &mut ports)? {
                        admitted = true;
                    }
                }
            }
            Direction::Egress => {
                for rule in spec.egress.as_deref().unwrap_or_default() {
                    let peers = rule.to.as_deref().unwrap_or_default();
                    let rule_ports = rule.ports.as_deref().unwrap_or_default();
                    if admit_rule(peers, rule_ports, candidate, candidate_ns, policy_ns, &mut ports)? {
                        admitted = true;
                    }
                }
            }
        }
    }

    Ok((ports, admitted))
}

/// One rule: no peers admits everyone, otherwise any matching peer admits.
fn admit_rule(
    peers: &[NetworkPolicyPeer],
    rule_ports: &[NetworkPolicyPort],
    candidate: &Pod,
    candidate_ns: Option<&Namespace>,
    policy_ns: &str,
    acc: &mut Vec<AllowedPort>,
) -> Result<bool> {
    if peers.is_empty() {
        acc.extend(rule_ports.iter().map(AllowedPort::from));
        return Ok(true);
    }

    let mut admitted = false;
    for peer in peers {
        if peer_admits(peer, candidate, candidate_ns, policy_ns)? {
            acc.extend(rule_ports.iter().map(AllowedPort::from));
            admitted = true;
        }
    }

    Ok(admitted)
}

/// Full per-direction evaluation for one (target, candidate) pair: filter the
/// inventory's policies down to the target, classify, and walk the matching
/// direction's rules.
pub fn direction_ports(
    target: &Pod,
    candidate: &Pod,
    candidate_ns: Option<&Namespace>,
    policies: &[NetworkPolicy],
    direction: Direction,
) -> Result<(Vec<AllowedPort>, bool)> {
    let applicable = applicable_policies(policies, target);
    let (ingress, egress) = classify(&applicable);
    let directed = match direction {
        Direction::Ingress => ingress,
        Direction::Egress => egress,
    };
    admitted_ports(candidate, candidate_ns, &directed, direction)
}
