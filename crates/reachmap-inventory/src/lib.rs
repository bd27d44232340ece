//! Cluster inventory access for Reachmap.
//!
//! Wraps a Kubernetes client and hands the evaluator a point-in-time
//! [`ClusterSnapshot`] of pods, namespaces and NetworkPolicies. All reads,
//! never a mutation.

use k8s_openapi::api::core::v1::{Namespace, Node, Pod};
use k8s_openapi::api::networking::v1::NetworkPolicy;
use kube::api::ListParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use reachmap_core::ClusterSnapshot;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("kubeconfig error: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Read-only client for the cluster the analyzer runs against.
#[derive(Clone)]
pub struct ClusterInventory {
    client: Client,
}

impl ClusterInventory {
    /// Connect using an explicit kubeconfig file, or fall back to the default
    /// chain (in-cluster service account, then `~/.kube/config`).
    pub async fn connect(kubeconfig: Option<&Path>) -> Result<Self> {
        let client = match kubeconfig {
            Some(path) => {
                info!("Loading cluster credentials from {}", path.display());
                let kubeconfig = Kubeconfig::read_from(path)?;
                let config =
                    Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                        .await?;
                Client::try_from(config)?
            }
            None => Client::try_default().await?,
        };

        Ok(Self { client })
    }

    /// Take one immutable snapshot of everything the evaluator needs.
    pub async fn snapshot(&self) -> Result<ClusterSnapshot> {
        let pods: Api<Pod> = Api::all(self.client.clone());
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let policies: Api<NetworkPolicy> = Api::all(self.client.clone());

        let pods = pods.list(&ListParams::default()).await?;
        let namespaces = namespaces.list(&ListParams::default()).await?;
        let policies = policies.list(&ListParams::default()).await?;

        debug!(
            pods = pods.items.len(),
            namespaces = namespaces.items.len(),
            policies = policies.items.len(),
            "took cluster snapshot",
        );

        Ok(ClusterSnapshot::new(
            pods.items,
            namespaces.items,
            policies.items,
        ))
    }

    /// All nodes in the cluster.
    pub async fn nodes(&self) -> Result<Vec<Node>> {
        let nodes: Api<Node> = Api::all(self.client.clone());
        Ok(nodes.list(&ListParams::default()).await?.items)
    }

    /// One node by name.
    pub async fn node(&self, name: &str) -> Result<Node> {
        let nodes: Api<Node> = Api::all(self.client.clone());
        Ok(nodes.get(name).await?)
    }

    /// All pods, across every namespace.
    pub async fn pods(&self) -> Result<Vec<Pod>> {
        let pods: Api<Pod> = Api::all(self.client.clone());
        Ok(pods.list(&ListParams::default()).await?.items)
    }
}
