//! Live inventory from the Kubernetes API

use super::InventorySource;
use crate::config::{cluster_source, ClusterSource};
use anyhow::{Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Node, Pod};
use kube::api::ListParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config};
use readiness_lib::{NodeRecord, PodRecord};
use tracing::{debug, info};

/// Lists nodes and system-namespace pods from the API server
pub struct ClusterInventory {
    client: Client,
    namespace: String,
}

impl ClusterInventory {
    /// Build a client from an explicit kubeconfig, in-cluster credentials,
    /// or `~/.kube/config`, in that order
    pub async fn connect(
        kubeconfig: Option<&str>,
        context: Option<&str>,
        namespace: &str,
    ) -> Result<Self> {
        let config = match cluster_source(kubeconfig)? {
            ClusterSource::InCluster => {
                info!("Using in-cluster configuration");
                Config::incluster().context("Failed to load in-cluster configuration")?
            }
            ClusterSource::Kubeconfig(path) => {
                info!(path = %path.display(), "Using kubeconfig");
                let kubeconfig = Kubeconfig::read_from(&path)
                    .with_context(|| format!("Failed to read kubeconfig {}", path.display()))?;
                let options = KubeConfigOptions {
                    context: context.map(str::to_string),
                    ..Default::default()
                };
                Config::from_custom_kubeconfig(kubeconfig, &options)
                    .await
                    .context("Failed to build client configuration from kubeconfig")?
            }
        };

        let client = Client::try_from(config).context("Failed to create Kubernetes client")?;

        Ok(Self {
            client,
            namespace: namespace.to_string(),
        })
    }
}

#[async_trait]
impl InventorySource for ClusterInventory {
    async fn nodes(&self) -> Result<Vec<NodeRecord>> {
        let api: Api<Node> = Api::all(self.client.clone());
        let nodes = api
            .list(&ListParams::default())
            .await
            .context("Failed to list nodes")?;

        debug!(count = nodes.items.len(), "Listed nodes");
        Ok(nodes.items.into_iter().map(node_record).collect())
    }

    async fn pods(&self) -> Result<Vec<PodRecord>> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), &self.namespace);
        let pods = api
            .list(&ListParams::default())
            .await
            .with_context(|| format!("Failed to list pods in namespace {}", self.namespace))?;

        debug!(namespace = %self.namespace, count = pods.items.len(), "Listed pods");
        Ok(pods.items.into_iter().map(pod_record).collect())
    }
}

fn node_record(node: Node) -> NodeRecord {
    let kubelet_version = node
        .status
        .and_then(|status| status.node_info)
        .map(|info| info.kubelet_version)
        .unwrap_or_default();
    NodeRecord::new(node.metadata.name.unwrap_or_default(), kubelet_version)
}

fn pod_record(pod: Pod) -> PodRecord {
    let images: Vec<String> = pod
        .spec
        .map(|spec| {
            spec.containers
                .into_iter()
                .filter_map(|container| container.image)
                .collect()
        })
        .unwrap_or_default();
    PodRecord::new(pod.metadata.name.unwrap_or_default(), images)
}
