//! Inventory acquisition
//!
//! Node and pod inventories come either from a live cluster or from a JSON
//! snapshot on disk. Both sources hand the evaluator the same records.

mod cluster;
mod snapshot;

pub use cluster::ClusterInventory;
pub use snapshot::SnapshotInventory;

use anyhow::Result;
use async_trait::async_trait;
use readiness_lib::{Inventory, NodeRecord, PodRecord};

/// Source of the node and system-namespace pod inventories
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// All nodes with their reported kubelet version
    async fn nodes(&self) -> Result<Vec<NodeRecord>>;

    /// Pods in the system namespace with their container images
    async fn pods(&self) -> Result<Vec<PodRecord>>;

    /// Fetch both inventories
    async fn fetch(&self) -> Result<Inventory> {
        Ok(Inventory {
            nodes: self.nodes().await?,
            pods: self.pods().await?,
        })
    }
}
