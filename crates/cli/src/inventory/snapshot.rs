//! Offline inventory loaded from a JSON snapshot

use super::InventorySource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use readiness_lib::{Inventory, NodeRecord, PodRecord};
use std::path::Path;
use tracing::debug;

/// Inventory read from a `{"nodes": [...], "pods": [...]}` document
pub struct SnapshotInventory {
    inventory: Inventory,
}

impl SnapshotInventory {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read inventory snapshot {}", path.display()))?;
        let inventory: Inventory = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse inventory snapshot {}", path.display()))?;

        debug!(
            path = %path.display(),
            nodes = inventory.nodes.len(),
            pods = inventory.pods.len(),
            "Loaded inventory snapshot"
        );
        Ok(Self { inventory })
    }
}

#[async_trait]
impl InventorySource for SnapshotInventory {
    async fn nodes(&self) -> Result<Vec<NodeRecord>> {
        Ok(self.inventory.nodes.clone())
    }

    async fn pods(&self) -> Result<Vec<PodRecord>> {
        Ok(self.inventory.pods.clone())
    }
}
