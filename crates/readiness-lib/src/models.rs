//! Core data models for readiness evaluation

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeSet;

/// A cluster node as reported by the inventory source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub name: String,
    pub kubelet_version: String,
}

/// A system-namespace pod and the images of its containers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodRecord {
    pub name: String,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Both inventories consumed by one readiness run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub pods: Vec<PodRecord>,
}

impl NodeRecord {
    pub fn new(name: impl Into<String>, kubelet_version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kubelet_version: kubelet_version.into(),
        }
    }
}

impl PodRecord {
    pub fn new<I, S>(name: impl Into<String>, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            images: images.into_iter().map(Into::into).collect(),
        }
    }
}

/// Nodes sharing one literal kubelet version string
///
/// Grouping is by the raw string, so `v1.30.0` and `1.30.0` form two groups.
/// Every member shares the same compliance by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionGroup {
    pub version_key: String,
    pub compliant: bool,
    pub members: BTreeSet<String>,
}

impl VersionGroup {
    pub fn new(version_key: impl Into<String>, compliant: bool) -> Self {
        Self {
            version_key: version_key.into(),
            compliant,
            members: BTreeSet::new(),
        }
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// First `limit` members in sorted order
    pub fn sample(&self, limit: usize) -> impl Iterator<Item = &str> {
        self.members.iter().take(limit).map(String::as_str)
    }
}

impl Serialize for VersionGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("VersionGroup", 4)?;
        state.serialize_field("version_key", &self.version_key)?;
        state.serialize_field("compliant", &self.compliant)?;
        state.serialize_field("member_count", &self.member_count())?;
        state.serialize_field("members", &self.members)?;
        state.end()
    }
}
