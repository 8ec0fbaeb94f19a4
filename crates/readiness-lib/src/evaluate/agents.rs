//! Kubelet skew pass

use crate::models::{NodeRecord, VersionGroup};
use crate::policy::SkewPolicy;
use crate::version::{SemanticVersion, TargetVersion};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

/// A node left out of grouping because its version could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SkippedNode {
    pub name: String,
    pub kubelet_version: String,
    pub reason: String,
}

/// Kubelet versions grouped by literal string, sorted by that string
#[derive(Debug, Clone, Default, Serialize)]
pub struct AgentReport {
    pub groups: Vec<VersionGroup>,
    pub skipped: Vec<SkippedNode>,
}

impl AgentReport {
    pub fn compliant(&self) -> impl Iterator<Item = &VersionGroup> {
        self.groups.iter().filter(|g| g.compliant)
    }

    pub fn non_compliant(&self) -> impl Iterator<Item = &VersionGroup> {
        self.groups.iter().filter(|g| !g.compliant)
    }

    pub fn node_count(&self) -> usize {
        self.groups.iter().map(VersionGroup::member_count).sum()
    }
}

pub(crate) fn evaluate_agents(
    target: &TargetVersion,
    policy: &SkewPolicy,
    nodes: &[NodeRecord],
) -> AgentReport {
    let mut groups: BTreeMap<&str, VersionGroup> = BTreeMap::new();
    let mut skipped = Vec::new();

    for node in nodes {
        let raw = node.kubelet_version.as_str();
        let observed = match SemanticVersion::parse_tolerant(raw) {
            Ok(version) => version,
            Err(e) => {
                warn!(
                    node = %node.name,
                    version = %raw,
                    error = %e,
                    "Unable to parse kubelet version"
                );
                skipped.push(SkippedNode {
                    name: node.name.clone(),
                    kubelet_version: raw.to_string(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        groups
            .entry(raw)
            .or_insert_with(|| {
                VersionGroup::new(raw, policy.is_compliant(target.version(), observed))
            })
            .members
            .insert(node.name.clone());
    }

    skipped.sort();

    AgentReport {
        groups: groups.into_values().collect(),
        skipped,
    }
}
