//! Readiness evaluation
//!
//! Runs two independent passes over already-fetched inventories:
//! - Agents: kubelet versions grouped by literal string and checked against the skew rule
//! - Addons: system-namespace images grouped by (component, version) and checked
//!   against the target's compatibility matrix row
//!
//! Both passes are pure and produce output independent of inventory order.

mod addons;
mod agents;


pub use addons::{AddonGroup, AddonReport};
pub use agents::{AgentReport, SkippedNode};

use crate::error::ReadinessError;
use crate::models::Inventory;
use crate::policy::{CompatibilityMatrix, SkewPolicy};
use crate::version::TargetVersion;
use serde::Serialize;
use tracing::info;

/// Applies the skew rule and a compatibility matrix to inventories
///
/// The matrix is borrowed, so one loaded matrix can serve any number of
/// evaluations for different targets.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    matrix: &'a CompatibilityMatrix,
    skew: SkewPolicy,
}

/// Combined outcome of one readiness run
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessReport {
    pub target: TargetVersion,
    pub agents: AgentReport,
    pub addons: AddonReport,
}

impl ReadinessReport {
    /// Whether any agent or addon group failed its policy
    pub fn has_violations(&self) -> bool {
        self.agents.non_compliant().next().is_some() || self.addons.non_compliant().next().is_some()
    }
}

impl<'a> Evaluator<'a> {
    pub fn new(matrix: &'a CompatibilityMatrix) -> Self {
        Self {
            matrix,
            skew: SkewPolicy::default(),
        }
    }

    pub fn with_skew_policy(mut self, skew: SkewPolicy) -> Self {
        self.skew = skew;
        self
    }

    /// Strictly parse the target, then evaluate both inventories against it
    pub fn evaluate(
        &self,
        target_raw: &str,
        inventory: &Inventory,
    ) -> Result<ReadinessReport, ReadinessError> {
        let target = TargetVersion::parse(target_raw)?;
        Ok(self.evaluate_target(target, inventory))
    }

    pub fn evaluate_target(&self, target: TargetVersion, inventory: &Inventory) -> ReadinessReport {
        info!(
            target = %target,
            nodes = inventory.nodes.len(),
            pods = inventory.pods.len(),
            "Evaluating upgrade readiness"
        );

        let agents = agents::evaluate_agents(&target, &self.skew, &inventory.nodes);
        let addons = addons::evaluate_addons(&target, self.matrix, &inventory.pods);

        ReadinessReport {
            target,
            agents,
            addons,
        }
    }
}
