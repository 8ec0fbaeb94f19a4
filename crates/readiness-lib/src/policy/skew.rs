//! Kubelet version skew rule

use crate::version::SemanticVersion;

/// Kubelets may lag the control plane by at most this many minor releases
pub const DEFAULT_MAX_MINOR_SKEW: u64 = 4;

/// Numeric skew tolerance for node agents
///
/// An agent is compliant when it shares the target's major version and its
/// minor version is between `target.minor - max_minor_skew` and
/// `target.minor` inclusive. Agents ahead of the target are never compliant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkewPolicy {
    pub max_minor_skew: u64,
}

impl SkewPolicy {
    pub fn new(max_minor_skew: u64) -> Self {
        Self { max_minor_skew }
    }

    pub fn is_compliant(&self, target: SemanticVersion, observed: SemanticVersion) -> bool {
        if observed.major != target.major {
            return false;
        }
        match target.minor.checked_sub(observed.minor) {
            Some(delta) => delta <= self.max_minor_skew,
            None => false,
        }
    }
}

impl Default for SkewPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MINOR_SKEW)
    }
}
