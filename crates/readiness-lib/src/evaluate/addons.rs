//! Addon compatibility pass

use crate::image::{parse_image_reference, ComponentIdentity};
use crate::models::PodRecord;
use crate::policy::CompatibilityMatrix;
use crate::version::TargetVersion;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Pods running one version of one addon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddonGroup {
    pub identity: ComponentIdentity,
    pub version: String,
    pub compliant: bool,
    /// Admissible versions, present only for non-compliant groups
    pub expected: Option<Vec<String>>,
    pub members: BTreeSet<String>,
}

impl AddonGroup {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

impl Serialize for AddonGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = if self.expected.is_some() { 6 } else { 5 };
        let mut state = serializer.serialize_struct("AddonGroup", fields)?;
        state.serialize_field("identity", &self.identity)?;
        state.serialize_field("version", &self.version)?;
        state.serialize_field("compliant", &self.compliant)?;
        if let Some(expected) = &self.expected {
            state.serialize_field("expected", expected)?;
        }
        state.serialize_field("member_count", &self.member_count())?;
        state.serialize_field("members", &self.members)?;
        state.end()
    }
}

/// Outcome of the addon pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AddonReport {
    /// The matrix has no row for the target's minor version
    NoPolicyData { matrix_key: String },
    /// Groups sorted by component name, then by version string
    Evaluated {
        matrix_key: String,
        groups: Vec<AddonGroup>,
    },
}

impl AddonReport {
    pub fn matrix_key(&self) -> &str {
        match self {
            AddonReport::NoPolicyData { matrix_key } => matrix_key,
            AddonReport::Evaluated { matrix_key, .. } => matrix_key,
        }
    }

    pub fn groups(&self) -> &[AddonGroup] {
        match self {
            AddonReport::NoPolicyData { .. } => &[],
            AddonReport::Evaluated { groups, .. } => groups,
        }
    }

    pub fn non_compliant(&self) -> impl Iterator<Item = &AddonGroup> {
        self.groups().iter().filter(|g| !g.compliant)
    }
}

pub(crate) fn evaluate_addons(
    target: &TargetVersion,
    matrix: &CompatibilityMatrix,
    pods: &[PodRecord],
) -> AddonReport {
    let matrix_key = target.matrix_key();
    let Some(slice) = matrix.slice_for(target) else {
        debug!(matrix_key = %matrix_key, "No compatibility data for target");
        return AddonReport::NoPolicyData { matrix_key };
    };

    let mut grouped: BTreeMap<(ComponentIdentity, String), BTreeSet<String>> = BTreeMap::new();

    for pod in pods {
        for image in &pod.images {
            let parsed = parse_image_reference(image);
            if !parsed.identity.is_known() {
                continue;
            }
            let Some(version) = parsed.version else {
                debug!(pod = %pod.name, image = %image, "Known addon without a version tag");
                continue;
            };
            if !slice.tracks(parsed.identity) {
                debug!(pod = %pod.name, addon = %parsed.identity, "Addon untracked for target");
                continue;
            }
            grouped
                .entry((parsed.identity, version))
                .or_default()
                .insert(pod.name.clone());
        }
    }

    let groups = grouped
        .into_iter()
        .map(|((identity, version), members)| {
            let compliant = slice.is_compliant(identity, &version).unwrap_or(false);
            let expected = (!compliant)
                .then(|| slice.admissible(identity))
                .flatten()
                .map(|set| set.iter().cloned().collect());
            AddonGroup {
                identity,
                version,
                compliant,
                expected,
                members,
            }
        })
        .collect();

    AddonReport::Evaluated { matrix_key, groups }
}
