//! Addon compatibility matrix
//!
//! The matrix maps a target minor version (`v1.31`) to the exact addon
//! versions that have been tested against it. Compliance is membership in
//! that curated set, not a semantic range check.

use crate::error::MatrixError;
use crate::image::{pad_patch, ComponentIdentity};
use crate::version::{SemanticVersion, TargetVersion};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

/// Matrix bundled with the library
const BUILTIN_MATRIX: &str = include_str!("../../data/compat-matrix.json");

static MATRIX_KEY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^v[0-9]+\.[0-9]+$").unwrap());

/// On-disk shape: key -> component name -> admissible versions
type RawMatrix = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Admissible addon versions keyed by target minor version
///
/// Immutable once loaded; share it by reference or `Arc` across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompatibilityMatrix {
    slices: BTreeMap<String, MatrixSlice>,
}

/// One row of the matrix: admissible versions per addon for a single target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixSlice {
    key: String,
    components: BTreeMap<ComponentIdentity, BTreeSet<String>>,
}

impl CompatibilityMatrix {
    /// Load the matrix bundled with this crate
    pub fn builtin() -> Result<Self, MatrixError> {
        Self::from_json(BUILTIN_MATRIX)
    }

    /// Load a matrix document from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, MatrixError> {
        let content = std::fs::read_to_string(path).map_err(|source| MatrixError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let matrix = Self::from_json(&content)?;
        debug!(path = %path.display(), targets = matrix.len(), "Loaded compatibility matrix");
        Ok(matrix)
    }

    /// Parse and validate a matrix document
    pub fn from_json(content: &str) -> Result<Self, MatrixError> {
        let raw: RawMatrix = serde_json::from_str(content)?;
        let mut slices = BTreeMap::new();

        for (key, components) in raw {
            if !MATRIX_KEY_RE.is_match(&key) {
                return Err(MatrixError::InvalidKey { key });
            }

            let mut slice = MatrixSlice {
                key: key.clone(),
                components: BTreeMap::new(),
            };
            for (name, versions) in components {
                let component = ComponentIdentity::from_name(&name).ok_or_else(|| {
                    MatrixError::UnknownComponent {
                        key: key.clone(),
                        component: name.clone(),
                    }
                })?;
                let mut admissible = BTreeSet::new();
                for version in versions {
                    if !is_canonical(&version) {
                        return Err(MatrixError::InvalidVersion {
                            key: key.clone(),
                            component: name.clone(),
                            version,
                        });
                    }
                    admissible.insert(version);
                }
                slice.components.insert(component, admissible);
            }
            slices.insert(key, slice);
        }

        Ok(Self { slices })
    }

    /// Row for the target's minor version, if the matrix has one
    pub fn slice_for(&self, target: &TargetVersion) -> Option<&MatrixSlice> {
        self.slices.get(&target.matrix_key())
    }

    /// Target keys with policy data, in ascending string order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slices.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

impl MatrixSlice {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether this row has an opinion about the component
    pub fn tracks(&self, component: ComponentIdentity) -> bool {
        self.components.contains_key(&component)
    }

    pub fn admissible(&self, component: ComponentIdentity) -> Option<&BTreeSet<String>> {
        self.components.get(&component)
    }

    /// Exact-membership check after dropping any `-N` build suffix.
    ///
    /// Returns `None` when the component is untracked for this target.
    pub fn is_compliant(&self, component: ComponentIdentity, observed: &str) -> Option<bool> {
        self.admissible(component)
            .map(|admissible| admissible.contains(&strip_build_suffix(observed)))
    }
}

/// `3.5.9-0` becomes `3.5.9`, `1.11` becomes `1.11.0`
pub fn strip_build_suffix(observed: &str) -> String {
    let base = observed.split('-').next().unwrap_or(observed);
    pad_patch(base)
}

fn is_canonical(version: &str) -> bool {
    SemanticVersion::parse_strict(version)
        .map(|parsed| parsed.to_string() == version)
        .unwrap_or(false)
}
