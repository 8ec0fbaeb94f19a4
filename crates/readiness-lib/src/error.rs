//! Error types for the evaluation engine

use std::path::PathBuf;
use thiserror::Error;

/// A version string could not be normalized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("malformed version {input:?}: {reason}")]
    Malformed { input: String, reason: String },
}

impl VersionError {
    pub(crate) fn malformed(input: &str, reason: impl Into<String>) -> Self {
        VersionError::Malformed {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// A compatibility matrix document could not be loaded
#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("failed to read compatibility matrix {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid compatibility matrix document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid matrix key {key:?}: expected the form v<major>.<minor>")]
    InvalidKey { key: String },

    #[error("unknown component {component:?} under matrix key {key}")]
    UnknownComponent { key: String, component: String },

    #[error("admissible version {version:?} for {component} under {key} is not of the form X.Y.Z")]
    InvalidVersion {
        key: String,
        component: String,
        version: String,
    },
}

/// Errors that abort a whole readiness run
#[derive(Debug, Error)]
pub enum ReadinessError {
    #[error("invalid target version: {0}")]
    TargetVersion(#[from] VersionError),

    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display() {
        let err = VersionError::malformed("v1", "expected at least major.minor");
        assert_eq!(
            err.to_string(),
            "malformed version \"v1\": expected at least major.minor"
        );
    }

    #[test]
    fn test_readiness_error_wraps_target() {
        let err: ReadinessError = VersionError::malformed("x", "no digits").into();
        assert!(err.to_string().starts_with("invalid target version:"));
    }
}
