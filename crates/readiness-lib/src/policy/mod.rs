//! Compatibility policies
//!
//! This module provides the two independent rules a readiness run applies:
//! - Kubelet version skew (a node may lag the target by a fixed number of minors)
//! - Addon compatibility matrix (curated admissible versions per target minor)

mod matrix;
mod skew;

pub use matrix::{strip_build_suffix, CompatibilityMatrix, MatrixSlice};
pub use skew::{SkewPolicy, DEFAULT_MAX_MINOR_SKEW};
