//! Compatibility evaluation engine for Kubernetes upgrade readiness
//!
//! This crate provides the core functionality for:
//! - Version normalization (strict and tolerant parsing)
//! - Container image reference parsing
//! - Kubelet skew and addon compatibility matrix policies
//! - Grouping inventory records and rendering deterministic reports

pub mod error;
pub mod evaluate;
pub mod image;
pub mod models;
pub mod observability;
pub mod policy;
pub mod render;
pub mod version;

pub use error::{MatrixError, ReadinessError, VersionError};
pub use evaluate::{AddonGroup, AddonReport, AgentReport, Evaluator, ReadinessReport, SkippedNode};
pub use image::{parse_image_reference, ComponentIdentity, ParsedImage};
pub use models::{Inventory, NodeRecord, PodRecord, VersionGroup};
pub use policy::{CompatibilityMatrix, MatrixSlice, SkewPolicy};
pub use render::RenderOptions;
pub use version::{SemanticVersion, TargetVersion};
