//! Version normalization
//!
//! Free-form version strings (`v1.31`, `1.27.5`, `v1.28.3-eks-1a2b3c`) are
//! normalized into a three-part [`SemanticVersion`]. Two entry points exist:
//! [`SemanticVersion::parse_strict`] rejects anything after the numeric
//! segments and is used for the upgrade target, while
//! [`SemanticVersion::parse_tolerant`] drops pre-release and build suffixes
//! and is used for values read from the cluster inventory.

use crate::error::VersionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical `major.minor.patch` version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SemanticVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version, failing if anything follows the numeric segments
    pub fn parse_strict(raw: &str) -> Result<Self, VersionError> {
        let scanned = scan(raw)?;
        if !scanned.rest.is_empty() {
            return Err(VersionError::malformed(
                raw,
                format!("unexpected trailing content {:?}", scanned.rest),
            ));
        }
        Ok(scanned.version)
    }

    /// Parse a version, ignoring a pre-release or build suffix once all
    /// three numeric segments are present
    pub fn parse_tolerant(raw: &str) -> Result<Self, VersionError> {
        let scanned = scan(raw)?;
        if scanned.rest.starts_with('.') {
            return Err(VersionError::malformed(raw, "more than three numeric segments"));
        }
        if scanned.segments < 3 && !scanned.rest.is_empty() {
            return Err(VersionError::malformed(
                raw,
                format!("suffix {:?} before the patch segment", scanned.rest),
            ));
        }
        Ok(scanned.version)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SemanticVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_strict(s)
    }
}

struct Scanned<'a> {
    version: SemanticVersion,
    /// Numeric segments read, 2 or 3
    segments: usize,
    /// Text following the last numeric segment
    rest: &'a str,
}

/// Reads up to three dot-separated numeric segments after an optional `v`.
/// Patch defaults to 0 when only two are present.
fn scan(raw: &str) -> Result<Scanned<'_>, VersionError> {
    let trimmed = raw.trim();
    let mut rest = trimmed.strip_prefix('v').unwrap_or(trimmed);
    let mut segments = [0u64; 3];
    let mut count = 0;

    loop {
        let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        if digits == 0 {
            let reason = match count {
                0 => "missing numeric major version".to_string(),
                n => format!("segment {} is not numeric", n + 1),
            };
            return Err(VersionError::malformed(raw, reason));
        }

        segments[count] = rest[..digits]
            .parse()
            .map_err(|_| VersionError::malformed(raw, "numeric segment out of range"))?;
        rest = &rest[digits..];
        count += 1;

        if count == segments.len() {
            break;
        }
        match rest.strip_prefix('.') {
            Some(next) => rest = next,
            None => break,
        }
    }

    if count < 2 {
        return Err(VersionError::malformed(raw, "expected at least major.minor"));
    }

    Ok(Scanned {
        version: SemanticVersion::new(segments[0], segments[1], segments[2]),
        segments: count,
        rest,
    })
}

/// The upgrade destination for a readiness run
///
/// Built once from the user-supplied string with strict parsing; the raw
/// string is kept for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetVersion {
    raw: String,
    version: SemanticVersion,
}

impl TargetVersion {
    pub fn parse(raw: &str) -> Result<Self, VersionError> {
        let version = SemanticVersion::parse_strict(raw)?;
        Ok(Self {
            raw: raw.trim().to_string(),
            version,
        })
    }

    /// The string the target was given as
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn version(&self) -> SemanticVersion {
        self.version
    }

    /// Row key into the compatibility matrix, e.g. `v1.31`
    pub fn matrix_key(&self) -> String {
        format!("v{}.{}", self.version.major, self.version.minor)
    }
}

impl fmt::Display for TargetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
