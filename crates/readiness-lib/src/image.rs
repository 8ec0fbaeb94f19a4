//! Container image reference parsing
//!
//! Registries are inconsistent about tagging: semver tags, digest pins,
//! build suffixes and underscore-separated legacy names all show up in a
//! real `kube-system` namespace. The parser never rejects a reference; it
//! degrades to [`ComponentIdentity::Unknown`] or to a missing version.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

static TAG_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v?([0-9]+\.[0-9]+(?:\.[0-9]+)?)").unwrap());

/// Control-plane component a compatibility policy applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentIdentity {
    KubeProxy,
    #[serde(rename = "coredns")]
    CoreDns,
    MetricsServer,
    Etcd,
    Kubelet,
    /// Image did not match any known component
    Unknown,
}

impl ComponentIdentity {
    /// Addons recognized in image references, in match priority order
    pub const ADDONS: [ComponentIdentity; 4] = [
        ComponentIdentity::KubeProxy,
        ComponentIdentity::CoreDns,
        ComponentIdentity::MetricsServer,
        ComponentIdentity::Etcd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentIdentity::KubeProxy => "kube-proxy",
            ComponentIdentity::CoreDns => "coredns",
            ComponentIdentity::MetricsServer => "metrics-server",
            ComponentIdentity::Etcd => "etcd",
            ComponentIdentity::Kubelet => "kubelet",
            ComponentIdentity::Unknown => "unknown",
        }
    }

    /// Look up a component by its canonical name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "kube-proxy" => Some(ComponentIdentity::KubeProxy),
            "coredns" => Some(ComponentIdentity::CoreDns),
            "metrics-server" => Some(ComponentIdentity::MetricsServer),
            "etcd" => Some(ComponentIdentity::Etcd),
            "kubelet" => Some(ComponentIdentity::Kubelet),
            _ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        *self != ComponentIdentity::Unknown
    }
}

// Components sort alphabetically by name so reports group them that way.
impl Ord for ComponentIdentity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for ComponentIdentity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ComponentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of parsing one image reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedImage {
    pub identity: ComponentIdentity,
    /// Normalized `X.Y.Z` version, if one could be extracted
    pub version: Option<String>,
}

impl ParsedImage {
    fn unknown() -> Self {
        Self {
            identity: ComponentIdentity::Unknown,
            version: None,
        }
    }
}

/// Extract the component identity and version from an image reference
pub fn parse_image_reference(reference: &str) -> ParsedImage {
    let without_digest = match reference.find('@') {
        Some(idx) => &reference[..idx],
        None => reference,
    };

    let (repository, tag) = split_tag(without_digest);
    let basename = repository.rsplit('/').next().unwrap_or(repository);

    let identity = match identify(basename) {
        Some(identity) => identity,
        None => return ParsedImage::unknown(),
    };

    let tag = if tag.is_empty() || !tag.contains('.') {
        underscore_version(basename).unwrap_or_else(|| tag.to_string())
    } else {
        tag.to_string()
    };

    let version = TAG_VERSION_RE
        .captures(&tag)
        .and_then(|caps| caps.get(1))
        .map(|m| pad_patch(m.as_str()));

    ParsedImage { identity, version }
}

/// Splits `repo:tag` at the last colon. A colon followed by a path
/// separator belongs to a registry port, not a tag.
fn split_tag(reference: &str) -> (&str, &str) {
    match reference.rfind(':') {
        Some(idx) if !reference[idx + 1..].contains('/') => {
            (&reference[..idx], &reference[idx + 1..])
        }
        _ => (reference, ""),
    }
}

fn identify(basename: &str) -> Option<ComponentIdentity> {
    let lower = basename.to_lowercase();
    ComponentIdentity::ADDONS
        .into_iter()
        .find(|identity| lower.contains(identity.as_str()))
}

/// Legacy names such as `kube-proxy_1_25_16` carry the version in the
/// basename as a trailing run of numeric `_` segments.
///
/// The run may open with a `v` segment (`etcd_v3_5_9`). A run that starts
/// inside an alphanumeric segment like `rc1` is ambiguous and yields nothing,
/// as does a run of fewer than two segments.
fn underscore_version(basename: &str) -> Option<String> {
    let is_numeric = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    let mut segments: Vec<&str> = basename.split('_').collect();
    let mut run = Vec::new();
    while let Some(segment) = segments.pop() {
        if is_numeric(segment) {
            run.push(segment);
            continue;
        }
        match segment.strip_prefix('v') {
            Some(digits) if is_numeric(digits) => run.push(digits),
            _ => segments.push(segment),
        }
        break;
    }

    let clean_boundary = segments
        .last()
        .is_some_and(|s| !s.ends_with(|c: char| c.is_ascii_digit()));
    if !clean_boundary || run.len() < 2 {
        return None;
    }
    run.reverse();
    Some(run.join("."))
}

/// `1.31` becomes `1.31.0`; three-segment versions are returned as-is.
pub(crate) fn pad_patch(version: &str) -> String {
    if version.matches('.').count() == 1 {
        format!("{}.0", version)
    } else {
        version.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(identity: ComponentIdentity, version: &str) -> ParsedImage {
        ParsedImage {
            identity,
            version: Some(version.to_string()),
        }
    }

    #[test]
    fn test_semver_tags() {
        assert_eq!(
            parse_image_reference("registry.k8s.io/etcd:3.5.9-0"),
            parsed(ComponentIdentity::Etcd, "3.5.9")
        );
        assert_eq!(
            parse_image_reference("registry.k8s.io/coredns/coredns:v1.11.1"),
            parsed(ComponentIdentity::CoreDns, "1.11.1")
        );
        assert_eq!(
            parse_image_reference("registry/metrics-server:0.6.3"),
            parsed(ComponentIdentity::MetricsServer, "0.6.3")
        );
        assert_eq!(
            parse_image_reference("602401143452.dkr.ecr.us-west-2.amazonaws.com/eks/kube-proxy:v1.29.0-minimal-eksbuild.3"),
            parsed(ComponentIdentity::KubeProxy, "1.29.0")
        );
    }

    #[test]
    fn test_two_segment_tag_is_padded() {
        assert_eq!(
            parse_image_reference("mirror.local/EKS-CoreDNS:v1.10"),
            parsed(ComponentIdentity::CoreDns, "1.10.0")
        );
    }

    #[test]
    fn test_digest_is_stripped() {
        assert_eq!(
            parse_image_reference("registry.k8s.io/metrics-server/metrics-server:v0.7.0@sha256:abc123"),
            parsed(ComponentIdentity::MetricsServer, "0.7.0")
        );

        let digest_only = parse_image_reference("registry.k8s.io/kube-proxy@sha256:deadbeef");
        assert_eq!(digest_only.identity, ComponentIdentity::KubeProxy);
        assert_eq!(digest_only.version, None);
    }

    #[test]
    fn test_underscore_fallback() {
        assert_eq!(
            parse_image_reference("gcr.io/google_containers/kube-proxy_1_25_16"),
            parsed(ComponentIdentity::KubeProxy, "1.25.16")
        );
        assert_eq!(
            parse_image_reference("legacy/etcd_3_5:latest"),
            parsed(ComponentIdentity::Etcd, "3.5.0")
        );
        assert_eq!(
            parse_image_reference("registry/etcd_v3_5_9"),
            parsed(ComponentIdentity::Etcd, "3.5.9")
        );
        assert_eq!(
            parse_image_reference("mirror/amd64_etcd_3_5_12"),
            parsed(ComponentIdentity::Etcd, "3.5.12")
        );
    }

    #[test]
    fn test_underscore_fallback_without_clean_version() {
        for reference in [
            "registry/etcd_latest",
            "registry/etcd_3",
            "registry/etcd_rc1_5_9",
            "registry/etcd_1_v2_3",
            "registry/etcd3_5_9",
            "registry/kube-proxy_build_7",
        ] {
            let image = parse_image_reference(reference);
            assert_ne!(image.identity, ComponentIdentity::Unknown, "{reference}");
            assert_eq!(image.version, None, "{reference}");
        }
    }

    #[test]
    fn test_registry_port_is_not_a_tag() {
        let image = parse_image_reference("registry.local:5000/etcd");
        assert_eq!(image.identity, ComponentIdentity::Etcd);
        assert_eq!(image.version, None);

        assert_eq!(
            parse_image_reference("registry.local:5000/etcd:3.5.12-0"),
            parsed(ComponentIdentity::Etcd, "3.5.12")
        );
    }

    #[test]
    fn test_known_component_without_version() {
        let image = parse_image_reference("registry.k8s.io/coredns/coredns:latest");
        assert_eq!(image.identity, ComponentIdentity::CoreDns);
        assert_eq!(image.version, None);
    }

    #[test]
    fn test_unknown_component() {
        assert_eq!(
            parse_image_reference("myregistry/custom-app:2.0.0"),
            ParsedImage::unknown()
        );
        assert_eq!(parse_image_reference(""), ParsedImage::unknown());
    }

    #[test]
    fn test_substring_match_is_loose() {
        let image = parse_image_reference("quay.io/acme/mirrored-kube-proxy-amd64:v1.30.2");
        assert_eq!(image, parsed(ComponentIdentity::KubeProxy, "1.30.2"));
    }

    #[test]
    fn test_component_ordering_is_alphabetical() {
        let mut ids = ComponentIdentity::ADDONS.to_vec();
        ids.sort();
        let names: Vec<_> = ids.iter().map(|c| c.as_str()).collect();
        assert_eq!(names, ["coredns", "etcd", "kube-proxy", "metrics-server"]);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(ComponentIdentity::from_name("coredns"), Some(ComponentIdentity::CoreDns));
        assert_eq!(ComponentIdentity::from_name("CoreDNS"), None);
        assert!(!ComponentIdentity::Unknown.is_known());
    }
}
