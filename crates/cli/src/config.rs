//! Configuration management for the CLI

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Service account token mounted into every pod
const IN_CLUSTER_TOKEN_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";

/// Persistent defaults, overridden by command-line flags
///
/// Read from `~/.config/upgrade-readiness/config.{json,toml,yaml}` and from
/// `UPGRADE_READINESS_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Target version used when `--target-version` is not given
    #[serde(default = "default_target_version")]
    pub target_version: String,

    /// Namespace holding the control-plane addons
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Compatibility matrix replacing the built-in one
    #[serde(default)]
    pub matrix_path: Option<PathBuf>,
}

fn default_target_version() -> String {
    "v1.31".to_string()
}

fn default_namespace() -> String {
    "kube-system".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_version: default_target_version(),
            namespace: default_namespace(),
            matrix_path: None,
        }
    }
}

impl Settings {
    /// Load settings from the user config file and environment
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_base_path().as_deref())
    }

    /// Load settings with an explicit config file base path (extension optional)
    pub fn load_from(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = config_file {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        builder
            .add_source(config::Environment::with_prefix("UPGRADE_READINESS"))
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    fn config_base_path() -> Option<PathBuf> {
        dirs_next::home_dir().map(|home| {
            home.join(".config")
                .join("upgrade-readiness")
                .join("config")
        })
    }
}

/// Where the Kubernetes client configuration comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterSource {
    Kubeconfig(PathBuf),
    InCluster,
}

/// Resolve the cluster configuration source
///
/// An explicit path (flag or `KUBECONFIG`) wins, then the in-cluster service
/// account, then `~/.kube/config`.
pub fn cluster_source(override_path: Option<&str>) -> Result<ClusterSource> {
    if let Some(path) = override_path.and_then(first_kubeconfig) {
        return Ok(ClusterSource::Kubeconfig(path));
    }

    if Path::new(IN_CLUSTER_TOKEN_PATH).exists() {
        return Ok(ClusterSource::InCluster);
    }

    let home = dirs_next::home_dir().context("Could not determine home directory")?;
    Ok(ClusterSource::Kubeconfig(home.join(".kube").join("config")))
}

/// `KUBECONFIG` may list several files; the first one is used.
fn first_kubeconfig(value: &str) -> Option<PathBuf> {
    std::env::split_paths(value).find(|p| !p.as_os_str().is_empty())
}
