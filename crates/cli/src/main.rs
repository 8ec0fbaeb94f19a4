//! kubectl upgrade-readiness
//!
//! A kubectl plugin that checks kubelet version skew and control-plane addon
//! versions against a target Kubernetes release before an upgrade.

mod config;
mod inventory;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use inventory::{ClusterInventory, InventorySource, SnapshotInventory};
use readiness_lib::observability::{self, LogFormat};
use readiness_lib::{CompatibilityMatrix, Evaluator, RenderOptions, TargetVersion};
use std::path::PathBuf;
use tracing::info;

/// Exit status when `--fail-on-noncompliant` finds a violation
const EXIT_NONCOMPLIANT: i32 = 1;

/// Check cluster components against a Kubernetes upgrade target
#[derive(Parser)]
#[command(name = "kubectl-upgrade_readiness")]
#[command(author, version, about = "Kubernetes upgrade readiness checks", long_about = None)]
pub struct Cli {
    /// Target Kubernetes version, e.g. v1.31 or 1.31.2 [default: v1.31]
    #[arg(long)]
    pub target_version: Option<String>,

    /// Show the full list of nodes and pods per version
    #[arg(long, short)]
    pub verbose: bool,

    /// Path to kubeconfig file (uses in-cluster or default config if not specified)
    #[arg(long, env = "KUBECONFIG")]
    pub kubeconfig: Option<String>,

    /// Kubeconfig context to use
    #[arg(long)]
    pub context: Option<String>,

    /// Namespace holding control-plane addons [default: kube-system]
    #[arg(long, short)]
    pub namespace: Option<String>,

    /// Compatibility matrix JSON file replacing the built-in matrix
    #[arg(long)]
    pub matrix: Option<PathBuf>,

    /// Read nodes and pods from a JSON snapshot instead of the cluster
    #[arg(long)]
    pub inventory: Option<PathBuf>,

    /// Output format
    #[arg(long, short, default_value = "text")]
    pub format: output::OutputFormat,

    /// Log line format (logs are written to stderr)
    #[arg(long, default_value = "text")]
    pub log_format: LogFormatArg,

    /// Exit with a non-zero status when any component is non-compliant
    #[arg(long)]
    pub fail_on_noncompliant: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    observability::init_tracing(cli.log_format.into()).context("Failed to initialize logging")?;

    let settings = config::Settings::load()?;

    // A bad target aborts the run before any cluster access
    let target_raw = cli.target_version.unwrap_or(settings.target_version);
    let target = TargetVersion::parse(&target_raw)
        .with_context(|| format!("Invalid target version {:?}", target_raw))?;

    let matrix = match cli.matrix.or(settings.matrix_path) {
        Some(path) => CompatibilityMatrix::from_file(&path)?,
        None => CompatibilityMatrix::builtin()?,
    };

    let namespace = cli.namespace.unwrap_or(settings.namespace);
    let source: Box<dyn InventorySource> = match &cli.inventory {
        Some(path) => Box::new(SnapshotInventory::load(path)?),
        None => Box::new(
            ClusterInventory::connect(cli.kubeconfig.as_deref(), cli.context.as_deref(), &namespace)
                .await?,
        ),
    };

    let inventory = source.fetch().await?;
    info!(namespace = %namespace, "Fetched inventory");

    let report = Evaluator::new(&matrix).evaluate_target(target, &inventory);
    observability::log_run_summary(&report);

    output::print_report(&report, cli.format, RenderOptions::new(cli.verbose))?;

    if cli.fail_on_noncompliant && report.has_violations() {
        std::process::exit(EXIT_NONCOMPLIANT);
    }

    Ok(())
}
