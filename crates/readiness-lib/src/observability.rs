//! Logging setup and structured run events
//!
//! Logs go to stderr so that stdout carries only the report. The filter is
//! taken from `RUST_LOG` and defaults to `warn`.

use crate::evaluate::ReadinessReport;
use tracing::info;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "warn";

/// Log line encoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Install the global tracing subscriber
pub fn init_tracing(format: LogFormat) -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    }
}

/// Emit one structured summary event for a finished run
pub fn log_run_summary(report: &ReadinessReport) {
    info!(
        target_version = %report.target,
        matrix_key = %report.addons.matrix_key(),
        agent_groups = report.agents.groups.len(),
        agent_violations = report.agents.non_compliant().count(),
        skipped_nodes = report.agents.skipped.len(),
        addon_groups = report.addons.groups().len(),
        addon_violations = report.addons.non_compliant().count(),
        "Readiness evaluation complete"
    );
}
