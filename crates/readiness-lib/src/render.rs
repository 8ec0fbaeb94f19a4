//! Plain-text report rendering
//!
//! Output depends only on the report contents, which are already sorted, so
//! identical inventories always render byte-identical text.

use crate::evaluate::{AddonReport, AgentReport, ReadinessReport};
use crate::models::VersionGroup;
use crate::version::TargetVersion;
use std::fmt::{self, Write};

/// Members shown per non-compliant group when not verbose
pub const DEFAULT_SAMPLE_SIZE: usize = 3;

/// Controls how much of each group is listed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// List every member instead of a sample
    pub verbose: bool,
    pub sample_size: usize,
}

impl RenderOptions {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Adapts a `write_*` function into a [`fmt::Display`] value
struct Rendered<F>(F);

fn rendered<F>(write: F) -> Rendered<F>
where
    F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result,
{
    Rendered(write)
}

impl<F> fmt::Display for Rendered<F>
where
    F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (self.0)(f)
    }
}

/// Render both passes, agents first
pub fn render_report(report: &ReadinessReport, options: RenderOptions) -> String {
    rendered(|f| write_report(f, report, options)).to_string()
}

pub fn render_agent_report(
    target: &TargetVersion,
    report: &AgentReport,
    options: RenderOptions,
) -> String {
    rendered(|f| write_agent_report(f, target, report, options)).to_string()
}

pub fn render_addon_report(report: &AddonReport, options: RenderOptions) -> String {
    rendered(|f| write_addon_report(f, report, options)).to_string()
}

/// Write both passes into `out`, agents first
pub fn write_report(
    out: &mut impl Write,
    report: &ReadinessReport,
    options: RenderOptions,
) -> fmt::Result {
    write_agent_report(out, &report.target, &report.agents, options)?;
    write_addon_report(out, &report.addons, options)
}

pub fn write_agent_report(
    out: &mut impl Write,
    target: &TargetVersion,
    report: &AgentReport,
    options: RenderOptions,
) -> fmt::Result {
    writeln!(out, "\nKubelet Version Skew Check (target: {}):\n", target)?;

    if !report.skipped.is_empty() {
        for node in &report.skipped {
            writeln!(out, "  [!] Unable to parse version for {}: {}", node.name, node.reason)?;
        }
        writeln!(out)?;
    }

    if report.groups.is_empty() {
        writeln!(out, "No nodes with a parseable kubelet version found.")?;
        return Ok(());
    }

    let mut non_compliant = report.non_compliant().peekable();
    if non_compliant.peek().is_some() {
        writeln!(out, "❌ Non-compliant versions:")?;
        for group in non_compliant {
            writeln!(out, "  - {} ({} nodes)", group.version_key, group.member_count())?;
            write_members(out, group, options)?;
        }
        writeln!(out)?;
    } else {
        writeln!(out, "✅ All nodes are compliant with kubelet skew policy.")?;
    }

    let mut compliant = report.compliant().peekable();
    if compliant.peek().is_some() {
        writeln!(out, "✅ Compliant versions:")?;
        for group in compliant {
            writeln!(out, "  - {} ({} nodes)", group.version_key, group.member_count())?;
            if options.verbose {
                for name in &group.members {
                    writeln!(out, "    • {}", name)?;
                }
            }
        }
        writeln!(out)?;
    }

    Ok(())
}

fn write_members(
    out: &mut impl Write,
    group: &VersionGroup,
    options: RenderOptions,
) -> fmt::Result {
    if options.verbose {
        for name in &group.members {
            writeln!(out, "    • {}", name)?;
        }
        return Ok(());
    }

    writeln!(out, "    Examples:")?;
    for name in group.sample(options.sample_size) {
        writeln!(out, "      • {}", name)?;
    }
    if group.member_count() > options.sample_size {
        writeln!(out, "    ... (use --verbose to see full list)")?;
    }
    Ok(())
}

pub fn write_addon_report(
    out: &mut impl Write,
    report: &AddonReport,
    options: RenderOptions,
) -> fmt::Result {
    let groups = match report {
        AddonReport::NoPolicyData { matrix_key } => {
            return writeln!(out, "\n[!] No compatibility data for {}", matrix_key);
        }
        AddonReport::Evaluated { groups, .. } => groups,
    };

    if groups.is_empty() {
        return writeln!(out, "\nControl Plane Addon Compatibility: <none found>");
    }

    writeln!(out, "\nControl Plane Addon Compatibility:")?;
    for group in groups {
        let icon = if group.compliant { "✅" } else { "❌" };
        write!(
            out,
            "  {} {}: {} ({} pods",
            icon,
            group.identity,
            group.version,
            group.member_count()
        )?;
        if let Some(expected) = &group.expected {
            write!(out, ", expected: {}", expected.join(", "))?;
        }
        writeln!(out, ")")?;

        if options.verbose {
            for name in &group.members {
                writeln!(out, "    • {}", name)?;
            }
        }
    }
    Ok(())
}
