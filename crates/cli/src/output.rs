//! Output formatting utilities

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use colored::Colorize;
use readiness_lib::evaluate::{AddonReport, AgentReport};
use readiness_lib::render::render_report;
use readiness_lib::{ReadinessReport, RenderOptions};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for the readiness report
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain-text report (default)
    #[default]
    Text,
    /// Tables per check
    Table,
    /// JSON document
    Json,
}

/// Row for the kubelet skew table
#[derive(Tabled)]
struct AgentRow {
    #[tabled(rename = "Kubelet Version")]
    version: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Nodes")]
    count: usize,
    #[tabled(rename = "Members")]
    members: String,
}

/// Row for the addon compatibility table
#[derive(Tabled)]
struct AddonRow {
    #[tabled(rename = "Addon")]
    addon: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Pods")]
    count: usize,
    #[tabled(rename = "Expected")]
    expected: String,
}

/// JSON document wrapping a report with its generation time
#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    report: &'a ReadinessReport,
}

/// Print a readiness report in the requested format
pub fn print_report(
    report: &ReadinessReport,
    format: OutputFormat,
    options: RenderOptions,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let document = JsonReport {
                generated_at: Utc::now(),
                report,
            };
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        OutputFormat::Text => {
            print_banner(report);
            print!("{}", render_report(report, options));
            print_verdict(report);
        }
        OutputFormat::Table => {
            print_banner(report);
            print_agent_table(&report.agents, options);
            print_addon_table(&report.addons);
            print_verdict(report);
        }
    }
    Ok(())
}

fn print_banner(report: &ReadinessReport) {
    println!(
        "{} (target: {})",
        "kubectl-upgrade-readiness".bold(),
        report.target.raw().cyan()
    );
}

fn print_agent_table(report: &AgentReport, options: RenderOptions) {
    println!();
    println!("{}", "Kubelet Version Skew".bold());

    for node in &report.skipped {
        print_warning(&format!(
            "Unable to parse version for {}: {}",
            node.name, node.reason
        ));
    }

    if report.groups.is_empty() {
        println!("{}", "No nodes found".yellow());
        return;
    }

    // Non-compliant groups first, each half already sorted by version
    let rows: Vec<AgentRow> = report
        .non_compliant()
        .chain(report.compliant())
        .map(|group| {
            let members: Vec<&str> = if options.verbose {
                group.members.iter().map(String::as_str).collect()
            } else {
                group.sample(options.sample_size).collect()
            };
            let mut members = members.join(", ");
            if !options.verbose && group.member_count() > options.sample_size {
                members.push_str(", ...");
            }
            AgentRow {
                version: group.version_key.clone(),
                status: color_compliance(group.compliant),
                count: group.member_count(),
                members,
            }
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

fn print_addon_table(report: &AddonReport) {
    println!();
    println!("{}", "Control Plane Addon Compatibility".bold());

    if let AddonReport::NoPolicyData { matrix_key } = report {
        print_warning(&format!("No compatibility data for {}", matrix_key));
        return;
    }
    if report.groups().is_empty() {
        println!("{}", "No tracked addons found".yellow());
        return;
    }

    let rows: Vec<AddonRow> = report
        .groups()
        .iter()
        .map(|group| AddonRow {
            addon: group.identity.to_string(),
            version: group.version.clone(),
            status: color_compliance(group.compliant),
            count: group.member_count(),
            expected: group
                .expected
                .as_ref()
                .map(|expected| expected.join(", "))
                .unwrap_or_default(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

fn print_verdict(report: &ReadinessReport) {
    println!();
    if report.has_violations() {
        print_warning(&format!(
            "Some components are not ready for {}",
            report.target.raw()
        ));
    } else {
        print_success(&format!(
            "All evaluated components are ready for {}",
            report.target.raw()
        ));
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Color a compliance flag
pub fn color_compliance(compliant: bool) -> String {
    if compliant {
        "compliant".green().to_string()
    } else {
        "non-compliant".red().to_string()
    }
}
