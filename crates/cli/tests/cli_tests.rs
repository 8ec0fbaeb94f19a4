//! CLI integration tests
//!
//! Cluster access is avoided by feeding inventory snapshots from disk.

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const BIN: &str = env!("CARGO_BIN_EXE_kubectl-upgrade_readiness");

const SNAPSHOT: &str = r#"{
    "nodes": [
        {"name": "worker-1", "kubelet_version": "v1.27.5"},
        {"name": "worker-2", "kubelet_version": "v1.26.9"},
        {"name": "worker-3", "kubelet_version": "v1.31.0"},
        {"name": "worker-4", "kubelet_version": "garbage"}
    ],
    "pods": [
        {"name": "etcd-cp-1", "images": ["registry.k8s.io/etcd:3.5.15-0"]},
        {"name": "coredns-1", "images": ["registry.k8s.io/coredns/coredns:v1.11.1"]},
        {"name": "metrics-server-1", "images": ["registry/metrics-server:0.6.3"]},
        {"name": "custom", "images": ["myregistry/custom-app:2.0.0"]}
    ]
}"#;

const COMPLIANT_SNAPSHOT: &str = r#"{
    "nodes": [{"name": "worker-1", "kubelet_version": "v1.31.2"}],
    "pods": [{"name": "etcd-cp-1", "images": ["registry.k8s.io/etcd:3.5.15-0"]}]
}"#;

/// Run the binary isolated from the user's config and cluster
fn run(home: &Path, args: &[&str]) -> Output {
    Command::new(BIN)
        .args(args)
        .env("HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("KUBECONFIG")
        .env_remove("RUST_LOG")
        .env_remove("UPGRADE_READINESS_TARGET_VERSION")
        .env_remove("UPGRADE_READINESS_NAMESPACE")
        .env_remove("UPGRADE_READINESS_MATRIX_PATH")
        .output()
        .expect("Failed to execute command")
}

fn write_snapshot(dir: &TempDir, content: &str) -> String {
    let path = dir.path().join("inventory.json");
    std::fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("--target-version"), "Should show target option");
    assert!(stdout.contains("--verbose"), "Should show verbose option");
    assert!(stdout.contains("--inventory"), "Should show inventory option");
    assert!(stdout.contains("--matrix"), "Should show matrix option");
    assert!(stdout.contains("KUBECONFIG"), "Should show env var");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("kubectl-upgrade_readiness"), "Should show binary name");
}

/// A malformed target aborts before the inventory is touched
#[test]
fn test_malformed_target_is_fatal() {
    let home = TempDir::new().unwrap();
    let output = run(
        home.path(),
        &["--target-version", "latest", "--inventory", "/nonexistent/inventory.json"],
    );

    assert!(!output.status.success(), "Malformed target should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid target version"), "stderr: {stderr}");
}

#[test]
fn test_text_report_from_snapshot() {
    let home = TempDir::new().unwrap();
    let snapshot = write_snapshot(&home, SNAPSHOT);
    let output = run(home.path(), &["--target-version", "v1.31", "--inventory", &snapshot]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("kubectl-upgrade-readiness (target: v1.31)"));
    assert!(stdout.contains("Kubelet Version Skew Check (target: v1.31):"));
    assert!(stdout.contains("  [!] Unable to parse version for worker-4"));
    assert!(stdout.contains("❌ Non-compliant versions:\n  - v1.26.9 (1 nodes)"));
    assert!(
        stdout.contains("✅ Compliant versions:\n  - v1.27.5 (1 nodes)\n  - v1.31.0 (1 nodes)")
    );
    assert!(stdout.contains("  ✅ coredns: 1.11.1 (1 pods)"));
    assert!(stdout.contains("  ✅ etcd: 3.5.15 (1 pods)"));
    assert!(stdout.contains("  ❌ metrics-server: 0.6.3 (1 pods, expected: 0.7.0, 0.7.1, 0.7.2)"));
    assert!(!stdout.contains("custom"));
}

#[test]
fn test_verbose_lists_members() {
    let home = TempDir::new().unwrap();
    let snapshot = write_snapshot(&home, SNAPSHOT);
    let output = run(home.path(), &["--inventory", &snapshot, "--verbose"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("  - v1.31.0 (1 nodes)\n    • worker-3"));
    assert!(stdout.contains("  ✅ coredns: 1.11.1 (1 pods)\n    • coredns-1"));
}

#[test]
fn test_target_without_matrix_row() {
    let home = TempDir::new().unwrap();
    let snapshot = write_snapshot(&home, SNAPSHOT);
    let output = run(home.path(), &["--target-version", "v1.34", "--inventory", &snapshot]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("No compatibility data for v1.34").count(), 1);
    assert!(stdout.contains("Kubelet Version Skew Check (target: v1.34)"));
}

#[test]
fn test_json_report() {
    let home = TempDir::new().unwrap();
    let snapshot = write_snapshot(&home, SNAPSHOT);
    let output = run(
        home.path(),
        &["--target-version", "1.31.2", "--inventory", &snapshot, "--format", "json"],
    );

    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be a JSON document");

    assert!(json["generated_at"].is_string());
    assert_eq!(json["target"]["raw"], "1.31.2");
    assert_eq!(json["addons"]["status"], "evaluated");
    assert_eq!(json["addons"]["matrix_key"], "v1.31");
    assert_eq!(json["agents"]["groups"].as_array().unwrap().len(), 3);
}

#[test]
fn test_table_report() {
    let home = TempDir::new().unwrap();
    let snapshot = write_snapshot(&home, SNAPSHOT);
    let output = run(home.path(), &["--inventory", &snapshot, "--format", "table"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Kubelet Version"));
    assert!(stdout.contains("metrics-server"));
    assert!(stdout.contains("non-compliant"));
}

#[test]
fn test_fail_on_noncompliant() {
    let home = TempDir::new().unwrap();
    let snapshot = write_snapshot(&home, SNAPSHOT);
    let output = run(home.path(), &["--inventory", &snapshot, "--fail-on-noncompliant"]);
    assert_eq!(output.status.code(), Some(1));

    let ready = TempDir::new().unwrap();
    let snapshot = write_snapshot(&ready, COMPLIANT_SNAPSHOT);
    let output = run(ready.path(), &["--inventory", &snapshot, "--fail-on-noncompliant"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("All evaluated components are ready for v1.31"));
}

#[test]
fn test_custom_matrix_file() {
    let home = TempDir::new().unwrap();
    let snapshot = write_snapshot(&home, SNAPSHOT);
    let matrix = home.path().join("matrix.json");
    std::fs::write(&matrix, r#"{"v1.31": {"metrics-server": ["0.6.3"]}}"#).unwrap();

    let output = run(
        home.path(),
        &["--inventory", &snapshot, "--matrix", matrix.to_str().unwrap()],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("  ✅ metrics-server: 0.6.3 (1 pods)"));
    // etcd and coredns are untracked by this matrix
    assert!(!stdout.contains("etcd:"));
}

#[test]
fn test_invalid_matrix_file() {
    let home = TempDir::new().unwrap();
    let snapshot = write_snapshot(&home, SNAPSHOT);
    let matrix = home.path().join("matrix.json");
    std::fs::write(&matrix, r#"{"1.31": {}}"#).unwrap();

    let output = run(
        home.path(),
        &["--inventory", &snapshot, "--matrix", matrix.to_str().unwrap()],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid matrix key"), "stderr: {stderr}");
}

#[test]
fn test_config_file_defaults() {
    let home = TempDir::new().unwrap();
    let config_dir = home.path().join(".config").join("upgrade-readiness");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.json"), r#"{"target_version": "v1.28"}"#).unwrap();
    let snapshot = write_snapshot(&home, SNAPSHOT);

    let output = run(home.path(), &["--inventory", &snapshot]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("(target: v1.28)"));
}

/// Test invalid argument error handling
#[test]
fn test_invalid_format() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["--format", "xml"]);

    assert!(!output.status.success(), "Invalid format should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid value"), "Should show error message");
}
