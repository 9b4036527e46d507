//! CLI integration tests

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Run the binary inside `dir` with a clean environment
fn run_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_idguard"))
        .args(args)
        .current_dir(dir)
        .env("HOME", dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("IDGUARD_CONFIG")
        .env_remove("IDGUARD_LOG_JSON")
        .output()
        .expect("Failed to execute command")
}

fn run_json(dir: &Path, args: &[&str]) -> serde_json::Value {
    let output = run_in(dir, args);
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let dir = TempDir::new().unwrap();
    let output = run_in(dir.path(), &["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("Identity analytics"), "Should show about text");
    for command in ["regions", "summary", "suspicious", "spikes", "alerts"] {
        assert!(stdout.contains(command), "Should show {} command", command);
    }
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let dir = TempDir::new().unwrap();
    let output = run_in(dir.path(), &["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("idguard"), "Should show binary name");
}

#[test]
fn test_spikes_help() {
    let dir = TempDir::new().unwrap();
    let output = run_in(dir.path(), &["spikes", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("--window"));
    assert!(stdout.contains("--preceding"));
}

#[test]
fn test_regions_from_sample_data() {
    let dir = TempDir::new().unwrap();
    let json = run_json(dir.path(), &["--format", "json", "regions"]);

    assert_eq!(json["source"], "built-in sample");
    assert_eq!(
        json["regions"],
        serde_json::json!(["North", "South", "West", "East"])
    );
}

#[test]
fn test_summary_for_region() {
    let dir = TempDir::new().unwrap();
    let json = run_json(
        dir.path(),
        &["-f", "json", "summary", "--region", "North"],
    );

    assert_eq!(json["kpis"]["total"], 5);
    assert_eq!(json["kpis"]["high_risk_count"], 1);
}

#[test]
fn test_suspicious_export() {
    let dir = TempDir::new().unwrap();
    let report = dir.path().join("suspicious_activity_report.csv");
    let report_arg = report.to_string_lossy().into_owned();

    let json = run_json(
        dir.path(),
        &[
            "-f",
            "json",
            "suspicious",
            "--threshold",
            "75",
            "--export",
            &report_arg,
        ],
    );
    assert_eq!(json["count"], 3);

    let content = std::fs::read_to_string(&report).unwrap();
    assert!(content.starts_with("Age,Gender,Region,Score"));
    assert_eq!(content.lines().count(), 4);
}

#[test]
fn test_suspicious_from_data_file() {
    let dir = TempDir::new().unwrap();
    let data = write_file(
        &dir,
        "identities.csv",
        "Age,Gender,Region,Score\n30,Female,North,50\n41,Male,South,90\n",
    );

    let output = run_in(dir.path(), &["--data", &data, "suspicious"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success());
    assert!(stderr.contains("SECURITY ALERT: 1 suspicious"));
    assert!(stdout.contains("North"));
    assert!(!stdout.contains("South"));
}

#[test]
fn test_suspicious_rejects_out_of_range_threshold() {
    let dir = TempDir::new().unwrap();
    let output = run_in(dir.path(), &["suspicious", "--threshold", "150"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("threshold"));
}

#[test]
fn test_spikes_preceding_baseline() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "series.csv", "value\n1\n1\n1\n1\n1\n1\n100\n");

    let json = run_json(
        dir.path(),
        &[
            "-f",
            "json",
            "spikes",
            "--input",
            &input,
            "--column",
            "value",
            "--window",
            "6",
            "--preceding",
        ],
    );

    assert_eq!(json["spike_indices"], serde_json::json!([6]));
    assert_eq!(json["points"].as_array().unwrap().len(), 7);
    assert!(json["points"][0]["stats"].is_null());
}

#[test]
fn test_spikes_invalid_window() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "series.csv", "value\n1\n2\n3\n");

    let output = run_in(
        dir.path(),
        &["spikes", "-i", &input, "-c", "value", "-w", "1"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("window"));
}

#[test]
fn test_alerts_ordering() {
    let dir = TempDir::new().unwrap();
    let demographic = write_file(
        &dir,
        "demographic.csv",
        "district,total_updates\nA,10\nB,10\nC,100\nD,5\n",
    );

    let json = run_json(
        dir.path(),
        &[
            "-f",
            "json",
            "alerts",
            "--biometric-count",
            "5",
            "--demographic",
            &demographic,
        ],
    );

    let alerts = json["alerts"].as_array().unwrap();
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0]["severity"], "CRITICAL");
    assert_eq!(alerts[1]["severity"], "WARNING");
    assert_eq!(alerts[1]["count"], 100.0);
}

#[test]
fn test_alerts_from_summary_file() {
    let dir = TempDir::new().unwrap();
    let summary = write_file(
        &dir,
        "summary.json",
        r#"{"biometric_event_count": 0, "demographic_update_total_max": 0, "demographic_update_total_mean": 0}"#,
    );

    let json = run_json(dir.path(), &["-f", "json", "alerts", "--summary", &summary]);
    assert!(json["alerts"].as_array().unwrap().is_empty());
}

#[test]
fn test_alerts_strict_missing_field() {
    let dir = TempDir::new().unwrap();
    let output = run_in(dir.path(), &["alerts", "--biometric-count", "1", "--strict"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("demographic_burst"));
}
