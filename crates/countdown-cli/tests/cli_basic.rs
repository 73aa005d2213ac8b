//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify the JSON output.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "countdown-cli", "--"])
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn calc_duration_rounds_to_whole_seconds() {
    let (stdout, _, code) = run_cli(&["calc", "10500", "--duration"]);
    assert_eq!(code, 0, "calc failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["delta"]["total"], 11_000);
    assert_eq!(parsed["delta"]["completed"], false);
    assert_eq!(parsed["display"], "00:00:00:11");
}

#[test]
fn calc_with_precision_keeps_milliseconds() {
    let (stdout, _, code) = run_cli(&["calc", "90110456", "--duration", "--precision", "3"]);
    assert_eq!(code, 0, "calc failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["delta"]["total"], 90_110_456);
    assert_eq!(parsed["delta"]["days"], 1);
    assert_eq!(parsed["delta"]["milliseconds"], 456);
    assert_eq!(parsed["formatted"]["seconds"], "50");
}

#[test]
fn calc_rejects_an_unparseable_date() {
    let (_, stderr, code) = run_cli(&["calc", "not a date"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("invalid date input"));
}

#[test]
fn run_counts_down_to_completion() {
    let (stdout, _, code) = run_cli(&["run", "--secs", "1", "--interval-ms", "200"]);
    assert_eq!(code, 0, "run failed");

    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert!(lines.iter().any(|event| event["type"] == "Started"));
    assert!(lines.iter().any(|event| event["type"] == "Completed"));

    let last = lines.last().unwrap();
    assert_eq!(last["type"], "Snapshot");
    assert_eq!(last["status"], "completed");
}
