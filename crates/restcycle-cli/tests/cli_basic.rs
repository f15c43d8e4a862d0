//! Basic CLI E2E tests.
//!
//! Tests invoke the binary via cargo run, feed commands on stdin and check
//! the output. Closing stdin quits the session.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run the CLI with `input` on stdin and return (stdout, stderr, code).
fn run_cli(args: &[&str], input: &str) -> (String, String, i32) {
    let mut child = Command::new("cargo")
        .args(["run", "-q", "-p", "restcycle-cli", "--"])
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("Failed to write CLI input");

    let output = child.wait_with_output().expect("Failed to wait for CLI");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn config_arg(dir: &Path) -> String {
    dir.join("settings.toml").display().to_string()
}

#[test]
fn test_fresh_start_writes_default_settings() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_arg(dir.path());
    let (stdout, _, code) = run_cli(&["--no-notify", "--config", &config], "status\nquit\n");
    assert_eq!(code, 0, "CLI failed");
    assert!(stdout.contains("idle (work 20 min, rest 10 min)"));

    let written = std::fs::read_to_string(dir.path().join("settings.toml")).unwrap();
    assert!(written.contains("work_minutes = 20"));
    assert!(written.contains("rest_minutes = 10"));
}

#[test]
fn test_toggle_starts_work_phase() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_arg(dir.path());
    let (stdout, _, code) = run_cli(
        &["--no-notify", "--work", "25", "--config", &config],
        "toggle\nstatus\nquit\n",
    );
    assert_eq!(code, 0, "CLI failed");
    assert!(stdout.contains("[idle -> working] 25:00 left"));
    assert!(stdout.contains("[working -> idle]"));
}

#[test]
fn test_out_of_range_overrides_are_clamped() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_arg(dir.path());
    let (stdout, _, code) = run_cli(
        &["--no-notify", "--work", "999", "--rest", "0", "--config", &config],
        "status\n",
    );
    assert_eq!(code, 0, "CLI failed");
    assert!(stdout.contains("work 240 min, rest 1 min"));
}

#[test]
fn test_fast_test_cycle_reaches_confirmation() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_arg(dir.path());
    let (stdout, _, code) = run_cli(
        &["--test", "--no-notify", "--start", "--config", &config],
        "break\nexit\nyes\nquit\n",
    );
    assert_eq!(code, 0, "CLI failed");
    assert!(stdout.contains("[idle -> working] 00:05 left"));
    assert!(stdout.contains("[working -> resting] 00:05 left"));
    assert!(stdout.contains("Back to work? [yes/no]"));
    assert!(stdout.contains("[awaiting confirmation -> working] 00:05 left"));
}

#[test]
fn test_settings_editor_persists() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_arg(dir.path());
    let (_, _, code) = run_cli(
        &["--no-notify", "--config", &config],
        "settings\nset rest_minutes 7\nset always_on_top false\nsave\nquit\n",
    );
    assert_eq!(code, 0, "CLI failed");

    let written = std::fs::read_to_string(dir.path().join("settings.toml")).unwrap();
    assert!(written.contains("rest_minutes = 7"));
    assert!(written.contains("always_on_top = false"));
    assert!(written.contains("show_notifications = false"));
}

#[test]
fn test_json_status_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_arg(dir.path());
    let (stdout, _, code) = run_cli(
        &["--json", "--no-notify", "--config", &config],
        "status\n",
    );
    assert_eq!(code, 0, "CLI failed");
    let snapshot = stdout
        .lines()
        .filter_map(|l| serde_json::from_str::<serde_json::Value>(l).ok())
        .find(|v| v["type"] == "StateSnapshot")
        .expect("no snapshot printed");
    assert_eq!(snapshot["phase"], "idle");
    assert_eq!(snapshot["settings"]["work_minutes"], 20);
}

#[test]
fn test_unknown_command_does_not_exit() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_arg(dir.path());
    let (stdout, _, code) = run_cli(
        &["--no-notify", "--config", &config],
        "dance\nstatus\nquit\n",
    );
    assert_eq!(code, 0, "CLI failed");
    assert!(stdout.contains("idle (work 20 min"));
}

#[test]
fn test_json_mode_prints_only_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_arg(dir.path());
    let (stdout, _, code) = run_cli(
        &["--json", "--test", "--config", &config],
        "toggle\nbreak\nexit\nyes\nstatus\nquit\n",
    );
    assert_eq!(code, 0, "CLI failed");
    for line in stdout.lines() {
        assert!(
            serde_json::from_str::<serde_json::Value>(line).is_ok(),
            "not JSON: {line:?}"
        );
    }
    assert!(stdout.contains("\"type\":\"PhaseChanged\""));
}
