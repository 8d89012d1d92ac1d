//! Integration tests for the `botherd` binary's offline commands.
//!
//! Each test points the binary at a temporary data directory so the user's
//! real record store is never touched.

use std::path::PathBuf;
use std::process::Command;

fn botherd_bin() -> PathBuf {
    std::env::var("CARGO_BIN_EXE_botherd")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("target/debug/botherd"))
}

fn temp_data_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("temp dir")
}

fn write_records(tmp: &tempfile::TempDir) {
    let records = r#"{
  "alice_echoBot_1700000000000": {
    "id": "alice_echoBot_1700000000000",
    "name": "echoBot",
    "owner": "alice",
    "file_path": "/tmp/uploads/alice/alice_echoBot_1700000000000.py",
    "file_type": "py",
    "status": "running",
    "created_at": "2023-11-14T22:13:20Z",
    "started_at": "2023-11-14T22:14:00Z",
    "stopped_at": null,
    "cpu": 0.0,
    "memory": 0.0
  },
  "bob_other_1700000000001": {
    "id": "bob_other_1700000000001",
    "name": "other",
    "owner": "bob",
    "file_path": "/tmp/uploads/bob/bob_other_1700000000001.js",
    "file_type": "js",
    "status": "stopped",
    "created_at": "2023-11-14T22:13:20.001Z"
  }
}"#;
    std::fs::write(tmp.path().join("bots.json"), records).unwrap();
}

#[test]
fn help_lists_commands() {
    let output = Command::new(botherd_bin())
        .arg("help")
        .output()
        .expect("botherd help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("serve"));
    assert!(stdout.contains("bots <username>"));
    assert!(stdout.contains("--port"));
}

#[test]
fn bots_lists_only_the_requested_owner() {
    let tmp = temp_data_dir();
    write_records(&tmp);

    let output = Command::new(botherd_bin())
        .args(["bots", "alice", "--data-dir"])
        .arg(tmp.path())
        .output()
        .expect("botherd bots alice");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("alice_echoBot_1700000000000"));
    assert!(stdout.contains("recorded as running"));
    assert!(!stdout.contains("bob_other_1700000000001"));
}

#[test]
fn bots_without_store_reports_nothing_to_show() {
    let tmp = temp_data_dir();

    let output = Command::new(botherd_bin())
        .args(["bots", "alice", "--data-dir"])
        .arg(tmp.path())
        .output()
        .expect("botherd bots alice");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No record store"));
    assert!(!tmp.path().join("bots.json").exists());
}

#[test]
fn bots_without_username_fails() {
    let output = Command::new(botherd_bin())
        .arg("bots")
        .output()
        .expect("botherd bots");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("missing username").count(), 1, "{stderr}");
    assert!(stderr.contains("Usage: botherd bots <username>"));
}

#[test]
fn unknown_command_fails() {
    let output = Command::new(botherd_bin())
        .arg("frobnicate")
        .output()
        .expect("botherd frobnicate");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown command"));
}
