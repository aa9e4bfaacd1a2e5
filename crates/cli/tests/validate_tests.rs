// Integration tests for `alch validate`.
// Run with: cargo test -p alchemist-cli --test validate_tests

use std::fs;
use std::process::Command;

use tempfile::tempdir;

fn alch() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_alch"));
    // Clear env so a developer's relay configuration never leaks into tests
    cmd.env_remove("ALCHEMIST_AI_PROVIDER");
    cmd.env_remove("ALCHEMIST_AI_ENDPOINT");
    cmd.env_remove("ALCHEMIST_AI_MODEL");
    cmd
}

#[test]
fn clean_dataset_exits_zero() {
    let dir = tempdir().unwrap();
    let clients = dir.path().join("clients.csv");
    fs::write(&clients, "ClientID,Name,PriorityLevel\nC1,Acme,3\nC2,Globex,5\n").unwrap();

    let output = alch()
        .args(["validate", "--clients"])
        .arg(&clients)
        .output()
        .expect("failed to run alch");

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Found 0 validation issues."), "stdout: {}", stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("clients loaded successfully"), "stderr: {}", stderr);
}

#[test]
fn issues_exit_4_and_name_the_cell() {
    let dir = tempdir().unwrap();
    let tasks = dir.path().join("tasks.csv");
    fs::write(
        &tasks,
        "TaskID,Duration,AttributesJSON\nT1,0,{bad}\nT2,2,{\"ok\":true}\n",
    )
    .unwrap();

    let output = alch()
        .args(["validate", "--tasks"])
        .arg(&tasks)
        .output()
        .expect("failed to run alch");

    assert_eq!(output.status.code(), Some(4));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tasks[0].Duration: Must be ≥ 1"), "stdout: {}", stdout);
    assert!(stdout.contains("tasks[0].AttributesJSON: Invalid JSON"), "stdout: {}", stdout);
    assert!(stdout.contains("Found 2 validation issues."), "stdout: {}", stdout);
}

#[test]
fn set_edit_fixes_issue() {
    let dir = tempdir().unwrap();
    let tasks = dir.path().join("tasks.csv");
    fs::write(&tasks, "TaskID,Duration\nT1,0\n").unwrap();

    let output = alch()
        .args(["validate", "--tasks"])
        .arg(&tasks)
        .args(["--set", "tasks:0:Duration=3"])
        .output()
        .expect("failed to run alch");

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn set_edit_can_break_a_cell_too() {
    let dir = tempdir().unwrap();
    let clients = dir.path().join("clients.csv");
    fs::write(&clients, "ClientID,PriorityLevel\nC1,3\n").unwrap();

    let output = alch()
        .args(["validate", "--clients"])
        .arg(&clients)
        .args(["--set", "clients:0:PriorityLevel=9"])
        .output()
        .expect("failed to run alch");

    assert_eq!(output.status.code(), Some(4));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Out of range (1-5)"), "stdout: {}", stdout);
}

#[test]
fn unsupported_extension_reports_status_and_loads_nothing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("clients.pdf");
    fs::write(&path, "definitely not tabular").unwrap();

    let output = alch()
        .args(["validate", "--clients"])
        .arg(&path)
        .output()
        .expect("failed to run alch");

    // Nothing loaded, so nothing to flag
    assert_eq!(output.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unsupported file format"), "stderr: {}", stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Found 0 validation issues."), "stdout: {}", stdout);
}

#[test]
fn json_output_is_machine_readable() {
    let dir = tempdir().unwrap();
    let tasks = dir.path().join("tasks.csv");
    fs::write(&tasks, "TaskID,Duration\nT1,0\n").unwrap();

    let output = alch()
        .args(["validate", "--json", "--tasks"])
        .arg(&tasks)
        .output()
        .expect("failed to run alch");

    assert_eq!(output.status.code(), Some(4));
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(json["count"], 1);
    assert_eq!(json["issues"][0]["kind"], "tasks");
    assert_eq!(json["issues"][0]["field"], "Duration");
    assert_eq!(json["issues"][0]["reason"], "Must be ≥ 1");
}

#[test]
fn no_input_files_is_usage_error() {
    let output = alch().arg("validate").output().expect("failed to run alch");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no input files"), "stderr: {}", stderr);
}

#[test]
fn bad_edit_is_usage_error() {
    let dir = tempdir().unwrap();
    let tasks = dir.path().join("tasks.csv");
    fs::write(&tasks, "TaskID\nT1\n").unwrap();

    let output = alch()
        .args(["validate", "--tasks"])
        .arg(&tasks)
        .args(["--set", "tasks:99:Duration=3"])
        .output()
        .expect("failed to run alch");

    assert_eq!(output.status.code(), Some(2));
}
