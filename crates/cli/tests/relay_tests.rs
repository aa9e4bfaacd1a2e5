// Integration tests for the relay-backed commands (ask, rules convert,
// rules recommend, ai validate, ai doctor), driven against a mock Ollama.
// Run with: cargo test -p alchemist-cli --test relay_tests

use std::fs;
use std::process::Command;

use httpmock::prelude::*;
use serde_json::json;
use tempfile::tempdir;

/// An `alch` invocation configured (via env overrides) to talk to the mock
/// server as a local provider.
fn alch_with_relay(server: &MockServer) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_alch"));
    cmd.env("ALCHEMIST_AI_PROVIDER", "local");
    cmd.env("ALCHEMIST_AI_ENDPOINT", server.base_url());
    cmd.env("ALCHEMIST_AI_MODEL", "test-model");
    cmd
}

fn alch_without_relay() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_alch"));
    cmd.env("ALCHEMIST_AI_PROVIDER", "none");
    cmd.env_remove("ALCHEMIST_AI_ENDPOINT");
    cmd
}

fn mock_reply<'a>(server: &'a MockServer, content: &str) -> httpmock::Mock<'a> {
    let content = content.to_string();
    server.mock(move |when, then| {
        when.method(POST).path("/api/chat");
        then.status(200)
            .json_body(json!({"message": {"role": "assistant", "content": content}}));
    })
}

#[test]
fn ask_prints_relay_reply() {
    let server = MockServer::start();
    let mock = mock_reply(&server, "You have one task: T1.");

    let dir = tempdir().unwrap();
    let tasks = dir.path().join("tasks.csv");
    fs::write(&tasks, "TaskID,Duration\nT1,2\n").unwrap();

    let output = alch_with_relay(&server)
        .args(["ask", "how many tasks?", "--tasks"])
        .arg(&tasks)
        .output()
        .expect("failed to run alch");

    mock.assert();
    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("You have one task: T1."), "stdout: {}", stdout);
}

#[test]
fn ask_request_carries_bounded_snapshot() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/chat")
            .body_includes("Tasks: [{\\\"TaskID\\\":\\\"T1\\\"")
            .body_includes("User query:");
        then.status(200)
            .json_body(json!({"message": {"content": "ok"}}));
    });

    let dir = tempdir().unwrap();
    let tasks = dir.path().join("tasks.csv");
    fs::write(&tasks, "TaskID\nT1\n").unwrap();

    let output = alch_with_relay(&server)
        .args(["ask", "anything there?", "--tasks"])
        .arg(&tasks)
        .output()
        .expect("failed to run alch");

    mock.assert();
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn convert_appends_parsed_rules() {
    let server = MockServer::start();
    mock_reply(
        &server,
        "```json\n{\"type\": \"coRun\", \"tasks\": [\"T1\", \"T2\"]}\n```",
    );

    let dir = tempdir().unwrap();
    let tasks = dir.path().join("tasks.csv");
    fs::write(&tasks, "TaskID\nT1\nT2\n").unwrap();
    let file = dir.path().join("rules.json");

    let output = alch_with_relay(&server)
        .args(["rules", "convert", "run T1 and T2 together", "--tasks"])
        .arg(&tasks)
        .args(["--file"])
        .arg(&file)
        .output()
        .expect("failed to run alch");

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let rules: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
    assert_eq!(rules[0]["type"], "coRun");
    assert_eq!(rules[0]["tasks"], json!(["T1", "T2"]));
}

#[test]
fn convert_accepts_relay_co_run_with_one_task() {
    // The manual builder would reject this arity; the relay path does not.
    let server = MockServer::start();
    mock_reply(&server, "{\"type\": \"coRun\", \"tasks\": [\"T1\"]}");

    let dir = tempdir().unwrap();
    let file = dir.path().join("rules.json");

    let output = alch_with_relay(&server)
        .args(["rules", "convert", "co-run T1", "--file"])
        .arg(&file)
        .output()
        .expect("failed to run alch");

    assert_eq!(output.status.code(), Some(0));
    let rules: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
    assert_eq!(rules[0]["tasks"], json!(["T1"]));
}

#[test]
fn convert_with_prose_reply_leaves_file_untouched() {
    let server = MockServer::start();
    mock_reply(&server, "Sure! You should pair T1 with T2 for best results.");

    let dir = tempdir().unwrap();
    let file = dir.path().join("rules.json");
    fs::write(&file, "[]").unwrap();

    let output = alch_with_relay(&server)
        .args(["rules", "convert", "pair T1 with T2", "--file"])
        .arg(&file)
        .output()
        .expect("failed to run alch");

    assert_eq!(output.status.code(), Some(13));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Could not parse AI output as valid rules."),
        "stderr: {}",
        stderr
    );
    // Prior state intact
    assert_eq!(fs::read_to_string(&file).unwrap(), "[]");
}

#[test]
fn recommend_appends_rule_list() {
    let server = MockServer::start();
    mock_reply(
        &server,
        "{\"rules\": [\
            {\"type\": \"coRun\", \"tasks\": [\"T1\", \"T2\"]},\
            {\"type\": \"slotRestriction\", \"group\": \"sales\", \"minCommonSlots\": 2}\
        ]}",
    );

    let dir = tempdir().unwrap();
    let file = dir.path().join("rules.json");

    let output = alch_with_relay(&server)
        .args(["rules", "recommend", "--file"])
        .arg(&file)
        .output()
        .expect("failed to run alch");

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let rules: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
    assert_eq!(rules.as_array().unwrap().len(), 2);
    assert_eq!(rules[1]["group"], "sales");
}

#[test]
fn check_prints_issue_list() {
    let server = MockServer::start();
    mock_reply(&server, "{\"issues\": [\"rule 1 references unknown task T9\"]}");

    let dir = tempdir().unwrap();
    let file = dir.path().join("rules.json");
    fs::write(&file, r#"[{"type":"coRun","tasks":["T9","T1"]}]"#).unwrap();

    let output = alch_with_relay(&server)
        .args(["rules", "check", "--file"])
        .arg(&file)
        .output()
        .expect("failed to run alch");

    assert_eq!(output.status.code(), Some(0));
    let issues: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(issues[0], "rule 1 references unknown task T9");
}

#[test]
fn ai_validate_prints_issue_list() {
    let server = MockServer::start();
    mock_reply(&server, "{\"issues\": [\"C2 has PriorityLevel 7\"]}");

    let dir = tempdir().unwrap();
    let clients = dir.path().join("clients.csv");
    fs::write(&clients, "ClientID,PriorityLevel\nC2,7\n").unwrap();

    let output = alch_with_relay(&server)
        .args(["ai", "validate", "--clients"])
        .arg(&clients)
        .output()
        .expect("failed to run alch");

    assert_eq!(output.status.code(), Some(0));
    let issues: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(issues[0], "C2 has PriorityLevel 7");
}

#[test]
fn relay_http_error_surfaces_verbatim() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/chat");
        then.status(500).json_body(json!({"error": {"message": "model exploded"}}));
    });

    let output = alch_with_relay(&server)
        .args(["ask", "hello?"])
        .output()
        .expect("failed to run alch");

    assert_eq!(output.status.code(), Some(20));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("model exploded"), "stderr: {}", stderr);
}

#[test]
fn disabled_provider_exits_10() {
    let output = alch_without_relay()
        .args(["ask", "anyone home?"])
        .output()
        .expect("failed to run alch");

    assert_eq!(output.status.code(), Some(10));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("AI is disabled"), "stderr: {}", stderr);
}

#[test]
fn key_set_rejects_unknown_provider() {
    let output = alch_without_relay()
        .args(["ai", "key", "set", "gemini", "--key", "x"])
        .output()
        .expect("failed to run alch");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown provider 'gemini'"), "stderr: {}", stderr);
}

#[test]
fn key_set_rejects_keyless_provider() {
    // Ollama has no API key; only the cloud providers do
    let output = alch_without_relay()
        .args(["ai", "key", "set", "local", "--key", "x"])
        .output()
        .expect("failed to run alch");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("does not use an API key"),
        "stderr: {}",
        stderr
    );
}

#[test]
fn key_set_rejects_empty_key() {
    let output = alch_without_relay()
        .args(["ai", "key", "set", "openai", "--key", ""])
        .output()
        .expect("failed to run alch");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("empty API key"), "stderr: {}", stderr);
}

#[test]
fn doctor_reports_disabled() {
    let output = alch_without_relay()
        .args(["ai", "doctor", "--json"])
        .output()
        .expect("failed to run alch");

    assert_eq!(output.status.code(), Some(10));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["status"], "disabled");
    assert_eq!(json["provider"], "none");
}

#[test]
fn doctor_ready_for_local_provider() {
    let server = MockServer::start();
    let output = alch_with_relay(&server)
        .args(["ai", "doctor", "--json", "--test"])
        .output()
        .expect("failed to run alch");

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["status"], "ready");
    assert_eq!(json["provider"], "local");
    assert_eq!(json["model"], "test-model");
    assert_ne!(json["test"], "skipped");
}
