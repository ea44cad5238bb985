mod common;

use common::{FakeGateway, TestHome};
use predicates::prelude::*;

#[test]
fn ask_prints_answer_and_numbered_citations() {
    let gateway = FakeGateway::start();
    let home = TestHome::new();

    home.command(&gateway.url)
        .args(["ask", "how", "do", "I", "run", "it?"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Run it with docker compose"))
        .stdout(predicate::str::contains("  • docker compose up"))
        .stdout(predicate::str::contains("  [1] README.md:1-3"))
        .stdout(predicate::str::contains("  [2] empty.py:5-6"));

    assert_eq!(
        gateway.bodies("/explain"),
        vec![serde_json::json!({"question": "how do I run it?"})]
    );
}

#[test]
fn blank_question_sends_nothing() {
    let gateway = FakeGateway::start();
    let home = TestHome::new();

    home.command(&gateway.url)
        .args(["ask", "   "])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert!(gateway.requests().is_empty());
}

#[test]
fn gateway_detail_becomes_the_error_message() {
    let gateway = FakeGateway::start();
    let home = TestHome::new();

    home.command(&gateway.url)
        .args(["ask", "is the model offline?"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("model offline"));
}

#[test]
fn error_without_detail_reports_status_code() {
    let gateway = FakeGateway::start();
    let home = TestHome::new();

    home.command(&gateway.url)
        .args(["ask", "crash please"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("HTTP 500"));
}

#[test]
fn ask_preview_fetches_each_excerpt() {
    let gateway = FakeGateway::start();
    let home = TestHome::new();

    home.command(&gateway.url)
        .args(["ask", "--preview", "how", "to", "run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("README.md:1-3\n  │ # Demo\n  │ line two"))
        .stdout(predicate::str::contains("empty.py:5-6\n  │ (empty)"));

    assert_eq!(gateway.bodies("/snippet").len(), 2);
}

#[test]
fn ask_json_includes_previews() {
    let gateway = FakeGateway::start();
    let home = TestHome::new();

    let out = home
        .command(&gateway.url)
        .args(["--json", "ask", "--preview", "how", "to", "run"])
        .output()
        .expect("failed to run repoguide");
    assert!(out.status.success());

    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["summary"], "Run it with docker compose");
    assert_eq!(json["citations"].as_array().unwrap().len(), 2);
    assert_eq!(json["previews"][0]["text"], "# Demo\nline two");
    assert_eq!(json["previews"][1]["text"], "(empty)");
}
