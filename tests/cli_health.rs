mod common;

use common::{FakeGateway, TestHome};
use predicates::prelude::*;

#[test]
fn health_reports_ok() {
    let gateway = FakeGateway::start();
    let home = TestHome::new();

    home.command(&gateway.url)
        .arg("health")
        .assert()
        .success()
        .stdout("API health: ok\n");
}

#[test]
fn unreachable_gateway_is_not_an_error() {
    let home = TestHome::new();

    home.command("http://127.0.0.1:9")
        .args(["--json", "health"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"unreachable\""));
}

#[test]
fn completions_generate_for_bash() {
    let home = TestHome::new();

    home.command("http://127.0.0.1:9")
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("repoguide"));
}
