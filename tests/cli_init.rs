mod common;

use common::TestHome;
use predicates::prelude::*;

#[test]
fn init_writes_config_with_server() {
    let home = TestHome::new();

    home.command("http://guide.local:9000/")
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Config written to"))
        .stdout(predicate::str::contains("Gateway: http://guide.local:9000"));

    let content = std::fs::read_to_string(home.path().join("config.toml")).unwrap();
    let config: toml::Value = toml::from_str(&content).unwrap();
    assert_eq!(
        config["gateway"]["base_url"].as_str(),
        Some("http://guide.local:9000")
    );
    assert_eq!(config["tools"]["days"].as_integer(), Some(30));
}

#[test]
fn init_twice_fails_without_force() {
    let home = TestHome::new();

    home.command("http://localhost:8000")
        .arg("init")
        .assert()
        .success();

    home.command("http://localhost:8000")
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Use --force to overwrite"));

    home.command("http://localhost:8000")
        .args(["init", "--force"])
        .assert()
        .success();
}

#[test]
fn init_json_output() {
    let home = TestHome::new();

    home.command("http://localhost:8000")
        .args(["--json", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"initialized\""));
}
