mod common;

use common::TestHome;
use predicates::prelude::*;

const NO_GATEWAY: &str = "http://127.0.0.1:9";

#[test]
fn theme_defaults_to_dark() {
    let home = TestHome::new();

    home.command(NO_GATEWAY)
        .arg("theme")
        .assert()
        .success()
        .stdout("Theme: dark\n");
}

#[test]
fn theme_toggle_persists() {
    let home = TestHome::new();

    home.command(NO_GATEWAY)
        .args(["theme", "toggle"])
        .assert()
        .success()
        .stdout("Theme: light\n");

    assert!(home.path().join("preferences.toml").exists());

    home.command(NO_GATEWAY)
        .args(["--json", "theme"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"theme\": \"light\""))
        .stdout(predicate::str::contains("\"changed\": false"));
}

#[test]
fn theme_rejects_unknown_value() {
    let home = TestHome::new();

    home.command(NO_GATEWAY)
        .args(["theme", "sepia"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown theme: sepia"));
}
