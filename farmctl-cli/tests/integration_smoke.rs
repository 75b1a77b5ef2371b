//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_top_level_help() {
    let mut cmd = Command::cargo_bin("farmctl").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("insights"));
}

#[test]
fn test_serve_help() {
    let mut cmd = Command::cargo_bin("farmctl").unwrap();
    cmd.arg("serve").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--cors-permissive"))
        .stdout(predicate::str::contains("--database-url"));
}

#[test]
fn test_insights_requires_farm_id() {
    let mut cmd = Command::cargo_bin("farmctl").unwrap();
    cmd.arg("insights");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--farm-id"));
}

#[test]
fn test_insights_rejects_bad_uuid() {
    let mut cmd = Command::cargo_bin("farmctl").unwrap();
    cmd.arg("insights").arg("--farm-id").arg("not-a-uuid");

    cmd.assert().failure();
}

#[test]
fn test_config_show_masks_secrets() {
    let home = std::env::temp_dir().join("farmctl-smoke-home");
    let mut cmd = Command::cargo_bin("farmctl").unwrap();
    cmd.env("HOME", &home)
        .env("OPENAI_API_KEY", "sk-very-secret-value")
        .env("DATABASE_URL", "postgres://user:pw@localhost/farm")
        .arg("config")
        .arg("show");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("sk-v****"))
        .stdout(predicate::str::contains("sk-very-secret-value").not());
}
