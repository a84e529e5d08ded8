//! Output contract tests for the imgsan CLI.

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::TestFixture;
use predicates::prelude::*;
use serde_json::Value;

#[test]
fn test_json_contract() {
    let fx = TestFixture::new();
    fx.create_images(3);

    let output = cargo_bin_cmd!("imgsan")
        .arg("sanitize")
        .arg(fx.src.path())
        .arg(fx.dst.path())
        .arg("--output")
        .arg("json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    // stdout holds exactly one JSON document; logs go to stderr
    let payload: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(payload["schema_version"], "1.0");
    assert_eq!(payload["copied"], 3);
    assert_eq!(payload["ignored"], 0);
    assert_eq!(payload["failed"], 0);
    assert!(payload["duration_ms"].is_u64());
    assert!(payload.get("cancelled").is_none());
}

#[test]
fn test_human_table() {
    let fx = TestFixture::new();
    fx.create_images(2);

    cargo_bin_cmd!("imgsan")
        .arg("sanitize")
        .arg(fx.src.path())
        .arg(fx.dst.path())
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("| Result"))
        .stdout(predicate::str::contains("Copied files"))
        .stdout(predicate::str::contains("Ignored files"))
        .stdout(predicate::str::contains("Failed files"))
        .stdout(predicate::str::contains("Completed in"));
}

#[test]
fn test_logs_on_stderr_only() {
    let fx = TestFixture::new();
    fx.create_images(1);

    cargo_bin_cmd!("imgsan")
        .env_remove("RUST_LOG")
        .arg("sanitize")
        .arg(fx.src.path())
        .arg(fx.dst.path())
        .arg("-q")
        .assert()
        .success()
        .stdout(predicate::str::contains("Scanning").not())
        .stderr(predicate::str::contains(
            "Scanning source folder for images...",
        ))
        .stderr(predicate::str::contains(
            "Scanning destination folder for existing files...",
        ));
}

#[test]
fn test_rust_log_overrides_default_level() {
    let fx = TestFixture::new();
    fx.create_images(1);

    cargo_bin_cmd!("imgsan")
        .env("RUST_LOG", "error")
        .arg("sanitize")
        .arg(fx.src.path())
        .arg(fx.dst.path())
        .arg("-q")
        .assert()
        .success()
        .stderr(predicate::str::contains("Scanning").not());
}
