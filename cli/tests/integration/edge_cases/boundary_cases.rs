//! Boundary cases integration tests for the imgsan CLI.
//!
//! These tests verify behavior at edge cases and boundary conditions:
//! - Empty files
//! - Extension case handling
//! - Unicode file names
//! - Fingerprints in upper case or with a numeric prefix
//! - Duplicates inside a single run
//! - Many files in a single directory

use crate::common::{HELLO_SHORT, TestFixture};
use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use std::fs;

fn run_json(fx: &TestFixture, extra: &[&str]) -> Value {
    let output = cargo_bin_cmd!("imgsan")
        .arg("sanitize")
        .arg(fx.src.path())
        .arg(fx.dst.path())
        .arg("--output")
        .arg("json")
        .args(extra)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&output).unwrap()
}

// =============================================================================
// Content and name edge cases
// =============================================================================

/// An empty file has no JPEG header; it is copied as is.
#[test]
fn test_empty_file() {
    let fx = TestFixture::new();
    fx.write_source("empty.jpg", "");

    let payload = run_json(&fx, &[]);
    assert_eq!(payload["copied"], 1);

    // sha1 of the empty string
    let target = fx.dst.path().join("da39a3ee5e6b.jpg");
    assert_eq!(fs::metadata(target).unwrap().len(), 0);
}

#[test]
fn test_extension_lowercased() {
    let fx = TestFixture::new();
    fx.write_source("IMG_0001.JPEG", "hello world");

    run_json(&fx, &[]);
    assert_eq!(fx.dest_files(), vec![format!("{HELLO_SHORT}.jpeg")]);
}

#[test]
fn test_unicode_file_names() {
    let fx = TestFixture::new();
    fx.write_source("été/日本の写真.jpg", "hello world");

    let payload = run_json(&fx, &[]);
    assert_eq!(payload["copied"], 1);
    assert!(
        fx.dst
            .path()
            .join(format!("été/{HELLO_SHORT}.jpg"))
            .is_file()
    );
}

// =============================================================================
// Fingerprint matching
// =============================================================================

#[test]
fn test_uppercase_fingerprint_matches() {
    let fx = TestFixture::new();
    fx.write_source("a.jpg", "hello world");
    fs::write(
        fx.dst.path().join(HELLO_SHORT.to_uppercase() + ".JPG"),
        "old",
    )
    .unwrap();

    let payload = run_json(&fx, &[]);
    assert_eq!(payload["copied"], 0);
    assert_eq!(payload["ignored"], 1);
}

#[test]
fn test_fingerprint_in_nested_destination_matches() {
    let fx = TestFixture::new();
    fx.write_source("a.jpg", "hello world");
    fs::create_dir_all(fx.dst.path().join("2019/old")).unwrap();
    fs::write(
        fx.dst.path().join(format!("2019/old/42_{HELLO_SHORT}.jpg")),
        "old",
    )
    .unwrap();

    let payload = run_json(&fx, &[]);
    assert_eq!(payload["ignored"], 1);
}

#[test]
fn test_destination_without_fingerprints() {
    let fx = TestFixture::new();
    fx.write_source("a.jpg", "hello world");
    fs::write(fx.dst.path().join("holiday.jpg"), "unrelated").unwrap();

    let payload = run_json(&fx, &[]);
    assert_eq!(payload["copied"], 1);
}

// =============================================================================
// Duplicates within one run
// =============================================================================

/// The destination index is a snapshot taken before the run: identical new
/// files are all copied, onto the same name.
#[test]
fn test_duplicates_in_one_run_share_a_name() {
    let fx = TestFixture::new();
    fx.write_source("a.jpg", "hello world");
    fx.write_source("copy/of/a.jpg", "hello world");
    fx.write_source("b.jpg", "hello world");

    let payload = run_json(&fx, &["--worker", "2"]);
    assert_eq!(payload["copied"], 3);
    assert_eq!(payload["ignored"], 0);

    let files = fx.dest_files();
    assert_eq!(
        files,
        vec![
            format!("{HELLO_SHORT}.jpg"),
            format!("copy/of/{HELLO_SHORT}.jpg"),
        ]
    );
}

// =============================================================================
// Many files
// =============================================================================

#[test]
fn test_many_files_partition() {
    let fx = TestFixture::new();
    fx.create_images(200);
    // 100 more files duplicating every second image
    for i in (0..200).step_by(2) {
        fx.write_source(&format!("dupe_{i:03}.jpg"), format!("image payload {i}"));
    }

    let payload = run_json(&fx, &["--worker", "8"]);
    let copied = payload["copied"].as_u64().unwrap();
    let ignored = payload["ignored"].as_u64().unwrap();
    let failed = payload["failed"].as_u64().unwrap();

    assert_eq!(copied + ignored + failed, 300);
    assert_eq!(failed, 0);
    assert_eq!(fx.dest_files().len(), 200);
}
