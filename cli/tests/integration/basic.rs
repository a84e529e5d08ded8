//! Basic functionality integration tests for the imgsan CLI.

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::{HELLO_SHORT, TestFixture, contains_bytes, jpeg_with_metadata};
use predicates::prelude::*;
use std::fs;

#[test]
fn test_basic_copy() {
    let fx = TestFixture::new();
    fx.write_source("a.jpg", "hello world");

    let mut cmd = cargo_bin_cmd!("imgsan");
    cmd.arg("sanitize")
        .arg(fx.src.path())
        .arg(fx.dst.path())
        .arg("--worker")
        .arg("1")
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied files"))
        .stdout(predicate::str::is_match(r"Copied files\s+\|\s+1 \|").unwrap())
        .stdout(predicate::str::is_match(r"Ignored files\s+\|\s+0 \|").unwrap())
        .stdout(predicate::str::is_match(r"Failed files\s+\|\s+0 \|").unwrap());

    assert_eq!(fx.dest_files(), vec![format!("{HELLO_SHORT}.jpg")]);
    assert_eq!(
        fs::read_to_string(fx.dst.path().join(format!("{HELLO_SHORT}.jpg"))).unwrap(),
        "hello world"
    );
}

#[test]
fn test_skip_existing_fingerprint() {
    let fx = TestFixture::new();
    fx.write_source("f1.jpg", "hello world");
    fx.write_source("f2.jpg", "a different picture");
    fs::write(fx.dst.path().join(format!("0001_{HELLO_SHORT}.jpg")), "old").unwrap();

    let mut cmd = cargo_bin_cmd!("imgsan");
    cmd.arg("sanitize")
        .arg(fx.src.path())
        .arg(fx.dst.path())
        .arg("-q")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"Copied files\s+\|\s+1 \|").unwrap())
        .stdout(predicate::str::is_match(r"Ignored files\s+\|\s+1 \|").unwrap());

    // Only the pre-existing file and the new one
    assert_eq!(fx.dest_files().len(), 2);
    assert!(!fx.dst.path().join(format!("{HELLO_SHORT}.jpg")).exists());
}

#[test]
fn test_second_run_copies_nothing() {
    let fx = TestFixture::new();
    fx.create_images(10);
    fx.write_source("nested/deeper/extra.jpeg", "nested image");

    cargo_bin_cmd!("imgsan")
        .arg("sanitize")
        .arg(fx.src.path())
        .arg(fx.dst.path())
        .arg("-q")
        .assert()
        .success();
    let after_first = fx.dest_files();
    assert_eq!(after_first.len(), 11);

    cargo_bin_cmd!("imgsan")
        .arg("sanitize")
        .arg(fx.src.path())
        .arg(fx.dst.path())
        .arg("-q")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"Copied files\s+\|\s+0 \|").unwrap())
        .stdout(predicate::str::is_match(r"Ignored files\s+\|\s+11 \|").unwrap());

    assert_eq!(fx.dest_files(), after_first);
}

#[test]
fn test_relative_directories_mirrored() {
    let fx = TestFixture::new();
    fx.write_source("2023/summer/IMG_0001.JPG", "hello world");

    cargo_bin_cmd!("imgsan")
        .arg("sanitize")
        .arg(fx.src.path())
        .arg(fx.dst.path().join("library"))
        .arg("-q")
        .assert()
        .success();

    assert!(
        fx.dst
            .path()
            .join(format!("library/2023/summer/{HELLO_SHORT}.jpg"))
            .is_file()
    );
}

#[test]
fn test_metadata_stripped() {
    let fx = TestFixture::new();
    let original = jpeg_with_metadata();
    let src_file = fx.write_source("camera.jpg", &original);

    cargo_bin_cmd!("imgsan")
        .arg("sanitize")
        .arg(fx.src.path())
        .arg(fx.dst.path())
        .arg("-q")
        .assert()
        .success();

    let files = fx.dest_files();
    assert_eq!(files.len(), 1);
    let copied = fs::read(fx.dst.path().join(&files[0])).unwrap();

    assert!(!contains_bytes(&copied, b"Canon"), "camera make must be removed");
    assert!(!contains_bytes(&copied, b"51.5N"), "comment must be removed");
    assert!(contains_bytes(&copied, b"ICC_PROFILE\0"), "colour profile must stay");
    assert!(contains_bytes(&copied, b"Exif\0\0"), "orientation must stay");
    // The scan data is carried over as is
    assert!(copied.ends_with(&[0x12, 0x34, 0xFF, 0x00, 0xFF, 0xD9]));
    // The source is never touched
    assert_eq!(fs::read(src_file).unwrap(), original);
}

#[test]
fn test_hash_sample_size() {
    let fx = TestFixture::new();
    fx.write_source("a.jpg", "hello world");

    // sha1("hello")
    cargo_bin_cmd!("imgsan")
        .arg("sanitize")
        .arg(fx.src.path())
        .arg(fx.dst.path())
        .arg("--hash-sample-size")
        .arg("5")
        .arg("-q")
        .assert()
        .success();

    assert_eq!(fx.dest_files(), vec!["aaf4c61ddcc5.jpg".to_string()]);
}

#[test]
fn test_non_image_files_ignored() {
    let fx = TestFixture::new();
    fx.write_source("notes.txt", "not an image");
    fx.write_source("raw.cr2", "raw data");

    cargo_bin_cmd!("imgsan")
        .arg("sanitize")
        .arg(fx.src.path())
        .arg(fx.dst.path())
        .arg("-q")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"Copied files\s+\|\s+0 \|").unwrap());

    assert!(fx.dest_files().is_empty());
}

#[test]
fn test_version_command() {
    cargo_bin_cmd!("imgsan")
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("imgsan "));
}

#[test]
fn test_debug_logs_digests() {
    let fx = TestFixture::new();
    fx.write_source("a.jpg", "hello world");

    cargo_bin_cmd!("imgsan")
        .env_remove("RUST_LOG")
        .arg("--debug")
        .arg("sanitize")
        .arg(fx.src.path())
        .arg(fx.dst.path())
        .arg("-q")
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed",
        ))
        .stderr(predicate::str::contains("Found 1 image(s) in source folder."));
}

#[test]
fn test_info_level_hides_digests() {
    let fx = TestFixture::new();
    fx.write_source("a.jpg", "hello world");

    cargo_bin_cmd!("imgsan")
        .env_remove("RUST_LOG")
        .arg("sanitize")
        .arg(fx.src.path())
        .arg(fx.dst.path())
        .arg("-q")
        .assert()
        .success()
        .stderr(predicate::str::contains("Processed:"))
        .stderr(predicate::str::contains("2aae6c35c94fcfb415dbe95f408b9ce91ee846ed").not());
}
