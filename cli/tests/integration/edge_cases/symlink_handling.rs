//! Symlink handling integration tests for the imgsan CLI.
//!
//! These tests verify proper handling of symbolic links in the source tree:
//! - Default behavior: symlinked files are imported, symlinked directories skipped
//! - -L/--follow-symlinks: symlinked directories are imported
//! - Symlink loop detection

#[cfg(unix)]
mod unix_tests {
    use crate::common::{HELLO_SHORT, TestFixture};
    use assert_cmd::cargo::cargo_bin_cmd;
    use predicates::prelude::*;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    /// Test that a symlinked image is imported without -L.
    #[test]
    fn test_symlinked_file_imported_by_default() {
        let fx = TestFixture::new();
        let outside = TempDir::new().unwrap();
        std::fs::write(outside.path().join("real.jpg"), "hello world").unwrap();
        fx.write_source("plain.jpg", "image payload 0");
        symlink(outside.path().join("real.jpg"), fx.src.path().join("link.jpg")).unwrap();

        cargo_bin_cmd!("imgsan")
            .arg("sanitize")
            .arg(fx.src.path())
            .arg(fx.dst.path())
            .arg("-q")
            .assert()
            .success()
            .stdout(predicate::str::is_match(r"Copied files\s+\|\s+2 \|").unwrap());

        let files = fx.dest_files();
        assert_eq!(files.len(), 2);
        assert!(files.contains(&format!("{HELLO_SHORT}.jpg")));
        // The copy is a regular file, not a link
        let copied = fx.dst.path().join(format!("{HELLO_SHORT}.jpg"));
        assert!(!copied.symlink_metadata().unwrap().file_type().is_symlink());
    }

    /// Test that a symlinked directory is not descended into without -L.
    #[test]
    fn test_symlinked_directory_skipped_by_default() {
        let fx = TestFixture::new();
        let outside = TempDir::new().unwrap();
        std::fs::create_dir(outside.path().join("album")).unwrap();
        std::fs::write(outside.path().join("album/real.jpg"), "hello world").unwrap();
        symlink(outside.path().join("album"), fx.src.path().join("linked")).unwrap();

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

    /// Test that -L/--follow-symlinks imports images under a symlinked directory.
    #[test]
    fn test_follow_symlinks_imports_target() {
        let fx = TestFixture::new();
        let outside = TempDir::new().unwrap();
        std::fs::create_dir(outside.path().join("album")).unwrap();
        std::fs::write(outside.path().join("album/real.jpg"), "hello world").unwrap();
        symlink(outside.path().join("album"), fx.src.path().join("linked")).unwrap();

        cargo_bin_cmd!("imgsan")
            .arg("sanitize")
            .arg(fx.src.path())
            .arg(fx.dst.path())
            .arg("-L")
            .arg("-q")
            .assert()
            .success();

        assert_eq!(fx.dest_files(), vec![format!("linked/{HELLO_SHORT}.jpg")]);
    }

    /// Test that a symlink loop is a setup error when following symlinks.
    #[test]
    fn test_symlink_loop_detected() {
        let fx = TestFixture::new();
        fx.write_source("sub/a.jpg", "hello world");
        symlink(fx.src.path(), fx.src.path().join("sub/loop")).unwrap();

        cargo_bin_cmd!("imgsan")
            .arg("sanitize")
            .arg(fx.src.path())
            .arg(fx.dst.path())
            .arg("--follow-symlinks")
            .arg("-q")
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Symlink loop"));

        assert!(fx.dest_files().is_empty());
    }
}
