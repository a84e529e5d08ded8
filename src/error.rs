//! Error types for imgsan.
//!
//! This module provides the [`Error`] enum containing all possible errors
//! that can occur during a sanitize run, and the [`Result`] type alias.
//!
//! # Error Categories
//!
//! | Category | Errors |
//! |----------|--------|
//! | Setup | [`Error::SourceNotFound`], [`Error::NotADirectory`], [`Error::CreateDestination`], [`Error::Walk`], [`Error::SymlinkLoop`] |
//! | Per-file IO | [`Error::Io`], [`Error::IsADirectory`], [`Error::TempFile`], [`Error::Persist`] |
//! | Per-file metadata | [`Error::Metadata`] |
//! | Control | [`Error::Cancelled`] |
//!
//! Setup errors abort a run before any file is dispatched. Per-file errors
//! never leave the worker that produced them: the pipeline logs them and
//! counts the file as failed.

use crate::report::Report;
use crate::sanitize::MetadataError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for imgsan operations.
///
/// This is a type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during a sanitize run.
///
/// All errors include relevant path information to aid debugging.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Source path does not exist
    #[error("Source path does not exist: {0}")]
    SourceNotFound(PathBuf),

    /// Source is not a directory
    #[error("Source is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Destination root could not be created
    #[error("Failed to create destination {path}: {source}")]
    CreateDestination {
        /// Destination root
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Directory traversal failed
    ///
    /// Raised for both the source scan and the destination index build.
    /// An incomplete destination index would let duplicates through, so
    /// this is always fatal.
    #[error("Failed to walk {path}: {source}")]
    Walk {
        /// Path being visited when the walk failed
        path: PathBuf,
        /// Underlying error
        source: walkdir::Error,
    },

    /// Symlink loop detected while following symlinks
    #[error("Symlink loop detected: {0}")]
    SymlinkLoop(PathBuf),

    /// Destination leaf is a directory; it is never replaced by a file
    #[error("Destination is a directory: {0}")]
    IsADirectory(PathBuf),

    /// Failed to create temporary file
    #[error("Failed to create temporary file in {path}: {source}")]
    TempFile {
        /// Directory where temp file creation was attempted
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Failed to persist temporary file
    #[error("Failed to persist temporary file to {path}: {source}")]
    Persist {
        /// Target path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Embedded metadata could not be parsed or rewritten
    #[error("Metadata error in {path}: {source}")]
    Metadata {
        /// File whose metadata was rejected
        path: PathBuf,
        /// Underlying error
        source: MetadataError,
    },

    /// Operation was cancelled via cancellation token
    ///
    /// Carries the counters accumulated before cancellation. Files that
    /// were already running finished normally and are part of `report`.
    #[error(
        "Operation cancelled ({} copied, {} ignored, {} failed, {not_started} not started)",
        report.copied,
        report.ignored,
        report.failed
    )]
    Cancelled {
        /// Counters for the files that were processed
        report: Report,
        /// Number of discovered files that were never started
        not_started: u64,
    },
}
