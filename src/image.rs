//! Per-file record binding a source path to its digest.

use std::path::{Path, PathBuf};

/// Number of hex characters kept from a digest for file names and dedup.
pub const SHORT_DIGEST_LEN: usize = 12;

/// A source image and its content digest.
///
/// Created once per source file after hashing and dropped when the file is
/// done. Two records with the same [`short_digest`](Self::short_digest) are
/// duplicates, whatever their full digests say.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    path: PathBuf,
    digest: String,
}

impl ImageRecord {
    /// Bind `path` to its hex `digest`.
    pub fn new(path: impl Into<PathBuf>, digest: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            digest: digest.into(),
        }
    }

    /// Source path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full hex digest.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Base name of the source file.
    pub fn filename(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    /// Lower-cased extension with its leading dot, or `""` if none.
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_ascii_lowercase()))
            .unwrap_or_default()
    }

    /// First [`SHORT_DIGEST_LEN`] characters of the digest.
    pub fn short_digest(&self) -> &str {
        self.digest
            .get(..SHORT_DIGEST_LEN)
            .unwrap_or(&self.digest)
    }

    /// Destination leaf name: `{short_digest}{extension}`.
    pub fn target_name(&self) -> String {
        format!("{}{}", self.short_digest(), self.extension())
    }
}
