//! Fingerprints already present in the destination tree.
//!
//! The destination is the only state that survives between runs. File
//! names written by the pipeline start with a 12-hex short digest, so
//! scanning them once up front tells which images were already imported.

use crate::error::{Error, Result};
use crate::scan::is_regular_file;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;
use walkdir::WalkDir;

/// Optional `<digits>_` prefix, then the 12-hex fingerprint.
static FINGERPRINT: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"(?i)(?:^\d+_)?([0-9a-f]{12})").unwrap()
});

/// Extract the lower-cased fingerprint embedded in a file stem.
///
/// Returns `None` when the stem holds no run of 12 hex characters.
///
/// ```
/// use imgsan::index::extract_fingerprint;
///
/// assert_eq!(extract_fingerprint("2AAE6C35C94F"), Some("2aae6c35c94f".to_string()));
/// assert_eq!(extract_fingerprint("0042_2aae6c35c94f"), Some("2aae6c35c94f".to_string()));
/// assert_eq!(extract_fingerprint("holiday"), None);
/// ```
pub fn extract_fingerprint(stem: &str) -> Option<String> {
    FINGERPRINT
        .captures(stem)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
}

/// Set of short digests found in a destination tree.
///
/// Built once before any worker starts and only read afterwards. Files
/// copied during the run are not added, so two new files with the same
/// short digest can both be copied (the second overwrites the first).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationIndex {
    fingerprints: HashSet<String>,
}

impl DestinationIndex {
    /// Walk `root` recursively and collect the fingerprint of every regular file.
    ///
    /// Symlinks to files count like the files themselves; symlinked
    /// directories are not descended into.
    ///
    /// # Errors
    ///
    /// Any traversal error fails the whole build ([`Error::Walk`]): a
    /// partial index would let already-imported images be copied again.
    pub fn build(root: &Path) -> Result<Self> {
        let mut fingerprints = HashSet::new();

        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|e| Error::Walk {
                path: e.path().unwrap_or(root).to_path_buf(),
                source: e,
            })?;

            if !is_regular_file(&entry) {
                continue;
            }

            if let Some(fingerprint) = entry
                .path()
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(extract_fingerprint)
            {
                fingerprints.insert(fingerprint);
            }
        }

        Ok(Self { fingerprints })
    }

    /// Whether `short_digest` is already present (case-insensitive).
    pub fn contains(&self, short_digest: &str) -> bool {
        self.fingerprints
            .contains(short_digest.to_ascii_lowercase().as_str())
    }

    /// Number of distinct fingerprints.
    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    /// Whether no fingerprint was found.
    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }
}
