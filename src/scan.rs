//! Source tree traversal.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Whether `path` has a `.jpg` or `.jpeg` extension, in any case.
pub fn is_jpeg_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
}

/// Whether `entry` is a regular file, or a symlink resolving to one.
///
/// Dangling links and links to directories are rejected.
pub(crate) fn is_regular_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

/// Collect every JPEG regular file under `root`.
///
/// Entries are visited in file-name order, so repeated runs over the same
/// tree dispatch files in the same order. A symlink to a file is always
/// collected. Symlinked directories are only descended into when
/// `follow_symlinks` is set.
///
/// # Errors
///
/// - [`Error::SymlinkLoop`] if following symlinks leads back to an ancestor
/// - [`Error::Walk`] for any other traversal failure
pub fn collect_images(root: &Path, follow_symlinks: bool) -> Result<Vec<PathBuf>> {
    let walker = WalkDir::new(root)
        .follow_links(follow_symlinks)
        .sort_by_file_name();

    let mut images = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            if e.loop_ancestor().is_some() {
                Error::SymlinkLoop(e.path().unwrap_or(root).to_path_buf())
            } else {
                Error::Walk {
                    path: e.path().unwrap_or(root).to_path_buf(),
                    source: e,
                }
            }
        })?;

        if is_regular_file(&entry) && is_jpeg_path(entry.path()) {
            images.push(entry.into_path());
        }
    }

    Ok(images)
}
