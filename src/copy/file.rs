//! Single file copy and in-place rewrite.
//!
//! Both operations write a temporary file next to the target and rename it
//! into place, so a reader never sees a half-written image.

use crate::error::{Error, Result};
use crate::options::SanitizeOptions;
use std::fs::{self, File, Metadata};
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use super::utils::{copy_file_contents, preserve_timestamps};

/// Copy `src` to `dst`, replacing any file already at `dst`.
///
/// The parent directory of `dst` must exist. Permissions and timestamps
/// follow the source when the options ask for it.
///
/// # Returns
///
/// Number of bytes copied.
///
/// # Errors
///
/// Returns an error if:
/// - `dst` is a directory ([`Error::IsADirectory`]); it is never replaced
/// - IO operations fail ([`Error::Io`])
/// - Temp file creation fails ([`Error::TempFile`])
/// - Atomic rename fails ([`Error::Persist`])
pub fn copy_image(src: &Path, dst: &Path, options: &SanitizeOptions) -> Result<u64> {
    // Single stat call for all source checks
    let src_meta = fs::metadata(src)?;

    match fs::symlink_metadata(dst) {
        Ok(dst_meta) if dst_meta.is_dir() => {
            return Err(Error::IsADirectory(dst.to_path_buf()));
        }
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    let src_file = File::open(src)?;
    persist_via_temp(dst, &src_meta, options, |temp| {
        copy_file_contents(&src_file, temp, src_meta.len())
    })
}

/// Replace the contents of `path` with `bytes`, atomically.
///
/// `meta` is the metadata `path` had before the rewrite; its permissions
/// and timestamps are carried over.
pub(crate) fn write_atomic(
    path: &Path,
    bytes: &[u8],
    meta: &Metadata,
    options: &SanitizeOptions,
) -> Result<u64> {
    persist_via_temp(path, meta, options, |mut temp| {
        temp.write_all(bytes)?;
        Ok(bytes.len() as u64)
    })
}

fn persist_via_temp<F>(
    dst: &Path,
    meta: &Metadata,
    options: &SanitizeOptions,
    fill: F,
) -> Result<u64>
where
    F: FnOnce(&File) -> io::Result<u64>,
{
    let dst_parent = dst.parent().unwrap_or(Path::new("."));

    // Create temp file with appropriate permissions
    let temp_file = if options.preserve_permissions {
        // Default tempfile creation (0o600), source permissions are set later
        NamedTempFile::new_in(dst_parent).map_err(|e| Error::TempFile {
            path: dst_parent.to_path_buf(),
            source: e,
        })?
    } else {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tempfile::Builder::new()
                .permissions(fs::Permissions::from_mode(0o666))
                .tempfile_in(dst_parent)
                .map_err(|e| Error::TempFile {
                    path: dst_parent.to_path_buf(),
                    source: e,
                })?
        }
        #[cfg(not(unix))]
        {
            NamedTempFile::new_in(dst_parent).map_err(|e| Error::TempFile {
                path: dst_parent.to_path_buf(),
                source: e,
            })?
        }
    };

    let bytes = fill(temp_file.as_file())?;

    // Ensure data is on disk before rename
    if options.fsync {
        temp_file.as_file().sync_all()?;
    }

    if options.preserve_permissions {
        fs::set_permissions(temp_file.path(), meta.permissions())?;
    }

    // Replaces an existing file at dst; a leftover temp file is removed on drop
    temp_file.persist(dst).map_err(|e| Error::Persist {
        path: dst.to_path_buf(),
        source: e.error,
    })?;

    if options.preserve_timestamps {
        // Ignore timestamp errors - they're not critical
        let _ = preserve_timestamps(meta, dst);
    }

    Ok(bytes)
}

// =============================================================================
// Tests
// =============================================================================
