//! Low-level helpers for the copy and rewrite steps.

use filetime::{FileTime, set_file_times};
use std::fs::{File, Metadata};
use std::io::{self, BufReader, Read};
use std::path::Path;

// =============================================================================
// File content copying
// =============================================================================

/// Copy exactly `len` bytes (the size recorded when the source was opened).
///
/// Uses `copy_file_range(2)` on Linux and a buffered copy elsewhere, or
/// when the kernel refuses the range copy before any byte moved.
///
/// # Errors
///
/// [`io::ErrorKind::UnexpectedEof`] if the source ends early. A short copy
/// would leave a truncated image in the library.
pub(crate) fn copy_file_contents(src: &File, dst: &File, len: u64) -> io::Result<u64> {
    #[cfg(target_os = "linux")]
    let copied = range_copy(src, dst, len)?;
    #[cfg(not(target_os = "linux"))]
    let copied = buffered_copy(src, dst, len)?;

    if copied < len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("source ended after {copied} of {len} bytes"),
        ));
    }
    Ok(copied)
}

fn buffered_copy(src: &File, dst: &File, len: u64) -> io::Result<u64> {
    io::copy(&mut BufReader::new(src).take(len), &mut &*dst)
}

#[cfg(target_os = "linux")]
fn range_copy(src: &File, dst: &File, len: u64) -> io::Result<u64> {
    use std::os::unix::io::AsRawFd;

    // Photos fit in one call; the cap only bounds pathological inputs
    const MAX_CHUNK: u64 = 64 * 1024 * 1024;

    let mut copied: u64 = 0;
    while copied < len {
        let chunk = (len - copied).min(MAX_CHUNK) as usize;

        // SAFETY: both descriptors are open for the duration of the call and
        // null offsets use (and advance) the file positions
        let result = unsafe {
            libc::copy_file_range(
                src.as_raw_fd(),
                std::ptr::null_mut(),
                dst.as_raw_fd(),
                std::ptr::null_mut(),
                chunk,
                0,
            )
        };

        match result {
            n if n > 0 => copied += n as u64,
            0 => break,
            _ => {
                let err = io::Error::last_os_error();
                let unsupported = matches!(
                    err.raw_os_error(),
                    Some(libc::EXDEV | libc::ENOSYS | libc::EINVAL | libc::EOPNOTSUPP)
                );
                if copied == 0 && unsupported {
                    return buffered_copy(src, dst, len);
                }
                return Err(err);
            }
        }
    }

    Ok(copied)
}

// =============================================================================
// Metadata and timestamp utilities
// =============================================================================

/// Apply the mtime and atime recorded in `meta` to `dst`.
pub(crate) fn preserve_timestamps(meta: &Metadata, dst: &Path) -> io::Result<()> {
    let mtime = FileTime::from_last_modification_time(meta);
    let atime = FileTime::from_last_access_time(meta);
    set_file_times(dst, atime, mtime)
}
