//! Content digests.
//!
//! Files are hashed with SHA-1 in fixed-size chunks so memory use does not
//! depend on file size. An optional sample limit stops reading after a byte
//! budget, in which case the digest covers only that prefix of the file.

use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Default read size for [`digest_file`]: 64 KiB.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Hash a file and return its lower-case hex SHA-1 digest.
///
/// # Arguments
///
/// * `path` - File to hash
/// * `chunk_size` - Bytes read per call, at least 1
/// * `sample_limit` - Stop after this many bytes (`None` = read to EOF)
///
/// # Errors
///
/// Returns the IO error if the file cannot be opened or read.
///
/// # Example
///
/// ```no_run
/// use imgsan::digest::{digest_file, DEFAULT_CHUNK_SIZE};
/// use std::path::Path;
///
/// let full = digest_file(Path::new("a.jpg"), DEFAULT_CHUNK_SIZE, None)?;
/// let prefix = digest_file(Path::new("a.jpg"), DEFAULT_CHUNK_SIZE, Some(512 * 1024))?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn digest_file(
    path: &Path,
    chunk_size: usize,
    sample_limit: Option<u64>,
) -> io::Result<String> {
    let file = File::open(path)?;
    digest_reader(file, chunk_size, sample_limit)
}

/// Hash everything `reader` yields, up to `sample_limit` bytes.
pub fn digest_reader<R: Read>(
    mut reader: R,
    chunk_size: usize,
    sample_limit: Option<u64>,
) -> io::Result<String> {
    let mut hasher = Sha1::new();
    let mut buffer = vec![0u8; chunk_size.max(1)];
    let mut remaining = sample_limit;

    loop {
        let want = match remaining {
            Some(0) => break,
            // Truncate the last read so the total hits the limit exactly
            Some(r) => buffer.len().min(usize::try_from(r).unwrap_or(usize::MAX)),
            None => buffer.len(),
        };

        let n = match reader.read(&mut buffer[..want]) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        hasher.update(&buffer[..n]);
        if let Some(r) = remaining.as_mut() {
            *r -= n as u64;
        }
    }

    Ok(format!("{:x}", hasher.finalize()))
}
