//! The scan, hash, dedupe, copy and sanitize run.
//!
//! A run has two phases:
//!
//! 1. Setup (sequential): validate the source, create the destination,
//!    collect the source images and index the fingerprints already present
//!    in the destination. Any failure here aborts the run.
//! 2. Dispatch (parallel): every image goes to one worker of a dedicated
//!    rayon pool. A worker turns its file into a [`FileOutcome`] and never
//!    lets an error escape. Outcomes are tallied into the [`Report`] once
//!    the pool has drained.

use crate::copy::copy_image;
use crate::digest::digest_file;
use crate::error::{Error, Result};
use crate::image::ImageRecord;
use crate::index::DestinationIndex;
use crate::log::LogLevel;
use crate::options::SanitizeOptions;
use crate::report::Report;
use crate::sanitize::{SanitizeOutcome, sanitize_file};
use crate::scan::collect_images;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Result of processing a single source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FileOutcome {
    /// Copied into the destination and sanitized
    Copied,
    /// Short digest already present in the destination
    Ignored,
    /// Some step failed; the error has been logged
    Failed,
    /// Cancellation was requested before the file was picked up
    NotStarted,
}

/// Run the pipeline from `source` into `dest`.
///
/// # Returns
///
/// The final [`Report`]. Per-file failures are counted in
/// [`Report::failed`] and do not make the run fail.
///
/// # Errors
///
/// Returns an error if:
/// - Source does not exist ([`Error::SourceNotFound`])
/// - Source is not a directory ([`Error::NotADirectory`])
/// - Destination cannot be created ([`Error::CreateDestination`])
/// - Either tree cannot be traversed ([`Error::Walk`], [`Error::SymlinkLoop`])
/// - The cancel token was set during the run ([`Error::Cancelled`])
///
/// # Example
///
/// ```no_run
/// use imgsan::{SanitizeOptions, run};
/// use std::path::Path;
///
/// let options = SanitizeOptions::default().with_workers(8);
/// let report = run(Path::new("camera"), Path::new("library"), &options)?;
/// assert_eq!(report.total(), report.copied + report.ignored + report.failed);
/// # Ok::<(), imgsan::Error>(())
/// ```
pub fn run(source: &Path, dest: &Path, options: &SanitizeOptions) -> Result<Report> {
    let start_time = Instant::now();

    if !source.exists() {
        return Err(Error::SourceNotFound(source.to_path_buf()));
    }
    if !source.is_dir() {
        return Err(Error::NotADirectory(source.to_path_buf()));
    }

    fs::create_dir_all(dest).map_err(|e| Error::CreateDestination {
        path: dest.to_path_buf(),
        source: e,
    })?;

    if let Some(limit) = options.sample_limit {
        options.log(
            LogLevel::Debug,
            format_args!("Hash sample size set to {limit} bytes"),
        );
    }

    options.log(
        LogLevel::Info,
        format_args!("Scanning source folder for images..."),
    );
    let images = collect_images(source, options.follow_symlinks)?;
    options.log(
        LogLevel::Info,
        format_args!("Found {} image(s) in source folder.", images.len()),
    );

    options.log(
        LogLevel::Info,
        format_args!("Scanning destination folder for existing files..."),
    );
    let index = DestinationIndex::build(dest)?;
    options.log(
        LogLevel::Info,
        format_args!("Found {} existing file(s) in destination.", index.len()),
    );

    let total = images.len() as u64;
    let done = AtomicU64::new(0);

    let process_all = |images: &[PathBuf]| -> Vec<FileOutcome> {
        images
            .par_iter()
            .map(|src| {
                // Check cancellation before starting each file
                if options.is_cancelled() {
                    return FileOutcome::NotStarted;
                }

                let outcome = match process_image(src, source, dest, &index, options) {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        options.log(
                            LogLevel::Error,
                            format_args!("Error on {} : {}", src.display(), e),
                        );
                        FileOutcome::Failed
                    }
                };

                let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                options.report_progress(finished, total);
                outcome
            })
            .collect()
    };

    let outcomes = if images.is_empty() {
        Vec::new()
    } else {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(options.workers.max(1))
            .build()
        {
            Ok(pool) => pool.install(|| process_all(&images)),
            Err(e) => {
                options.log(
                    LogLevel::Warn,
                    format_args!("Failed to create thread pool ({e}), using global pool"),
                );
                process_all(&images)
            }
        }
    };

    let mut report = Report::default();
    let mut not_started = 0u64;
    for outcome in outcomes {
        match outcome {
            FileOutcome::Copied => report.copied += 1,
            FileOutcome::Ignored => report.ignored += 1,
            FileOutcome::Failed => report.failed += 1,
            FileOutcome::NotStarted => not_started += 1,
        }
    }
    report.duration = start_time.elapsed();

    if not_started > 0 || options.is_cancelled() {
        return Err(Error::Cancelled {
            report,
            not_started,
        });
    }

    Ok(report)
}

/// Digest, dedupe, copy and sanitize one file.
fn process_image(
    src: &Path,
    source_root: &Path,
    dest_root: &Path,
    index: &DestinationIndex,
    options: &SanitizeOptions,
) -> Result<FileOutcome> {
    let digest = digest_file(src, options.chunk_size, options.sample_limit)?;
    let record = ImageRecord::new(src, digest);
    options.log(
        LogLevel::Debug,
        format_args!("SHA1 of {} : {}", src.display(), record.digest()),
    );

    if index.contains(record.short_digest()) {
        options.log(
            LogLevel::Debug,
            format_args!("Ignored (SHA1 exists): {}", src.display()),
        );
        return Ok(FileOutcome::Ignored);
    }

    let target = destination_path(&record, source_root, dest_root);
    if let Some(parent) = target.parent() {
        // Succeeds when another worker created it first
        fs::create_dir_all(parent)?;
    }

    copy_image(src, &target, options)?;

    // A failure here leaves the copy in place
    match sanitize_file(&target, options)? {
        SanitizeOutcome::NotJpeg => options.log(
            LogLevel::Warn,
            format_args!(
                "No JPEG header in {}, copied without sanitizing",
                src.display()
            ),
        ),
        SanitizeOutcome::Sanitized {
            orientation,
            icc_segments,
            removed_segments,
        } => options.log(
            LogLevel::Debug,
            format_args!(
                "Sanitized {}: orientation {:?}, {} ICC segment(s) kept, {} segment(s) removed",
                target.display(),
                orientation,
                icc_segments,
                removed_segments
            ),
        ),
    }

    options.log(
        LogLevel::Info,
        format_args!("Processed: {} -> {}", src.display(), target.display()),
    );
    Ok(FileOutcome::Copied)
}

/// `dest_root / <relative parent of src> / <short digest><ext>`.
fn destination_path(record: &ImageRecord, source_root: &Path, dest_root: &Path) -> PathBuf {
    let parent = record
        .path()
        .strip_prefix(source_root)
        .ok()
        .and_then(Path::parent)
        .unwrap_or(Path::new(""));
    dest_root.join(parent).join(record.target_name())
}

// =============================================================================
// Tests
// =============================================================================
