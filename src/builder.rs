//! Builder API for sanitize runs.
//!
//! The builder pattern provides a fluent interface for configuring and
//! executing a run. This is often more convenient than manually constructing
//! [`SanitizeOptions`].
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```no_run
//! use imgsan::SanitizeBuilder;
//!
//! // Four workers, whole-file hashing
//! let report = SanitizeBuilder::new("camera", "library").run()?;
//! println!("Copied {} images", report.copied);
//! # Ok::<(), imgsan::Error>(())
//! ```
//!
//! ## Large Imports
//!
//! ```no_run
//! use imgsan::SanitizeBuilder;
//!
//! let report = SanitizeBuilder::new("camera", "library")
//!     .workers(16)               // More concurrent files
//!     .sample_limit(512 * 1024)  // Hash the first 512 KiB only
//!     .no_fsync()                // Faster but less durable
//!     .run()?;
//! # Ok::<(), imgsan::Error>(())
//! ```

use crate::error::Result;
use crate::log::LogSink;
use crate::options::{ProgressCallback, SanitizeOptions};
use crate::pipeline;
use crate::report::Report;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// A builder for configuring and executing a sanitize run.
///
/// # Example
///
/// ```no_run
/// use imgsan::SanitizeBuilder;
///
/// let report = SanitizeBuilder::new("/media/sdcard/DCIM", "/srv/photos")
///     .workers(8)
///     .run()?;
/// # Ok::<(), imgsan::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct SanitizeBuilder {
    src: PathBuf,
    dst: PathBuf,
    options: SanitizeOptions,
}

impl SanitizeBuilder {
    /// Create a new `SanitizeBuilder` for the given source and destination roots.
    ///
    /// Uses default options (4 workers, whole-file hashing, preserve
    /// timestamps and permissions).
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> Self {
        Self {
            src: src.as_ref().to_path_buf(),
            dst: dst.as_ref().to_path_buf(),
            options: SanitizeOptions::default(),
        }
    }

    /// Set the number of concurrent workers.
    ///
    /// Default is 4. Values below 1 are raised to 1.
    #[must_use]
    pub fn workers(mut self, n: usize) -> Self {
        self.options = self.options.with_workers(n);
        self
    }

    /// Hash only the first `limit` bytes of each file.
    ///
    /// Files sharing that prefix are then treated as duplicates.
    #[must_use]
    pub fn sample_limit(mut self, limit: u64) -> Self {
        self.options = self.options.with_sample_limit(limit);
        self
    }

    /// Set the digest read chunk size.
    #[must_use]
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.options = self.options.with_chunk_size(size);
        self
    }

    /// Skip fsync before renaming files into place.
    #[must_use]
    pub fn no_fsync(mut self) -> Self {
        self.options = self.options.without_fsync();
        self
    }

    /// Don't carry source timestamps over to the copies.
    #[must_use]
    pub fn no_timestamps(mut self) -> Self {
        self.options = self.options.without_timestamps();
        self
    }

    /// Don't carry source permissions over to the copies.
    #[must_use]
    pub fn no_permissions(mut self) -> Self {
        self.options = self.options.without_permissions();
        self
    }

    /// Follow symlinks while scanning the source.
    #[must_use]
    pub fn follow_symlinks(mut self) -> Self {
        self.options = self.options.with_follow_symlinks();
        self
    }

    /// Set a cancellation token for cooperative cancellation.
    ///
    /// When the token is set to `true`, files that have not started yet are
    /// skipped and the run returns [`Error::Cancelled`](crate::Error::Cancelled)
    /// with the counts accumulated so far.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use imgsan::SanitizeBuilder;
    /// use std::sync::Arc;
    /// use std::sync::atomic::AtomicBool;
    ///
    /// let cancel = Arc::new(AtomicBool::new(false));
    /// // Pass a clone to a signal handler
    /// let result = SanitizeBuilder::new("camera", "library")
    ///     .cancel_token(cancel)
    ///     .run();
    /// ```
    #[must_use]
    pub fn cancel_token(mut self, token: Arc<AtomicBool>) -> Self {
        self.options = self.options.with_cancel_token(token);
        self
    }

    /// Send log messages to `sink` instead of the default.
    #[must_use]
    pub fn log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.options = self.options.with_log_sink(sink);
        self
    }

    /// Call `callback` with `(done, total)` after every finished file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use imgsan::SanitizeBuilder;
    /// use std::sync::Arc;
    ///
    /// let report = SanitizeBuilder::new("camera", "library")
    ///     .on_progress(Arc::new(|done, total| eprintln!("{done}/{total}")))
    ///     .run()?;
    /// # Ok::<(), imgsan::Error>(())
    /// ```
    #[must_use]
    pub fn on_progress(mut self, callback: ProgressCallback) -> Self {
        self.options = self.options.with_progress(callback);
        self
    }

    /// Get a reference to the current options.
    pub fn options(&self) -> &SanitizeOptions {
        &self.options
    }

    /// Execute the run.
    ///
    /// # Errors
    ///
    /// See [`run`](crate::run): setup failures and cancellation are
    /// errors; per-file failures are counted in the returned [`Report`].
    pub fn run(self) -> Result<Report> {
        pipeline::run(&self.src, &self.dst, &self.options)
    }
}
