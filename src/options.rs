//! Configuration options for sanitize runs.
//!
//! This module provides [`SanitizeOptions`] for configuring the pipeline.
//!
//! # Example
//!
//! ```
//! use imgsan::SanitizeOptions;
//!
//! // Create options with builder pattern
//! let options = SanitizeOptions::default()
//!     .with_workers(8)
//!     .with_sample_limit(512 * 1024);
//! ```

use crate::digest::DEFAULT_CHUNK_SIZE;
use crate::log::{LogLevel, LogSink};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Callback invoked after each file finishes, with `(done, total)`.
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Options for a sanitize run.
///
/// Use [`Default::default()`] to get sensible defaults, then customize
/// using the builder methods.
///
/// # Default Values
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `workers` | 4 | Concurrent per-file workers |
/// | `sample_limit` | `None` | Hash whole files |
/// | `chunk_size` | 64 KiB | Digest read size |
/// | `preserve_timestamps` | `true` | Copy mtime/atime to the destination |
/// | `preserve_permissions` | `true` | Copy permission bits |
/// | `fsync` | `true` | Sync temp files before rename |
/// | `follow_symlinks` | `false` | Don't descend into symlinked directories |
#[derive(Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct SanitizeOptions {
    /// Number of worker threads (default: 4, at least 1)
    pub workers: usize,

    /// Hash only the first N bytes of every file (default: None = whole file)
    ///
    /// Faster on large files, at the price of treating files that share a
    /// prefix as duplicates.
    pub sample_limit: Option<u64>,

    /// Read size used by the digest engine (default: 64 KiB)
    pub chunk_size: usize,

    /// Whether to preserve file timestamps (default: true)
    ///
    /// The copy gets the source's mtime/atime, and the sanitizer keeps them
    /// when it rewrites the copy.
    pub preserve_timestamps: bool,

    /// Whether to preserve file permissions (default: true)
    pub preserve_permissions: bool,

    /// Whether to sync files to disk before renaming them into place (default: true)
    pub fsync: bool,

    /// Whether to descend into symlinked directories of the source (default: false)
    ///
    /// Symlinks to files are always collected.
    pub follow_symlinks: bool,

    /// Cancellation token for cooperative cancellation (optional)
    ///
    /// When set to `true`, no new file is started. Files already in
    /// flight finish, and the run returns
    /// [`Error::Cancelled`](crate::Error::Cancelled).
    pub cancel_token: Option<Arc<AtomicBool>>,

    /// Log sink (optional)
    ///
    /// If not set and `tracing` feature is enabled, messages are logged via tracing.
    /// Otherwise, messages are silently ignored.
    pub log_sink: Option<Arc<dyn LogSink>>,

    /// Progress callback (optional)
    pub progress: Option<ProgressCallback>,
}

impl fmt::Debug for SanitizeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SanitizeOptions")
            .field("workers", &self.workers)
            .field("sample_limit", &self.sample_limit)
            .field("chunk_size", &self.chunk_size)
            .field("preserve_timestamps", &self.preserve_timestamps)
            .field("preserve_permissions", &self.preserve_permissions)
            .field("fsync", &self.fsync)
            .field("follow_symlinks", &self.follow_symlinks)
            .field("cancel_token", &self.cancel_token)
            .field("log_sink", &self.log_sink.is_some())
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            workers: 4,
            sample_limit: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            preserve_timestamps: true,
            preserve_permissions: true,
            fsync: true,
            follow_symlinks: false,
            cancel_token: None,
            log_sink: None,
            progress: None,
        }
    }
}

impl SanitizeOptions {
    /// Set the number of worker threads
    ///
    /// Value is clamped to at least 1 to prevent panics.
    #[must_use]
    pub fn with_workers(mut self, n: usize) -> Self {
        self.workers = n.max(1);
        self
    }

    /// Hash only the first `limit` bytes of each file
    #[must_use]
    pub fn with_sample_limit(mut self, limit: u64) -> Self {
        self.sample_limit = Some(limit);
        self
    }

    /// Set the digest read chunk size
    ///
    /// Value is clamped to at least 1 byte.
    #[must_use]
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// Disable fsync for faster (but less durable) copies
    #[must_use]
    pub fn without_fsync(mut self) -> Self {
        self.fsync = false;
        self
    }

    /// Disable timestamp preservation
    #[must_use]
    pub fn without_timestamps(mut self) -> Self {
        self.preserve_timestamps = false;
        self
    }

    /// Disable permission preservation
    ///
    /// Copies then get the default umask permissions.
    #[must_use]
    pub fn without_permissions(mut self) -> Self {
        self.preserve_permissions = false;
        self
    }

    /// Follow symlinks while scanning the source tree
    #[must_use]
    pub fn with_follow_symlinks(mut self) -> Self {
        self.follow_symlinks = true;
        self
    }

    /// Set a cancellation token
    #[must_use]
    pub fn with_cancel_token(mut self, token: Arc<AtomicBool>) -> Self {
        self.cancel_token = Some(token);
        self
    }

    /// Set the log sink
    #[must_use]
    pub fn with_log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.log_sink = Some(sink);
        self
    }

    /// Set a progress callback
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Whether the cancellation token has been set.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token
            .as_ref()
            .is_some_and(|t| t.load(Ordering::Relaxed))
    }

    pub(crate) fn log(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        if let Some(sink) = &self.log_sink {
            sink.log(level, args);
        } else {
            #[cfg(feature = "tracing")]
            crate::log::TracingSink.log(level, args);
        }
    }

    pub(crate) fn report_progress(&self, done: u64, total: u64) {
        if let Some(callback) = &self.progress {
            callback(done, total);
        }
    }
}
