//! Run counters.

use std::time::Duration;

/// Final tally of a sanitize run.
///
/// Every dispatched file lands in exactly one counter, so
/// `copied + ignored + failed` equals the number of files processed.
///
/// # Example
///
/// ```no_run
/// use imgsan::SanitizeBuilder;
///
/// let report = SanitizeBuilder::new("camera", "library").run()?;
/// println!(
///     "{} copied, {} ignored, {} failed",
///     report.copied, report.ignored, report.failed
/// );
/// # Ok::<(), imgsan::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Report {
    /// Files copied into the destination and sanitized
    pub copied: u64,
    /// Files skipped because their fingerprint was already present
    pub ignored: u64,
    /// Files whose processing failed at any step
    pub failed: u64,
    /// Wall-clock duration of the run
    pub duration: Duration,
}

impl Report {
    /// Number of files accounted for.
    pub fn total(&self) -> u64 {
        self.copied + self.ignored + self.failed
    }

    /// Whether any file failed.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
