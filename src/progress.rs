//! Progress reporting support (requires `progress` feature)

use crate::options::ProgressCallback;
use indicatif::ProgressBar;
use std::sync::Arc;

/// Wrap a progress bar into a [`ProgressCallback`].
///
/// The bar length is (re)set from the callback, so the bar can be created
/// before the source has been scanned.
#[must_use]
pub fn progress_callback(pb: ProgressBar) -> ProgressCallback {
    Arc::new(move |done, total| {
        if pb.length() != Some(total) {
            pb.set_length(total);
        }
        pb.set_position(done);
    })
}
