//! # imgsan
//!
//! Parallel import of JPEG images into a deduplicated, metadata-clean library.
//!
//! ## Core Features
//!
//! - **Content dedup**: SHA-1 of every image (optionally of a prefix only),
//!   with the first 12 hex characters used as the file name and dedup key
//! - **Stateless reruns**: fingerprints already imported are recovered by
//!   scanning the destination file names, so a second run copies nothing new
//! - **Parallel processing**: a dedicated rayon pool of a fixed worker count
//! - **Failure isolation**: a broken file is logged and counted, never fatal
//! - **Atomic writes**: copies and rewrites go through temp file + rename
//! - **Metadata stripping**: every EXIF tag except Orientation is dropped,
//!   ICC colour profiles are kept, comments and XMP are removed
//!
//! ## Quick Start with Builder API
//!
//! ```no_run
//! use imgsan::SanitizeBuilder;
//!
//! let report = SanitizeBuilder::new("camera", "library").workers(8).run()?;
//! println!(
//!     "Copied {}, ignored {}, failed {}",
//!     report.copied, report.ignored, report.failed
//! );
//! # Ok::<(), imgsan::Error>(())
//! ```
//!
//! ## Function API
//!
//! ```no_run
//! use imgsan::{SanitizeOptions, run};
//! use std::path::Path;
//!
//! let options = SanitizeOptions::default()
//!     .with_workers(4)
//!     .with_sample_limit(1024 * 1024)
//!     .without_fsync();
//!
//! let report = run(Path::new("camera"), Path::new("library"), &options)?;
//! # Ok::<(), imgsan::Error>(())
//! ```
//!
//! ## Destination Layout
//!
//! `camera/2023/IMG_0001.JPG` lands at `library/2023/<short digest>.jpg`:
//! intermediate directories are mirrored and the extension is lower-cased.
//!
//! ## Known Limitation
//!
//! The destination index is built once before any worker starts. Two new
//! images with the same short digest in one run are both copied to the same
//! name, the second replacing the first.
//!
//! ## Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `progress` | Progress bar support with indicatif |
//! | `tracing` | Default log sink backed by the tracing crate |
//! | `serde` | Serialize/Deserialize for [`Report`] |
//! | `full` | Enable all optional features |

#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod copy;
pub mod digest;
mod error;
mod image;
pub mod index;
mod log;
mod options;
mod pipeline;
mod report;
pub mod sanitize;
mod scan;

#[cfg(feature = "progress")]
mod progress;

pub use builder::SanitizeBuilder;
pub use copy::copy_image;
pub use digest::{DEFAULT_CHUNK_SIZE, digest_file, digest_reader};
pub use error::{Error, Result};
pub use image::{ImageRecord, SHORT_DIGEST_LEN};
pub use index::{DestinationIndex, extract_fingerprint};
pub use log::{LogLevel, LogSink};
pub use options::{ProgressCallback, SanitizeOptions};
pub use pipeline::run;
pub use report::Report;
pub use sanitize::{MetadataError, SanitizeOutcome, sanitize_bytes, sanitize_file};
pub use scan::{collect_images, is_jpeg_path};

#[cfg(feature = "tracing")]
#[cfg_attr(docsrs, doc(cfg(feature = "tracing")))]
pub use log::TracingSink;

#[cfg(feature = "progress")]
#[cfg_attr(docsrs, doc(cfg(feature = "progress")))]
pub use progress::progress_callback;
