//! Core copy operations.
//!
//! Every write goes through a temporary file in the target directory that is
//! renamed into place, so the destination never holds a partial image.

mod file;
mod utils;

pub use file::copy_image;
pub(crate) use file::write_atomic;
