//! Metadata stripping.
//!
//! A copied JPEG keeps exactly two pieces of metadata: the EXIF orientation
//! tag and the ICC colour profile. Everything else stored in the header
//! (EXIF camera and GPS data, thumbnails, XMP, IPTC, comments, vendor
//! blocks) is dropped. Segments the decoder needs (JFIF, Adobe colour
//! transform, tables, frame headers) and the image data are kept as they are.
//!
//! The sanitizer reports through its return value only; counting the
//! failure is the pipeline's job.

pub(crate) mod jpeg;

use crate::copy::write_atomic;
use crate::error::{Error, Result};
use crate::options::SanitizeOptions;
use exif::experimental::Writer;
use exif::{Field, In, Reader, Tag, Value};
use std::fs;
use std::io::Cursor;
use std::path::Path;

use jpeg::{APP0, APP1, APP2, APP14, COM, Layout, Segment};

const EXIF_HEADER: &[u8] = b"Exif\0\0";
const ICC_HEADER: &[u8] = b"ICC_PROFILE\0";

/// Reasons a metadata container is rejected.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum MetadataError {
    /// A segment runs past the end of the file
    #[error("truncated segment at offset {offset}")]
    Truncated {
        /// Offset of the segment length field
        offset: usize,
    },

    /// Expected a marker, found something else
    #[error("expected marker at offset {offset}, found 0x{byte:02X}")]
    BadMarker {
        /// Offset of the unexpected byte
        offset: usize,
        /// The unexpected byte
        byte: u8,
    },

    /// Segment length smaller than its own length field
    #[error("invalid segment length {length} at offset {offset}")]
    BadLength {
        /// Offset of the segment length field
        offset: usize,
        /// The declared length
        length: u16,
    },

    /// No start-of-scan marker before end of data
    #[error("no image data (missing SOS marker)")]
    MissingScan,

    /// Rebuilt segment does not fit in a JPEG segment
    #[error("segment payload of {0} bytes is too large")]
    SegmentTooLarge(usize),

    /// EXIF block could not be decoded or encoded
    #[error("EXIF: {0}")]
    Exif(#[from] exif::Error),
}

/// What the sanitizer did to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizeOutcome {
    /// Metadata was rewritten
    Sanitized {
        /// Orientation carried over, if the original had one
        orientation: Option<u16>,
        /// ICC profile segments carried over
        icc_segments: usize,
        /// Header segments dropped
        removed_segments: usize,
    },
    /// The file does not start with a JPEG SOI marker, so there is no
    /// container to strip. The file is left as it is.
    NotJpeg,
}

/// Strip metadata from the JPEG at `path`, in place.
///
/// The rewrite goes through a temporary file in the same directory and an
/// atomic rename. Permissions and timestamps of the file are kept
/// (depending on `options`).
///
/// # Errors
///
/// - [`Error::Metadata`] if the JPEG header or its EXIF block is malformed
/// - [`Error::Io`], [`Error::TempFile`], [`Error::Persist`] on IO failures
pub fn sanitize_file(path: &Path, options: &SanitizeOptions) -> Result<SanitizeOutcome> {
    let meta = fs::metadata(path)?;
    let original = fs::read(path)?;

    let Some((cleaned, outcome)) =
        sanitize_bytes(&original).map_err(|source| Error::Metadata {
            path: path.to_path_buf(),
            source,
        })?
    else {
        return Ok(SanitizeOutcome::NotJpeg);
    };

    if cleaned != original {
        write_atomic(path, &cleaned, &meta, options)?;
    }

    Ok(outcome)
}

/// Rebuild a JPEG in memory with only the allowed metadata.
///
/// Returns `Ok(None)` when `bytes` is not a JPEG.
pub fn sanitize_bytes(
    bytes: &[u8],
) -> std::result::Result<Option<(Vec<u8>, SanitizeOutcome)>, MetadataError> {
    if !jpeg::is_jpeg(bytes) {
        return Ok(None);
    }

    let layout = jpeg::parse(bytes)?;
    let orientation = find_orientation(&layout)?;

    let mut out = Vec::with_capacity(bytes.len());
    out.extend_from_slice(&[0xFF, jpeg::SOI]);

    let mut icc_segments = 0;
    let mut removed_segments = 0;
    let mut exif_pending = orientation.map(build_exif).transpose()?;

    for segment in &layout.segments {
        // The new EXIF block goes right after the leading APP0 segments
        if segment.marker != APP0 {
            if let Some(exif) = exif_pending.take() {
                jpeg::write_segment(&mut out, APP1, &exif)?;
            }
        }

        match classify(segment) {
            Keep::Structural => jpeg::write_segment(&mut out, segment.marker, segment.payload)?,
            Keep::ColorProfile => {
                icc_segments += 1;
                jpeg::write_segment(&mut out, segment.marker, segment.payload)?;
            }
            Keep::Drop => removed_segments += 1,
        }
    }

    if let Some(exif) = exif_pending.take() {
        jpeg::write_segment(&mut out, APP1, &exif)?;
    }
    out.extend_from_slice(layout.tail);

    Ok(Some((
        out,
        SanitizeOutcome::Sanitized {
            orientation,
            icc_segments,
            removed_segments,
        },
    )))
}

enum Keep {
    Structural,
    ColorProfile,
    Drop,
}

fn classify(segment: &Segment<'_>) -> Keep {
    match segment.marker {
        APP0 | APP14 => Keep::Structural,
        APP2 if segment.payload.starts_with(ICC_HEADER) => Keep::ColorProfile,
        COM => Keep::Drop,
        _ if segment.is_app() => Keep::Drop,
        _ => Keep::Structural,
    }
}

/// Orientation from the first EXIF block, if any.
fn find_orientation(layout: &Layout<'_>) -> std::result::Result<Option<u16>, MetadataError> {
    let Some(tiff) = layout
        .segments
        .iter()
        .find(|s| s.marker == APP1 && s.payload.starts_with(EXIF_HEADER))
        .map(|s| &s.payload[EXIF_HEADER.len()..])
    else {
        return Ok(None);
    };

    let exif = Reader::new().read_raw(tiff.to_vec())?;
    Ok(exif
        .get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .and_then(|v| u16::try_from(v).ok())
        .filter(|&v| v != 0))
}

/// APP1 payload holding a single primary-IFD Orientation tag.
fn build_exif(orientation: u16) -> std::result::Result<Vec<u8>, MetadataError> {
    let field = Field {
        tag: Tag::Orientation,
        ifd_num: In::PRIMARY,
        value: Value::Short(vec![orientation]),
    };
    let mut writer = Writer::new();
    writer.push_field(&field);

    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false)?;

    let mut payload = EXIF_HEADER.to_vec();
    payload.extend_from_slice(&tiff.into_inner());
    Ok(payload)
}
