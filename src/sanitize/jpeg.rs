//! Minimal JPEG marker-segment parser and writer.
//!
//! Only the header (everything before the first SOS marker) is split into
//! segments. The entropy-coded scan and everything after it is kept as an
//! opaque tail and written back untouched.

use super::MetadataError;

pub(crate) const SOI: u8 = 0xD8;
pub(crate) const EOI: u8 = 0xD9;
pub(crate) const SOS: u8 = 0xDA;
pub(crate) const APP0: u8 = 0xE0;
pub(crate) const APP1: u8 = 0xE1;
pub(crate) const APP2: u8 = 0xE2;
pub(crate) const APP14: u8 = 0xEE;
pub(crate) const COM: u8 = 0xFE;

/// Largest payload a length-prefixed segment can carry.
pub(crate) const MAX_PAYLOAD: usize = u16::MAX as usize - 2;

/// One header segment. `payload` excludes the marker and length bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Segment<'a> {
    pub marker: u8,
    pub payload: &'a [u8],
}

impl Segment<'_> {
    pub(crate) fn is_app(&self) -> bool {
        (APP0..=0xEF).contains(&self.marker)
    }
}

/// A JPEG split into header segments and the scan tail.
#[derive(Debug)]
pub(crate) struct Layout<'a> {
    pub segments: Vec<Segment<'a>>,
    /// Bytes from the SOS marker to the end of the file
    pub tail: &'a [u8],
}

/// Markers that carry no length field.
fn is_standalone(marker: u8) -> bool {
    marker == 0x01 || (0xD0..=0xD7).contains(&marker)
}

/// Whether `bytes` starts with the SOI marker.
pub(crate) fn is_jpeg(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] == SOI
}

/// Split a JPEG into header segments and the scan tail.
///
/// The caller checks [`is_jpeg`] first.
pub(crate) fn parse(bytes: &[u8]) -> Result<Layout<'_>, MetadataError> {
    let mut segments = Vec::new();
    let mut pos = 2;

    loop {
        if pos >= bytes.len() {
            return Err(MetadataError::MissingScan);
        }
        if bytes[pos] != 0xFF {
            return Err(MetadataError::BadMarker {
                offset: pos,
                byte: bytes[pos],
            });
        }

        // Any number of 0xFF fill bytes may precede a marker
        while pos < bytes.len() && bytes[pos] == 0xFF {
            pos += 1;
        }
        let Some(&marker) = bytes.get(pos) else {
            return Err(MetadataError::Truncated { offset: pos });
        };
        let marker_start = pos - 1;
        pos += 1;

        match marker {
            SOS => {
                return Ok(Layout {
                    segments,
                    tail: &bytes[marker_start..],
                });
            }
            EOI => return Err(MetadataError::MissingScan),
            m if is_standalone(m) => {
                segments.push(Segment {
                    marker: m,
                    payload: &[],
                });
                continue;
            }
            _ => {}
        }

        let Some(len_bytes) = bytes.get(pos..pos + 2) else {
            return Err(MetadataError::Truncated { offset: pos });
        };
        let length = u16::from_be_bytes([len_bytes[0], len_bytes[1]]);
        if length < 2 {
            return Err(MetadataError::BadLength {
                offset: pos,
                length,
            });
        }
        let end = pos + usize::from(length);
        let Some(payload) = bytes.get(pos + 2..end) else {
            return Err(MetadataError::Truncated { offset: pos });
        };

        segments.push(Segment { marker, payload });
        pos = end;
    }
}

/// Append one segment (marker, length, payload) to `out`.
pub(crate) fn write_segment(
    out: &mut Vec<u8>,
    marker: u8,
    payload: &[u8],
) -> Result<(), MetadataError> {
    out.push(0xFF);
    out.push(marker);
    if is_standalone(marker) {
        return Ok(());
    }
    if payload.len() > MAX_PAYLOAD {
        return Err(MetadataError::SegmentTooLarge(payload.len()));
    }
    // Fits: payload.len() + 2 <= u16::MAX
    let length = (payload.len() + 2) as u16;
    out.extend_from_slice(&length.to_be_bytes());
    out.extend_from_slice(payload);
    Ok(())
}
