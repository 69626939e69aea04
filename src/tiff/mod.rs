//! Cheap, decode-free inspection of single-plane TIFF files.
//!
//! The tile loader wants shape and dtype for geometry planning long before
//! any pixel data is needed, so this module parses just the file header and
//! the first IFD. Full pixel decoding is done elsewhere with the `tiff`
//! crate; if header inspection fails for any reason the loader falls back to
//! that path.

mod header;
mod ifd;

pub use header::{ByteOrder, TiffHeader, BIGTIFF_HEADER_SIZE, TIFF_HEADER_SIZE};
pub use ifd::{inspect_plane, PlaneInfo};

use std::fmt;

use serde::Serialize;

// =============================================================================
// PixelType
// =============================================================================

/// Numeric type of one image sample.
///
/// Covers the sample types the acquisition produces; everything else is
/// rejected as unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelType {
    U8,
    U16,
    U32,
    F32,
}

impl PixelType {
    /// Bits per sample.
    pub const fn bits(self) -> u16 {
        match self {
            PixelType::U8 => 8,
            PixelType::U16 => 16,
            PixelType::U32 | PixelType::F32 => 32,
        }
    }

    /// Map TIFF `BitsPerSample` and `SampleFormat` values to a pixel type.
    ///
    /// Sample format 1 is unsigned integer (the TIFF default), 3 is IEEE
    /// float. Returns `None` for combinations outside this enum.
    pub fn from_tiff(bits: u16, sample_format: u16) -> Option<Self> {
        match (bits, sample_format) {
            (8, 1) => Some(PixelType::U8),
            (16, 1) => Some(PixelType::U16),
            (32, 1) => Some(PixelType::U32),
            (32, 3) => Some(PixelType::F32),
            _ => None,
        }
    }

    /// The numpy-style dtype name, e.g. `"uint16"`.
    pub const fn name(self) -> &'static str {
        match self {
            PixelType::U8 => "uint8",
            PixelType::U16 => "uint16",
            PixelType::U32 => "uint32",
            PixelType::F32 => "float32",
        }
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Tests
// =============================================================================
