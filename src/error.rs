use std::path::PathBuf;

use thiserror::Error;

use crate::plate::WellId;

/// Errors that can occur while inspecting a TIFF file header.
///
/// These are produced by the cheap header/IFD inspector in [`crate::tiff`].
/// The lazy tile loader treats any of them as a signal to fall back to a
/// full decode, so they only reach callers when the fallback fails too.
#[derive(Debug, Clone, Error)]
pub enum TiffError {
    /// I/O error while reading the file
    #[error("I/O error reading {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// Invalid TIFF magic bytes (not II or MM)
    #[error("Invalid TIFF magic bytes: expected 0x4949 (II) or 0x4D4D (MM), got 0x{0:04X}")]
    InvalidMagic(u16),

    /// Invalid TIFF version number
    #[error("Invalid TIFF version: expected 42 (TIFF) or 43 (BigTIFF), got {0}")]
    InvalidVersion(u16),

    /// Invalid BigTIFF offset byte size (must be 8)
    #[error("Invalid BigTIFF offset byte size: expected 8, got {0}")]
    InvalidBigTiffOffsetSize(u16),

    /// File is too small to contain a valid TIFF header
    #[error("File too small: need at least {required} bytes, got {actual}")]
    FileTooSmall { required: u64, actual: u64 },

    /// Invalid IFD offset (points outside the file)
    #[error("Invalid IFD offset: {0}")]
    InvalidIfdOffset(u64),

    /// IFD declares an implausible number of entries
    #[error("Unreasonable IFD entry count: {0}")]
    InvalidEntryCount(u64),

    /// Required tag is missing from the first IFD
    #[error("Missing required tag: {0}")]
    MissingTag(&'static str),

    /// Tag has unexpected type or count
    #[error("Invalid tag value for {tag}: {message}")]
    InvalidTagValue { tag: &'static str, message: String },

    /// Pixel format not representable by [`crate::tiff::PixelType`]
    #[error("Unsupported pixel format: {bits}-bit, sample format {sample_format}")]
    UnsupportedPixelFormat { bits: u16, sample_format: u16 },
}

/// Errors raised while parsing an acquisition.
///
/// Every variant aborts the parse call that produced it; the only tolerated
/// irregularity is a layout well with no TIFF files, which the assembler
/// skips silently.
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// An expected file or directory is absent
    #[error("Missing input: {path} does not exist")]
    MissingInput { path: PathBuf },

    /// Several candidate channel metadata files where exactly one is required
    #[error("Found {count} channel metadata files in {dir}, expected exactly one")]
    AmbiguousInput { dir: PathBuf, count: usize },

    /// The same well id was derived twice from the layout table
    #[error("Duplicate well {well}: each well may appear only once in the cell line layout")]
    DuplicateWell { well: WellId },

    /// An input that must contain at least one element is empty
    #[error("Empty input: {reason}")]
    EmptyInput { reason: String },

    /// A plane file could not be opened or decoded
    #[error("Error decoding tiff file {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// The channel metadata document is not a flat key/value mapping
    #[error("Malformed channel metadata {path}: {message}")]
    ChannelMeta { path: PathBuf, message: String },

    /// The cell line layout table is malformed
    #[error("Malformed cell line layout {path}: {message}")]
    LayoutTable { path: PathBuf, message: String },

    /// I/O error outside of plane decoding
    #[error("I/O error on {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// Parse options failed validation
    #[error("Invalid options: {0}")]
    InvalidOptions(String),
}

impl ParseError {
    /// Build a [`ParseError::Decode`] naming the offending file.
    pub(crate) fn decode(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        ParseError::Decode {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Build a [`ParseError::Io`] naming the offending path.
    pub(crate) fn io(path: impl Into<PathBuf>, source: &std::io::Error) -> Self {
        ParseError::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }
}
