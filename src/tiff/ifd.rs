//! First-IFD inspection of single-plane TIFF files.
//!
//! The tile loader only needs the pixel dimensions and the sample type of a
//! plane to plan geometry, so this module reads the file header and walks
//! the first IFD's tags without touching pixel data. Values stored behind an
//! offset (e.g. multi-sample `BitsPerSample`) are fetched with one extra
//! seek; everything else comes from the inline value field.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::TiffError;

use super::header::{TiffHeader, BIGTIFF_HEADER_SIZE};
use super::PixelType;

// =============================================================================
// Tags and field types
// =============================================================================

const TAG_IMAGE_WIDTH: u16 = 256;
const TAG_IMAGE_LENGTH: u16 = 257;
const TAG_BITS_PER_SAMPLE: u16 = 258;
const TAG_SAMPLE_FORMAT: u16 = 339;

/// SampleFormat value for unsigned integer samples (the TIFF default).
const SAMPLE_FORMAT_UINT: u16 = 1;

const FIELD_SHORT: u16 = 3;
const FIELD_LONG: u16 = 4;
const FIELD_LONG8: u16 = 16;

/// Upper bound on IFD entries; a larger count indicates a corrupt file.
const MAX_IFD_ENTRIES: u64 = 4096;

/// One raw IFD entry. The value field holds the inline bytes (classic TIFF
/// uses only the first 4).
#[derive(Debug, Clone, Copy)]
struct IfdEntry {
    tag: u16,
    field_type: u16,
    count: u64,
    value: [u8; 8],
}

// =============================================================================
// PlaneInfo
// =============================================================================

/// Shape and sample type of a single TIFF plane, read from its first IFD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneInfo {
    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Numeric type of one sample
    pub pixel_type: PixelType,
}

/// Inspect a TIFF file's first IFD without decoding pixel data.
///
/// # Errors
/// Any [`TiffError`]: unreadable file, invalid header, or a first IFD that
/// is missing `ImageWidth`, `ImageLength` or `BitsPerSample`, or that
/// declares a pixel format outside [`PixelType`].
pub fn inspect_plane(path: &Path) -> Result<PlaneInfo, TiffError> {
    let mut file = File::open(path).map_err(|e| io_error(path, &e))?;
    let file_size = file
        .metadata()
        .map_err(|e| io_error(path, &e))?
        .len();

    let mut header_bytes = [0u8; BIGTIFF_HEADER_SIZE];
    let header_len = (file_size as usize).min(BIGTIFF_HEADER_SIZE);
    file.read_exact(&mut header_bytes[..header_len])
        .map_err(|e| io_error(path, &e))?;
    let header = TiffHeader::parse(&header_bytes[..header_len], file_size)?;

    let mut inspector = Inspector { file, path, header };
    let entries = inspector.read_first_ifd()?;

    let width = inspector.require_dimension(&entries, TAG_IMAGE_WIDTH, "ImageWidth")?;
    let height = inspector.require_dimension(&entries, TAG_IMAGE_LENGTH, "ImageLength")?;

    let bits = match find_entry(&entries, TAG_BITS_PER_SAMPLE) {
        Some(entry) => inspector.read_scalar(entry, "BitsPerSample")?,
        None => return Err(TiffError::MissingTag("BitsPerSample")),
    };
    let sample_format = match find_entry(&entries, TAG_SAMPLE_FORMAT) {
        Some(entry) => inspector.read_scalar(entry, "SampleFormat")?,
        None => SAMPLE_FORMAT_UINT as u64,
    };

    let pixel_type = PixelType::from_tiff(bits as u16, sample_format as u16).ok_or(
        TiffError::UnsupportedPixelFormat {
            bits: bits as u16,
            sample_format: sample_format as u16,
        },
    )?;

    Ok(PlaneInfo {
        width,
        height,
        pixel_type,
    })
}

fn find_entry(entries: &[IfdEntry], tag: u16) -> Option<&IfdEntry> {
    entries.iter().find(|e| e.tag == tag)
}

fn io_error(path: &Path, source: &std::io::Error) -> TiffError {
    TiffError::Io {
        path: path.to_path_buf(),
        message: source.to_string(),
    }
}

// =============================================================================
// Inspector
// =============================================================================

/// Reads IFD structures from an open TIFF file, respecting its byte order
/// and format variant.
struct Inspector<'a> {
    file: File,
    path: &'a Path,
    header: TiffHeader,
}

impl Inspector<'_> {
    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), TiffError> {
        self.file
            .seek(SeekFrom::Start(offset))
            .and_then(|_| self.file.read_exact(buf))
            .map_err(|e| io_error(self.path, &e))
    }

    /// Read all entries of the first IFD.
    fn read_first_ifd(&mut self) -> Result<Vec<IfdEntry>, TiffError> {
        let header = self.header;
        let offset = header.first_ifd_offset;

        let mut count_bytes = [0u8; 8];
        let count_size = header.ifd_count_size();
        self.read_exact_at(offset, &mut count_bytes[..count_size])?;

        let entry_count = if header.is_bigtiff {
            header.byte_order.read_u64(&count_bytes)
        } else {
            header.byte_order.read_u16(&count_bytes) as u64
        };
        if entry_count > MAX_IFD_ENTRIES {
            return Err(TiffError::InvalidEntryCount(entry_count));
        }

        let entry_size = header.ifd_entry_size();
        let mut buf = vec![0u8; entry_count as usize * entry_size];
        self.read_exact_at(offset + count_size as u64, &mut buf)?;

        let mut entries = Vec::with_capacity(entry_count as usize);
        for chunk in buf.chunks_exact(entry_size) {
            entries.push(self.parse_entry(chunk));
        }
        Ok(entries)
    }

    fn parse_entry(&self, bytes: &[u8]) -> IfdEntry {
        let bo = self.header.byte_order;
        let tag = bo.read_u16(&bytes[0..2]);
        let field_type = bo.read_u16(&bytes[2..4]);

        let (count, value_bytes) = if self.header.is_bigtiff {
            (bo.read_u64(&bytes[4..12]), &bytes[12..20])
        } else {
            (bo.read_u32(&bytes[4..8]) as u64, &bytes[8..12])
        };

        let mut value = [0u8; 8];
        value[..value_bytes.len()].copy_from_slice(value_bytes);

        IfdEntry {
            tag,
            field_type,
            count,
            value,
        }
    }

    /// Read the first element of an integer-typed entry.
    ///
    /// Handles Short, Long and Long8 field types, inline or behind an
    /// offset. For multi-element values (e.g. per-sample `BitsPerSample`)
    /// only the first element is read.
    fn read_scalar(&mut self, entry: &IfdEntry, tag: &'static str) -> Result<u64, TiffError> {
        let elem_size = match entry.field_type {
            FIELD_SHORT => 2usize,
            FIELD_LONG => 4,
            FIELD_LONG8 => 8,
            other => {
                return Err(TiffError::InvalidTagValue {
                    tag,
                    message: format!("unsupported field type {other}"),
                })
            }
        };
        if entry.count == 0 {
            return Err(TiffError::InvalidTagValue {
                tag,
                message: "value count is zero".to_string(),
            });
        }

        let bo = self.header.byte_order;
        let total_size = elem_size as u64 * entry.count;
        let mut buf = [0u8; 8];

        if total_size <= self.header.value_offset_size() as u64 {
            buf[..elem_size].copy_from_slice(&entry.value[..elem_size]);
        } else {
            let offset = if self.header.is_bigtiff {
                bo.read_u64(&entry.value)
            } else {
                bo.read_u32(&entry.value[..4]) as u64
            };
            let mut elem = vec![0u8; elem_size];
            self.read_exact_at(offset, &mut elem)?;
            buf[..elem_size].copy_from_slice(&elem);
        }

        Ok(match elem_size {
            2 => bo.read_u16(&buf) as u64,
            4 => bo.read_u32(&buf) as u64,
            _ => bo.read_u64(&buf),
        })
    }

    /// Read a required dimension tag as a u32.
    fn require_dimension(
        &mut self,
        entries: &[IfdEntry],
        tag: u16,
        tag_name: &'static str,
    ) -> Result<u32, TiffError> {
        let entry = find_entry(entries, tag).ok_or(TiffError::MissingTag(tag_name))?;
        let value = self.read_scalar(entry, tag_name)?;
        u32::try_from(value).map_err(|_| TiffError::InvalidTagValue {
            tag: tag_name,
            message: format!("{value} does not fit in 32 bits"),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
