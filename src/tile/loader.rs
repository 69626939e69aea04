//! The TIFF-backed tile loader.
//!
//! Shape and dtype come from the first plane's TIFF header when possible;
//! if header inspection fails for any reason the loader falls back to fully
//! decoding that plane. `load` always decodes every plane, first page only,
//! and stacks them in path order.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use ndarray::Array5;
use tiff::decoder::{Decoder, DecodingResult};
use tracing::debug;

use crate::error::ParseError;
use crate::tiff::{inspect_plane, PixelType};

use super::{TileData, TileLoader, TileShape};

// =============================================================================
// TiffTileLoader
// =============================================================================

/// Loads one well's tile from an ordered list of single-plane TIFF files.
///
/// The path order fixes the plane-to-channel assignment: plane *i* lands in
/// channel slot *i*. The loader owns only the paths; every `load` call is a
/// fresh decode.
#[derive(Debug, Clone)]
pub struct TiffTileLoader {
    paths: Vec<PathBuf>,
}

impl TiffTileLoader {
    /// Create a loader over a non-empty ordered list of plane files.
    ///
    /// # Errors
    /// [`ParseError::EmptyInput`] if the list is empty.
    pub fn new(paths: Vec<PathBuf>) -> Result<Self, ParseError> {
        if paths.is_empty() {
            return Err(ParseError::EmptyInput {
                reason: "no tiff paths provided for tile loader".to_string(),
            });
        }
        Ok(TiffTileLoader { paths })
    }

    /// The plane files in channel order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Width, height and sample type of the first plane.
    ///
    /// Step one is header inspection; step two, on any inspection failure,
    /// is a full decode of the plane.
    fn first_plane_info(&self) -> Result<(u32, u32, PixelType), ParseError> {
        let first = &self.paths[0];
        match inspect_plane(first) {
            Ok(info) => Ok((info.width, info.height, info.pixel_type)),
            Err(err) => {
                debug!(
                    path = %first.display(),
                    error = %err,
                    "header inspection failed, falling back to full decode"
                );
                let plane = decode_plane(first)?;
                Ok((plane.width, plane.height, plane.buf.pixel_type()))
            }
        }
    }

    /// Decode all planes after the first, checking each against the tile's
    /// dimensions, and assemble the channel-stacked array.
    fn stack<T: Clone>(
        &self,
        first: Vec<T>,
        width: u32,
        height: u32,
        extract: impl Fn(PlaneBuf) -> Option<Vec<T>>,
    ) -> Result<Array5<T>, ParseError> {
        let (w, h, c) = (width as usize, height as usize, self.paths.len());

        let mut data = Vec::with_capacity(c * h * w);
        data.extend(first);

        for path in &self.paths[1..] {
            let plane = decode_plane(path)?;
            if plane.width != width || plane.height != height {
                return Err(ParseError::decode(
                    path,
                    format!(
                        "plane is {}x{}, expected {}x{} to match the tile",
                        plane.width, plane.height, width, height
                    ),
                ));
            }
            let buf = extract(plane.buf).ok_or_else(|| {
                ParseError::decode(path, "plane sample type differs from the first plane")
            })?;
            data.extend(buf);
        }

        Array5::from_shape_vec((1, c, 1, h, w), data)
            .map_err(|e| ParseError::decode(&self.paths[0], e))
    }
}

impl TileLoader for TiffTileLoader {
    fn shape(&self) -> Result<TileShape, ParseError> {
        let (width, height, _) = self.first_plane_info()?;
        Ok(TileShape {
            t: 1,
            c: self.paths.len(),
            z: 1,
            y: height as usize,
            x: width as usize,
        })
    }

    fn dtype(&self) -> Result<PixelType, ParseError> {
        self.first_plane_info().map(|(_, _, pixel_type)| pixel_type)
    }

    fn load(&self) -> Result<TileData, ParseError> {
        let first = decode_plane(&self.paths[0])?;
        let (width, height) = (first.width, first.height);

        match first.buf {
            PlaneBuf::U8(data) => {
                let stacked = self.stack(data, width, height, |buf| match buf {
                    PlaneBuf::U8(v) => Some(v),
                    _ => None,
                })?;
                Ok(TileData::U8(stacked))
            }
            PlaneBuf::U16(data) => {
                let stacked = self.stack(data, width, height, |buf| match buf {
                    PlaneBuf::U16(v) => Some(v),
                    _ => None,
                })?;
                Ok(TileData::U16(stacked))
            }
            PlaneBuf::U32(data) => {
                let stacked = self.stack(data, width, height, |buf| match buf {
                    PlaneBuf::U32(v) => Some(v),
                    _ => None,
                })?;
                Ok(TileData::U32(stacked))
            }
            PlaneBuf::F32(data) => {
                let stacked = self.stack(data, width, height, |buf| match buf {
                    PlaneBuf::F32(v) => Some(v),
                    _ => None,
                })?;
                Ok(TileData::F32(stacked))
            }
        }
    }
}

// =============================================================================
// Plane decoding
// =============================================================================

/// One decoded plane, row-major samples.
struct Plane {
    width: u32,
    height: u32,
    buf: PlaneBuf,
}

enum PlaneBuf {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    F32(Vec<f32>),
}

impl PlaneBuf {
    fn pixel_type(&self) -> PixelType {
        match self {
            PlaneBuf::U8(_) => PixelType::U8,
            PlaneBuf::U16(_) => PixelType::U16,
            PlaneBuf::U32(_) => PixelType::U32,
            PlaneBuf::F32(_) => PixelType::F32,
        }
    }

    fn len(&self) -> usize {
        match self {
            PlaneBuf::U8(v) => v.len(),
            PlaneBuf::U16(v) => v.len(),
            PlaneBuf::U32(v) => v.len(),
            PlaneBuf::F32(v) => v.len(),
        }
    }
}

/// Decode the first page of a single-plane TIFF file.
fn decode_plane(path: &Path) -> Result<Plane, ParseError> {
    let file = File::open(path).map_err(|e| ParseError::decode(path, e))?;
    let mut decoder =
        Decoder::new(BufReader::new(file)).map_err(|e| ParseError::decode(path, e))?;

    let (width, height) = decoder.dimensions().map_err(|e| ParseError::decode(path, e))?;
    let result = decoder.read_image().map_err(|e| ParseError::decode(path, e))?;

    let buf = match result {
        DecodingResult::U8(v) => PlaneBuf::U8(v),
        DecodingResult::U16(v) => PlaneBuf::U16(v),
        DecodingResult::U32(v) => PlaneBuf::U32(v),
        DecodingResult::F32(v) => PlaneBuf::F32(v),
        _ => {
            return Err(ParseError::decode(
                path,
                "unsupported sample type; expected uint8, uint16, uint32 or float32",
            ))
        }
    };

    let expected = width as usize * height as usize;
    if buf.len() != expected {
        return Err(ParseError::decode(
            path,
            format!(
                "plane has {} samples for {width}x{height} pixels; only single-sample grayscale planes are supported",
                buf.len()
            ),
        ));
    }

    Ok(Plane { width, height, buf })
}

// =============================================================================
// Tests
// =============================================================================
