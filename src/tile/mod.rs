//! Lazy tile loading.
//!
//! A tile loader wraps the ordered plane files of one well and defers pixel
//! decoding until the downstream writer actually needs the data. Shape and
//! dtype are available cheaply beforehand so the assembler can plan geometry
//! for a whole plate without materializing a single pixel.

mod loader;

pub use loader::TiffTileLoader;

use ndarray::Array5;

use crate::error::ParseError;
use crate::tiff::PixelType;

// =============================================================================
// TileShape
// =============================================================================

/// Shape of a tile in (t, c, z, y, x) axis order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileShape {
    /// Time points (always 1 for this acquisition)
    pub t: usize,

    /// Channels, one per plane file
    pub c: usize,

    /// Z sections (always 1; planes are max-intensity projections)
    pub z: usize,

    /// Height in pixels
    pub y: usize,

    /// Width in pixels
    pub x: usize,
}

impl TileShape {
    /// The shape as a (t, c, z, y, x) tuple.
    pub fn as_tuple(&self) -> (usize, usize, usize, usize, usize) {
        (self.t, self.c, self.z, self.y, self.x)
    }
}

// =============================================================================
// TileData
// =============================================================================

/// A fully decoded tile: one 5-D array in (t, c, z, y, x) axis order.
///
/// The element type mirrors [`PixelType`]; all planes of a tile must share
/// it.
#[derive(Debug, Clone, PartialEq)]
pub enum TileData {
    U8(Array5<u8>),
    U16(Array5<u16>),
    U32(Array5<u32>),
    F32(Array5<f32>),
}

impl TileData {
    /// The array shape in (t, c, z, y, x) order.
    pub fn shape(&self) -> [usize; 5] {
        let shape = match self {
            TileData::U8(a) => a.shape(),
            TileData::U16(a) => a.shape(),
            TileData::U32(a) => a.shape(),
            TileData::F32(a) => a.shape(),
        };
        [shape[0], shape[1], shape[2], shape[3], shape[4]]
    }

    /// The element type of the array.
    pub fn pixel_type(&self) -> PixelType {
        match self {
            TileData::U8(_) => PixelType::U8,
            TileData::U16(_) => PixelType::U16,
            TileData::U32(_) => PixelType::U32,
            TileData::F32(_) => PixelType::F32,
        }
    }
}

// =============================================================================
// TileLoader
// =============================================================================

/// Lazy pixel source of a tile.
///
/// This is the seam the downstream pyramid writer consumes: `shape` and
/// `dtype` are cheap and may be called during planning, `load` performs a
/// fresh full decode on every call. Implementations hold no mutable state
/// and no decoded-data cache.
pub trait TileLoader: Send + Sync {
    /// Tile shape in (t, c, z, y, x) order, without decoding pixel data
    /// where possible.
    fn shape(&self) -> Result<TileShape, ParseError>;

    /// Element type of the tile, without decoding pixel data where possible.
    fn dtype(&self) -> Result<PixelType, ParseError>;

    /// Decode all planes and stack them into one 5-D array, plane *i* in
    /// channel slot *i*.
    fn load(&self) -> Result<TileData, ParseError>;
}
