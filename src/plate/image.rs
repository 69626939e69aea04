//! The produced data model: tile geometry and per-well tiled images.
//!
//! These are the value types handed to the downstream OME-Zarr writer. They
//! are constructed fresh on each parse call and never mutated afterwards.
//! The writer consumes the geometry and pulls pixel data through the tile's
//! [`TileLoader`] when (and as often as) it needs it.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::tile::TileLoader;

// =============================================================================
// Geometry value types
// =============================================================================

/// A point in the 5-D (x, y, z, c, t) acquisition space.
///
/// Spatial coordinates are physical (micrometers); channel and time are
/// indices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub c: usize,
    pub t: usize,
}

impl Point {
    /// The origin, all five coordinates zero.
    pub const ZERO: Point = Point {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        c: 0,
        t: 0,
    };
}

/// The diagonal extent of a tile in the 5-D acquisition space.
///
/// `x` and `y` are physical widths (pixel count times pixel size in
/// micrometers); `z`, `c` and `t` are element counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub c: usize,
    pub t: usize,
}

/// Physical size of one pixel in micrometers, per axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelSize {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl PixelSize {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        PixelSize { x, y, z }
    }

    /// Isotropic XY pixel size with unit Z spacing.
    pub fn xy(size_um: f64) -> Self {
        PixelSize {
            x: size_um,
            y: size_um,
            z: 1.0,
        }
    }
}

// =============================================================================
// Tile
// =============================================================================

/// A rectangular image region with geometry and a lazy pixel source.
///
/// The loader is only invoked by the downstream writer; constructing a tile
/// performs no pixel I/O.
pub struct Tile {
    /// Top-left corner of the tile (the origin for single-tile wells)
    pub top_l: Point,

    /// Diagonal extent of the tile
    pub diag: Vector,

    /// Physical pixel size
    pub pixel_size: PixelSize,

    loader: Box<dyn TileLoader>,
}

impl Tile {
    pub fn new(top_l: Point, diag: Vector, pixel_size: PixelSize, loader: Box<dyn TileLoader>) -> Self {
        Tile {
            top_l,
            diag,
            pixel_size,
            loader,
        }
    }

    /// The lazy pixel source bound to this tile.
    pub fn loader(&self) -> &dyn TileLoader {
        self.loader.as_ref()
    }
}

impl fmt::Debug for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tile")
            .field("top_l", &self.top_l)
            .field("diag", &self.diag)
            .field("pixel_size", &self.pixel_size)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// PlatePathBuilder
// =============================================================================

/// The plate/row/column/acquisition coordinates of a well image.
///
/// The downstream writer uses these to derive the storage path of the image
/// inside the output plate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatePathBuilder {
    pub plate_name: String,
    pub row: String,
    pub column: u32,
    pub acquisition_id: u32,
}

impl PlatePathBuilder {
    /// Render the well path, e.g. `"plate1/B/3/0"`.
    pub fn well_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.plate_name, self.row, self.column, self.acquisition_id
        )
    }
}

// =============================================================================
// TiledImage
// =============================================================================

/// One well's acquired data: ordered channels, attributes and its tiles.
///
/// This parser always produces exactly one tile per image, covering the
/// well's combined overview at a fixed origin.
#[derive(Debug)]
pub struct TiledImage {
    name: String,
    path_builder: PlatePathBuilder,
    channel_names: Vec<String>,
    attributes: BTreeMap<String, String>,
    tiles: Vec<Tile>,
}

impl TiledImage {
    pub fn new(
        name: impl Into<String>,
        path_builder: PlatePathBuilder,
        channel_names: Vec<String>,
        attributes: BTreeMap<String, String>,
    ) -> Self {
        TiledImage {
            name: name.into(),
            path_builder,
            channel_names,
            attributes,
            tiles: Vec::new(),
        }
    }

    pub fn add_tile(&mut self, tile: Tile) {
        self.tiles.push(tile);
    }

    /// Stable image name (the well id).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path_builder(&self) -> &PlatePathBuilder {
        &self.path_builder
    }

    /// Channel names in acquisition order.
    pub fn channel_names(&self) -> &[String] {
        &self.channel_names
    }

    /// Free-form attributes, e.g. `cell_line` and `time_point`.
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }
}

// =============================================================================
// Tests
// =============================================================================
