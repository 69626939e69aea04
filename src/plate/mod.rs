//! Plate-level types: well identifiers, TIFF discovery and the produced
//! tiled-image model.

mod image;
mod scan;
mod well;

pub use image::{PixelSize, PlatePathBuilder, Point, Tile, TiledImage, Vector};
pub use scan::find_tiff_files;
pub use well::WellId;
