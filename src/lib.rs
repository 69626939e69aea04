//! # Drogon Converter
//!
//! Parser for Drogon high-content-screening acquisitions: a directory of
//! single-plane overview TIFF files plus a YAML channel map and a CSV cell
//! line plate layout.
//!
//! The parser reconciles those three loosely-coupled inputs into one
//! well-indexed structure: an ordered list of [`TiledImage`] records, each
//! carrying tile geometry, channel identities and a lazy pixel loader. That
//! list is the hand-off point to a downstream OME-Zarr pyramid writer, which
//! pulls pixel data through [`TileLoader::load`] only when it needs it.
//!
//! ## Architecture
//!
//! - [`meta`] - readers for the YAML channel map and the CSV cell line layout
//! - [`mod@tiff`] - decode-free TIFF header/IFD inspection for shape and dtype
//! - [`plate`] - well identifiers, TIFF discovery and the tiled-image model
//! - [`tile`] - the lazy tile loader and its decoded-array types
//! - [`parse`] - the acquisition assembler, the crate's entry point
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use drogon_converter::{parse_acquisition, ParseOptions};
//!
//! fn main() -> Result<(), drogon_converter::ParseError> {
//!     let options = ParseOptions::new("channels.yml").with_pixel_size_um(0.325);
//!     let images = parse_acquisition(
//!         Path::new("/data/plate1/acq0"),
//!         Path::new("/data/plate1/cell_lines.csv"),
//!         "plate1",
//!         0,
//!         &options,
//!     )?;
//!
//!     for image in &images {
//!         println!("{}: {} channels", image.name(), image.channel_names().len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod meta;
pub mod parse;
pub mod plate;
pub mod tiff;
pub mod tile;

// Re-export commonly used types
pub use error::{ParseError, TiffError};
pub use meta::{
    discover_channels_meta, find_channels_meta, load_cell_line_layout, ChannelEntry, ChannelMap,
    LayoutEntry, PlateLayout,
};
pub use parse::{
    parse_acquisition, parse_acquisitions, AcquisitionSource, ParseOptions,
    DEFAULT_PIXEL_SIZE_UM, TIFF_SUBDIR,
};
pub use plate::{
    find_tiff_files, PixelSize, PlatePathBuilder, Point, Tile, TiledImage, Vector, WellId,
};
pub use tiff::{inspect_plane, ByteOrder, PixelType, PlaneInfo, TiffHeader};
pub use tile::{TiffTileLoader, TileData, TileLoader, TileShape};
