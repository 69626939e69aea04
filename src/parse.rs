//! Acquisition parsing: the entry point that joins channels, layout and
//! discovered TIFF files into per-well tiled images.
//!
//! The produced list is ordered by layout iteration order, not by TIFF
//! discovery order. Wells listed in the layout but absent from the TIFF
//! directory are expected for partial acquisitions and skipped silently;
//! every other irregularity aborts the parse.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ParseError;
use crate::meta::{find_channels_meta, load_cell_line_layout};
use crate::plate::{find_tiff_files, PixelSize, PlatePathBuilder, Point, Tile, TiledImage, Vector};
use crate::tile::{TiffTileLoader, TileLoader};

/// Subdirectory of the acquisition root holding the per-well
/// max-intensity-projection overview TIFF files.
pub const TIFF_SUBDIR: &str = "TIF_OVR_MIP";

/// Default physical pixel size of the overview images, in micrometers.
pub const DEFAULT_PIXEL_SIZE_UM: f64 = 0.325;

// =============================================================================
// ParseOptions
// =============================================================================

/// Knobs shared by every acquisition of a plate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Name of the channel metadata YAML file under the acquisition root
    pub channel_file: String,

    /// Physical pixel size in micrometers (must be positive)
    pub pixel_size_um: f64,

    /// Time point label recorded in each image's attributes
    pub time_point: u32,
}

impl ParseOptions {
    pub fn new(channel_file: impl Into<String>) -> Self {
        ParseOptions {
            channel_file: channel_file.into(),
            pixel_size_um: DEFAULT_PIXEL_SIZE_UM,
            time_point: 0,
        }
    }

    /// Override the pixel size.
    pub fn with_pixel_size_um(mut self, pixel_size_um: f64) -> Self {
        self.pixel_size_um = pixel_size_um;
        self
    }

    /// Override the time point label.
    pub fn with_time_point(mut self, time_point: u32) -> Self {
        self.time_point = time_point;
        self
    }

    /// Validate the options.
    pub fn validate(&self) -> Result<(), String> {
        if self.channel_file.is_empty() {
            return Err("channel_file must not be empty".to_string());
        }
        if !self.pixel_size_um.is_finite() || self.pixel_size_um <= 0.0 {
            return Err(format!(
                "pixel_size_um must be a positive number, got {}",
                self.pixel_size_um
            ));
        }
        Ok(())
    }
}

// =============================================================================
// parse_acquisition
// =============================================================================

/// Parse one acquisition into a list of per-well tiled images.
///
/// Reads the channel map first (a missing channel file fails before any TIFF
/// scanning), then groups the overview TIFF files under
/// [`TIFF_SUBDIR`], then reads the cell line layout. One image with exactly
/// one tile is emitted per layout well that has TIFF files.
///
/// # Arguments
/// * `acquisition_path` - Acquisition root directory
/// * `layout_csv` - Path to the cell line layout table
/// * `plate_name` - Plate name recorded in each image's path builder
/// * `acquisition_id` - Identifies this round of acquisition for the plate
/// * `options` - Shared parse options
///
/// # Errors
/// Any failure reading the three inputs, or deriving a well's tile shape,
/// aborts the whole call; no partial list is returned.
pub fn parse_acquisition(
    acquisition_path: &Path,
    layout_csv: &Path,
    plate_name: &str,
    acquisition_id: u32,
    options: &ParseOptions,
) -> Result<Vec<TiledImage>, ParseError> {
    options.validate().map_err(ParseError::InvalidOptions)?;
    if plate_name.is_empty() {
        return Err(ParseError::InvalidOptions(
            "plate_name must not be empty".to_string(),
        ));
    }

    let channels = find_channels_meta(acquisition_path, &options.channel_file)?;
    let tiff_files = find_tiff_files(&acquisition_path.join(TIFF_SUBDIR))?;
    let layout = load_cell_line_layout(layout_csv)?;

    let pixel_size_um = options.pixel_size_um;
    let mut tiled_images = Vec::new();

    for entry in layout.iter() {
        let Some(paths) = tiff_files.get(&entry.well) else {
            debug!(well = %entry.well, "no tiff files found for well, skipping");
            continue;
        };

        let loader = TiffTileLoader::new(paths.clone())?;
        let shape = loader.shape()?;

        let mut attributes = BTreeMap::new();
        attributes.insert("cell_line".to_string(), entry.cell_line.clone());
        attributes.insert("time_point".to_string(), options.time_point.to_string());

        let mut image = TiledImage::new(
            entry.well.as_str(),
            PlatePathBuilder {
                plate_name: plate_name.to_string(),
                row: entry.row.clone(),
                column: entry.well.column(),
                acquisition_id,
            },
            channels.names(),
            attributes,
        );

        image.add_tile(Tile::new(
            Point::ZERO,
            Vector {
                x: shape.x as f64 * pixel_size_um,
                y: shape.y as f64 * pixel_size_um,
                z: 1.0,
                c: shape.c,
                t: 1,
            },
            PixelSize::xy(pixel_size_um),
            Box::new(loader),
        ));
        tiled_images.push(image);
    }

    Ok(tiled_images)
}

// =============================================================================
// parse_acquisitions
// =============================================================================

/// One acquisition round of a plate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionSource {
    /// Acquisition root directory
    pub path: PathBuf,

    /// Plate name for the images of this acquisition
    pub plate_name: String,

    /// Identifies multiple rounds of acquisition for the same plate
    pub acquisition_id: u32,
}

/// Parse several acquisition rounds against one cell line layout.
///
/// Input paths are checked up front so a typo fails before any parsing
/// starts. The produced images are concatenated in source order.
pub fn parse_acquisitions(
    sources: &[AcquisitionSource],
    layout_csv: &Path,
    options: &ParseOptions,
) -> Result<Vec<TiledImage>, ParseError> {
    if !layout_csv.is_file() {
        return Err(ParseError::MissingInput {
            path: layout_csv.to_path_buf(),
        });
    }
    for source in sources {
        if !source.path.is_dir() {
            return Err(ParseError::MissingInput {
                path: source.path.clone(),
            });
        }
    }

    let mut tiled_images = Vec::new();
    for source in sources {
        let images = parse_acquisition(
            &source.path,
            layout_csv,
            &source.plate_name,
            source.acquisition_id,
            options,
        )?;
        tiled_images.extend(images);
    }

    info!("found {} tiled images", tiled_images.len());
    Ok(tiled_images)
}

// =============================================================================
// Tests
// =============================================================================
