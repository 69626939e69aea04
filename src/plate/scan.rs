//! Discovery and grouping of per-plane overview TIFF files.
//!
//! The acquisition writes one single-plane `.tif` file per well and channel
//! into a flat directory. Files are grouped by the well id encoded in their
//! name and sorted lexically within each group, which fixes the
//! plane-to-channel assignment: file naming must encode the intended channel
//! order lexically.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ParseError;
use crate::plate::WellId;

/// Scan a directory for `.tif` files and group them by well id.
///
/// Within each well the paths are sorted in ascending lexical order. Files
/// whose stem does not carry a well id in the second-to-last underscore token
/// are skipped with a debug log; a well with no files is simply absent from
/// the result.
///
/// # Errors
/// - [`ParseError::MissingInput`] if the directory does not exist
/// - [`ParseError::EmptyInput`] if the directory contains no `.tif` files
pub fn find_tiff_files(tiff_dir: &Path) -> Result<BTreeMap<WellId, Vec<PathBuf>>, ParseError> {
    if !tiff_dir.is_dir() {
        return Err(ParseError::MissingInput {
            path: tiff_dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(tiff_dir).map_err(|e| ParseError::io(tiff_dir, &e))?;

    let mut tiff_files = 0usize;
    let mut groups: BTreeMap<WellId, Vec<PathBuf>> = BTreeMap::new();

    for entry in entries {
        let entry = entry.map_err(|e| ParseError::io(tiff_dir, &e))?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("tif") {
            continue;
        }
        tiff_files += 1;

        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        match WellId::from_stem(stem) {
            Some(well) => groups.entry(well).or_default().push(path),
            None => {
                debug!(path = %path.display(), "tiff file name does not encode a well id, skipping");
            }
        }
    }

    if tiff_files == 0 {
        return Err(ParseError::EmptyInput {
            reason: format!("no tiff files found in {}", tiff_dir.display()),
        });
    }

    for paths in groups.values_mut() {
        paths.sort();
    }

    Ok(groups)
}

// =============================================================================
// Tests
// =============================================================================
