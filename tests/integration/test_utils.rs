//! Test utilities for integration tests.
//!
//! Builders for synthetic acquisitions: a root directory with a channel
//! metadata YAML, a `TIF_OVR_MIP` subdirectory of encoded grayscale planes,
//! and a cell line layout CSV next to it.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tiff::encoder::{colortype, TiffEncoder};

use drogon_converter::TIFF_SUBDIR;

/// Install a test subscriber so `RUST_LOG=debug cargo test` shows the
/// parser's skip/fallback logs. Safe to call from multiple tests.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A synthetic acquisition rooted in a temp directory.
///
/// The temp directory is removed when the fixture is dropped.
pub struct AcquisitionFixture {
    dir: TempDir,
}

impl AcquisitionFixture {
    /// Create an empty acquisition root with a `TIF_OVR_MIP` subdirectory.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(TIFF_SUBDIR)).unwrap();
        AcquisitionFixture { dir }
    }

    /// The acquisition root directory.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// The overview TIFF directory.
    pub fn tiff_dir(&self) -> PathBuf {
        self.dir.path().join(TIFF_SUBDIR)
    }

    /// Write the channel metadata YAML under the acquisition root.
    pub fn write_channels(&self, file_name: &str, yaml: &str) {
        fs::write(self.root().join(file_name), yaml).unwrap();
    }

    /// Write the cell line layout CSV next to the acquisition root and
    /// return its path.
    pub fn write_layout(&self, csv: &str) -> PathBuf {
        let path = self.root().join("cell_lines.csv");
        fs::write(&path, csv).unwrap();
        path
    }

    /// Encode one 16-bit grayscale plane into the overview directory.
    pub fn write_plane(&self, name: &str, width: u32, height: u32, data: &[u16]) -> PathBuf {
        let path = self.tiff_dir().join(name);
        write_gray16(&path, width, height, data);
        path
    }
}

/// Encode a 16-bit grayscale TIFF at `path`.
pub fn write_gray16(path: &Path, width: u32, height: u32, data: &[u16]) {
    let mut encoder = TiffEncoder::new(File::create(path).unwrap()).unwrap();
    encoder
        .write_image::<colortype::Gray16>(width, height, data)
        .unwrap();
}

/// A deterministic test gradient: sample value `base + y * width + x`.
pub fn gradient(base: u16, width: u32, height: u32) -> Vec<u16> {
    (0..width * height).map(|i| base + i as u16).collect()
}
