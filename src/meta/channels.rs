//! Channel metadata reading.
//!
//! The acquisition carries a small YAML document mapping opaque channel keys
//! to display names, e.g.:
//!
//! ```yaml
//! ch1: DAPI
//! ch2: GFP
//! ```
//!
//! The document order of the values defines the channel ordering of every
//! tiled image in the plate. Duplicate channel names are passed through
//! unchanged; the acquisition software emits them for repeated stains.

use std::path::Path;

use serde_yaml::Value;

use crate::error::ParseError;

// =============================================================================
// ChannelMap
// =============================================================================

/// One channel key/name pair as read from the metadata document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEntry {
    /// Opaque channel key, e.g. `"ch1"`
    pub key: String,

    /// Display channel name, e.g. `"DAPI"`
    pub name: String,
}

/// Ordered channel key -> name mapping.
///
/// Iteration order is the document order of the YAML file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelMap {
    entries: Vec<ChannelEntry>,
}

impl ChannelMap {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChannelEntry> {
        self.entries.iter()
    }

    /// Look up a channel name by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.name.as_str())
    }

    /// Channel names in document order.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }
}

// =============================================================================
// Readers
// =============================================================================

/// Read the channel map from a named metadata file under the acquisition
/// root.
///
/// # Errors
/// - [`ParseError::MissingInput`] if the file does not exist
/// - [`ParseError::ChannelMeta`] if the document is not a flat mapping of
///   scalars
pub fn find_channels_meta(acquisition_path: &Path, file_name: &str) -> Result<ChannelMap, ParseError> {
    let yaml_path = acquisition_path.join(file_name);
    if !yaml_path.is_file() {
        return Err(ParseError::MissingInput { path: yaml_path });
    }
    read_channel_map(&yaml_path)
}

/// Discover the channel metadata file by extension instead of by name.
///
/// Stricter variant of [`find_channels_meta`]: the acquisition root must
/// contain exactly one `*.yml` or `*.yaml` file.
///
/// # Errors
/// - [`ParseError::MissingInput`] if no candidate file exists
/// - [`ParseError::AmbiguousInput`] if more than one candidate exists
pub fn discover_channels_meta(acquisition_path: &Path) -> Result<ChannelMap, ParseError> {
    let entries =
        std::fs::read_dir(acquisition_path).map_err(|e| ParseError::io(acquisition_path, &e))?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ParseError::io(acquisition_path, &e))?;
        let path = entry.path();
        match path.extension().and_then(|e| e.to_str()) {
            Some("yml") | Some("yaml") => candidates.push(path),
            _ => {}
        }
    }

    match candidates.len() {
        0 => Err(ParseError::MissingInput {
            path: acquisition_path.to_path_buf(),
        }),
        1 => read_channel_map(&candidates[0]),
        count => Err(ParseError::AmbiguousInput {
            dir: acquisition_path.to_path_buf(),
            count,
        }),
    }
}

fn read_channel_map(yaml_path: &Path) -> Result<ChannelMap, ParseError> {
    let text = std::fs::read_to_string(yaml_path).map_err(|e| ParseError::io(yaml_path, &e))?;

    let mapping: serde_yaml::Mapping =
        serde_yaml::from_str(&text).map_err(|e| ParseError::ChannelMeta {
            path: yaml_path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut entries = Vec::with_capacity(mapping.len());
    for (key, value) in &mapping {
        let key = scalar_to_string(key).ok_or_else(|| malformed(yaml_path, "key", key))?;
        let name = scalar_to_string(value).ok_or_else(|| malformed(yaml_path, "value", value))?;
        entries.push(ChannelEntry { key, name });
    }

    Ok(ChannelMap { entries })
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn malformed(path: &Path, kind: &str, value: &Value) -> ParseError {
    ParseError::ChannelMeta {
        path: path.to_path_buf(),
        message: format!("expected scalar {kind}, got {value:?}"),
    }
}

// =============================================================================
// Tests
// =============================================================================
