//! Cell line layout reading.
//!
//! The plate layout is a CSV table whose first column holds row labels and
//! whose remaining column headers are numeric column indices; each cell is
//! the cell line seeded in that well:
//!
//! ```csv
//! row,1,2
//! A,WT,KO
//! B,WT,WT
//! ```
//!
//! Wells are derived column-major (per column header, then per row), which
//! fixes the iteration order the assembler uses. Column indices below 10 are
//! zero-padded to two digits; indices >= 100 fall outside the fixed-width
//! convention and are rendered as-is.

use std::collections::HashMap;
use std::path::Path;

use crate::error::ParseError;
use crate::plate::WellId;

// =============================================================================
// PlateLayout
// =============================================================================

/// One well of the layout table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutEntry {
    /// Derived well id, e.g. `B03`
    pub well: WellId,

    /// Row label as written in the table, e.g. `"B"`
    pub row: String,

    /// Zero-padded column code, e.g. `"03"`
    pub column: String,

    /// Cell line label for this well
    pub cell_line: String,
}

/// The parsed layout table: insertion-ordered entries with O(1) well lookup.
#[derive(Debug, Clone, Default)]
pub struct PlateLayout {
    entries: Vec<LayoutEntry>,
    index: HashMap<WellId, usize>,
}

impl PlateLayout {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in derivation order (column-major over the table).
    pub fn iter(&self) -> impl Iterator<Item = &LayoutEntry> {
        self.entries.iter()
    }

    pub fn get(&self, well: &WellId) -> Option<&LayoutEntry> {
        self.index.get(well).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, well: &WellId) -> bool {
        self.index.contains_key(well)
    }

    fn insert(&mut self, entry: LayoutEntry) -> Result<(), ParseError> {
        if self.index.contains_key(&entry.well) {
            return Err(ParseError::DuplicateWell { well: entry.well });
        }
        self.index.insert(entry.well.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }
}

// =============================================================================
// Reader
// =============================================================================

/// Read the cell line layout table.
///
/// # Errors
/// - [`ParseError::MissingInput`] if the file does not exist
/// - [`ParseError::LayoutTable`] if the table is malformed (non-numeric
///   column headers, ragged rows, invalid row labels)
/// - [`ParseError::DuplicateWell`] if the same well id is derived twice,
///   e.g. from a repeated column header
pub fn load_cell_line_layout(csv_path: &Path) -> Result<PlateLayout, ParseError> {
    if !csv_path.is_file() {
        return Err(ParseError::MissingInput {
            path: csv_path.to_path_buf(),
        });
    }

    let malformed = |message: String| ParseError::LayoutTable {
        path: csv_path.to_path_buf(),
        message,
    };

    let mut reader = csv::Reader::from_path(csv_path)
        .map_err(|e| malformed(e.to_string()))?;

    // Headers after the first one are the numeric column indices.
    let headers = reader.headers().map_err(|e| malformed(e.to_string()))?;
    let mut columns: Vec<u32> = Vec::with_capacity(headers.len().saturating_sub(1));
    for header in headers.iter().skip(1) {
        let column = header
            .trim()
            .parse::<u32>()
            .map_err(|_| malformed(format!("column header {header:?} is not an integer")))?;
        columns.push(column);
    }

    let mut rows: Vec<(String, Vec<String>)> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| malformed(e.to_string()))?;
        let mut fields = record.iter();
        let row_label = fields
            .next()
            .ok_or_else(|| malformed("empty record".to_string()))?
            .trim()
            .to_string();
        let cells: Vec<String> = fields.map(|f| f.to_string()).collect();
        if cells.len() != columns.len() {
            return Err(malformed(format!(
                "row {row_label:?} has {} cells, expected {}",
                cells.len(),
                columns.len()
            )));
        }
        rows.push((row_label, cells));
    }

    let mut layout = PlateLayout::default();
    for (column_idx, &column) in columns.iter().enumerate() {
        for (row_label, cells) in &rows {
            let well = WellId::new(row_label, column).ok_or_else(|| {
                malformed(format!(
                    "row {row_label:?} and column {column} do not form a valid well id"
                ))
            })?;
            layout.insert(LayoutEntry {
                row: row_label.clone(),
                column: well.column_code().to_string(),
                cell_line: cells[column_idx].clone(),
                well,
            })?;
        }
    }

    Ok(layout)
}

// =============================================================================
// Tests
// =============================================================================
