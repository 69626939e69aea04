//! Well identifiers and the filename convention that encodes them.
//!
//! A well id is the concatenation of a row label (one or more letters) and a
//! zero-padded column number, e.g. row `B` column `3` becomes `B03`. Columns
//! 10..=99 are naturally two digits and are not padded. Columns >= 100 fall
//! outside the fixed-width convention; they are rendered as-is (three digits)
//! and accepted on parse, since the acquisition format does not define them.
//!
//! Drogon names overview TIFF files `<prefix>_<WELL>_<index>.tif`, so the
//! well id is the second-to-last underscore-delimited token of the file stem.
//! [`WellId::from_stem`] makes that convention an explicit parse with a typed
//! "no match" outcome instead of silently producing a wrong id.

use std::fmt;

use serde::Serialize;

// =============================================================================
// WellId
// =============================================================================

/// A validated well identifier: row letters followed by at least two digits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct WellId {
    code: String,
    #[serde(skip)]
    digits_at: usize,
    #[serde(skip)]
    column: u32,
}

impl WellId {
    /// Build a well id from a row label and a numeric column index.
    ///
    /// Columns below 10 are zero-padded to two digits; larger columns are
    /// rendered as-is. Returns `None` if the row label is empty or contains
    /// non-alphabetic characters, or if the column is zero.
    pub fn new(row: &str, column: u32) -> Option<Self> {
        if row.is_empty() || !row.chars().all(|c| c.is_ascii_alphabetic()) || column == 0 {
            return None;
        }
        let code = format!("{row}{:02}", column);
        Some(WellId {
            digits_at: row.len(),
            code,
            column,
        })
    }

    /// Parse a well id from its string form, e.g. `"B03"`.
    ///
    /// The string must be one or more ASCII letters followed by two or more
    /// ASCII digits, with nothing else. Returns `None` otherwise.
    pub fn parse(code: &str) -> Option<Self> {
        let digits_at = code.chars().take_while(|c| c.is_ascii_alphabetic()).count();
        if digits_at == 0 || digits_at > code.len().saturating_sub(2) {
            return None;
        }
        let digits = &code[digits_at..];
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        // Reject columns that cannot be a plate index (all zeros or too wide).
        let column: u32 = digits.parse().ok()?;
        if column == 0 {
            return None;
        }
        Some(WellId {
            code: code.to_string(),
            digits_at,
            column,
        })
    }

    /// Extract the well id from a TIFF file stem.
    ///
    /// The well id is the second-to-last underscore-delimited token, so
    /// `"overview_mip_B03_1"` yields `B03`. Returns `None` when the stem has
    /// fewer than two tokens or the token is not a valid well id.
    pub fn from_stem(stem: &str) -> Option<Self> {
        let mut tokens = stem.rsplit('_');
        let _index = tokens.next()?;
        let candidate = tokens.next()?;
        WellId::parse(candidate)
    }

    /// The full code, e.g. `"B03"`.
    pub fn as_str(&self) -> &str {
        &self.code
    }

    /// The row label, e.g. `"B"`.
    pub fn row(&self) -> &str {
        &self.code[..self.digits_at]
    }

    /// The column code as written, e.g. `"03"`.
    pub fn column_code(&self) -> &str {
        &self.code[self.digits_at..]
    }

    /// The numeric column index, e.g. `3`.
    pub fn column(&self) -> u32 {
        self.column
    }
}

impl fmt::Display for WellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

impl AsRef<str> for WellId {
    fn as_ref(&self) -> &str {
        &self.code
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_pads_single_digit_columns() {
        let well = WellId::new("B", 3).unwrap();
        assert_eq!(well.as_str(), "B03");
        assert_eq!(well.row(), "B");
        assert_eq!(well.column_code(), "03");
        assert_eq!(well.column(), 3);
    }

    #[test]
    fn test_new_keeps_two_digit_columns() {
        let well = WellId::new("A", 12).unwrap();
        assert_eq!(well.as_str(), "A12");
        assert_eq!(well.column_code(), "12");
    }

    #[test]
    fn test_new_renders_three_digit_columns_as_is() {
        // Columns >= 100 are outside the fixed-width convention.
        let well = WellId::new("A", 100).unwrap();
        assert_eq!(well.as_str(), "A100");
        assert_eq!(well.column(), 100);
    }

    #[test]
    fn test_new_rejects_bad_rows() {
        assert!(WellId::new("", 3).is_none());
        assert!(WellId::new("B1", 3).is_none());
        assert!(WellId::new("Ü", 3).is_none());
        assert!(WellId::new("B", 0).is_none());
    }

    #[test]
    fn test_new_multi_letter_row() {
        let well = WellId::new("AA", 7).unwrap();
        assert_eq!(well.as_str(), "AA07");
        assert_eq!(well.row(), "AA");
    }

    #[test]
    fn test_parse_valid() {
        let well = WellId::parse("B03").unwrap();
        assert_eq!(well.row(), "B");
        assert_eq!(well.column(), 3);

        let well = WellId::parse("AB12").unwrap();
        assert_eq!(well.row(), "AB");
        assert_eq!(well.column(), 12);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(WellId::parse("").is_none());
        assert!(WellId::parse("B3").is_none()); // single digit
        assert!(WellId::parse("03").is_none()); // no row
        assert!(WellId::parse("B").is_none()); // no column
        assert!(WellId::parse("B03x").is_none()); // trailing junk
        assert!(WellId::parse("B0_3").is_none());
        assert!(WellId::parse("B00").is_none()); // column zero
    }

    #[test]
    fn test_from_stem_second_to_last_token() {
        let well = WellId::from_stem("plate1_mip_B03_1").unwrap();
        assert_eq!(well.as_str(), "B03");
    }

    #[test]
    fn test_from_stem_minimal() {
        let well = WellId::from_stem("A01_0").unwrap();
        assert_eq!(well.as_str(), "A01");
    }

    #[test]
    fn test_from_stem_no_match() {
        assert!(WellId::from_stem("B03").is_none()); // no index token
        assert!(WellId::from_stem("thumbnail").is_none());
        assert!(WellId::from_stem("x_notawell_1").is_none());
        assert!(WellId::from_stem("").is_none());
    }

    #[test]
    fn test_ordering_is_lexical_on_code() {
        let a01 = WellId::parse("A01").unwrap();
        let a02 = WellId::parse("A02").unwrap();
        let b01 = WellId::parse("B01").unwrap();
        assert!(a01 < a02);
        assert!(a02 < b01);
    }
}
