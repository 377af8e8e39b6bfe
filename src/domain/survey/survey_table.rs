// ============================================================
// SURVEY TABLE
// ============================================================
// Rectangular, text-only view of the first survey sheet

use serde::{Deserialize, Serialize};

/// Whether a cell counts as blank (empty or whitespace only)
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Spreadsheet column letter for a 0-based column index (0 -> A, 26 -> AA)
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// A survey sheet: one header row followed by data rows.
///
/// Every row is padded to the header width so positional lookups never
/// fall off the end. Cells keep their raw text; blankness is judged
/// on the trimmed value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveyTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl SurveyTable {
    /// Create a table, padding or widening so every row has the same width
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = rows
            .iter()
            .map(|r| r.len())
            .chain(std::iter::once(headers.len()))
            .max()
            .unwrap_or(0);

        let mut headers = headers;
        headers.resize(width, String::new());

        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        Self { headers, rows }
    }

    /// Convenience constructor for string slices (handy for fixtures)
    pub fn from_strs(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn header(&self, column: usize) -> Option<&str> {
        self.headers.get(column).map(String::as_str)
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
    }

    /// Index of the first header equal to `name` (ignoring surrounding whitespace)
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim();
        self.headers.iter().position(|h| h.trim() == wanted)
    }

    /// Index of the first header matching any of the aliases, alias order first
    pub fn find_column(&self, aliases: &[String]) -> Option<usize> {
        aliases.iter().find_map(|alias| self.column_index(alias))
    }

    /// Every cell of a column, top to bottom. Empty if the column does not exist.
    pub fn column(&self, column: usize) -> impl Iterator<Item = &str> {
        let present = column < self.width();
        self.rows
            .iter()
            .filter(move |_| present)
            .map(move |r| r[column].as_str())
    }

    /// Non-blank cells of a column in row order, duplicates kept
    pub fn non_blank_values(&self, column: usize) -> Vec<&str> {
        self.column(column).filter(|v| !is_blank(v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_padded_to_header_width() {
        let table = SurveyTable::from_strs(&["a", "b", "c"], &[&["1"], &["1", "2", "3"]]);
        assert_eq!(table.width(), 3);
        assert_eq!(table.cell(0, 2), Some(""));
        assert_eq!(table.cell(1, 2), Some("3"));
    }

    #[test]
    fn test_headers_widen_for_long_rows() {
        let table = SurveyTable::from_strs(&["a"], &[&["1", "2"]]);
        assert_eq!(table.width(), 2);
        assert_eq!(table.header(1), Some(""));
    }

    #[test]
    fn test_non_blank_values_skip_whitespace() {
        let table = SurveyTable::from_strs(&["kw"], &[&["x"], &["  "], &[""], &["y"], &["x"]]);
        assert_eq!(table.non_blank_values(0), vec!["x", "y", "x"]);
        assert!(table.non_blank_values(5).is_empty());
    }

    #[test]
    fn test_find_column_uses_alias_order() {
        let table = SurveyTable::from_strs(&["budget", "预算 "], &[]);
        let aliases = vec!["预算".to_string(), "budget".to_string()];
        assert_eq!(table.find_column(&aliases), Some(1));
    }

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(7), "H");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(51), "AZ");
        assert_eq!(column_letter(52), "BA");
    }
}
