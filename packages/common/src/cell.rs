use std::fmt;

use chrono::NaiveDateTime;

/// A single scalar value read from a spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Empty,
}

impl CellValue {
    /// Render the value the way it would appear when typed into a text cell.
    ///
    /// Numbers use the shortest representation that round-trips (`5`, `1200.5`),
    /// so whole-number phone numbers stored as numeric cells keep their digits.
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::DateTime(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
            Self::Empty => String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::Empty => true,
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// One decoded input row: `(header, value)` pairs in source column order.
///
/// Headers are kept exactly as they appeared in the file; normalization
/// happens later so the raw row stays a faithful picture of the input.
pub type RawRow = Vec<(String, CellValue)>;
