//! Core domain types for the reconciliation pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of the slug body in a synthesized org unit code
const ORG_UNIT_SLUG_LEN: usize = 16;

/// Namespace prefix for synthesized org unit codes
const ORG_UNIT_PREFIX: &str = "OU_";

/// A single spreadsheet cell after container decoding
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    /// String form of the cell, with whole floats rendered as integers
    /// (Excel stores most counts as floats)
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => {
                if n.fract() == 0.0 {
                    (*n as i64).to_string()
                } else {
                    n.to_string()
                }
            }
        }
    }

    /// True when the cell holds nothing usable (empty or blank text)
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

/// One sheet of a decoded workbook
#[derive(Debug, Clone)]
pub struct RawSheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

/// A decoded source workbook: ordered sheets of ordered rows.
/// Owned by the normalizer for the duration of one parse call.
#[derive(Debug, Clone)]
pub struct RawWorkbook {
    pub file_name: String,
    pub sheets: Vec<RawSheet>,
}

/// One normalized source row.
///
/// Invariants: `indicator` is non-empty and trimmed, `value` is finite.
/// Rows that cannot satisfy these become warnings, never records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalRecord {
    pub site: Option<String>,
    pub indicator: String,
    pub value: f64,
    pub period: String,
    pub org_unit: String,
    pub sheet_name: String,
    /// 1-based row index in the originating sheet
    pub row_index: usize,
}

/// A recoverable problem found while normalizing a source file
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub sheet: String,
    /// 1-based row index, when the warning concerns a specific row
    pub row: Option<usize>,
    pub message: String,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.row {
            Some(row) => write!(f, "sheet '{}' row {}: {}", self.sheet, row, self.message),
            None => write!(f, "sheet '{}': {}", self.sheet, self.message),
        }
    }
}

/// A source file as seen in a directory listing
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    pub name: String,
    pub size: i64,
    pub modified: DateTime<Utc>,
}

/// A previously seen source file, persisted across runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub name: String,
    pub size: i64,
    pub modified: DateTime<Utc>,
    pub last_processed_at: Option<DateTime<Utc>>,
}

/// Synthesize an org unit code from a site name.
///
/// Deterministic: non-alphanumeric characters become `_`, the result is
/// uppercased, truncated to a fixed length, and namespaced.
pub fn slugify_org_unit(site: &str) -> String {
    let slug: String = site
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .take(ORG_UNIT_SLUG_LEN)
        .collect();
    format!("{}{}", ORG_UNIT_PREFIX, slug)
}
