//! Header-row location and header-to-field resolution
//!
//! Source workbooks have no fixed schema: the header row floats within the
//! first few rows and column names vary per facility. The header is located
//! by keyword scan, then each header cell is tested against prioritized
//! patterns per canonical field. Resolution happens once per sheet; row
//! processing only ever sees the resolved column map.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::reconcile::types::{Cell, RawSheet};

/// How many leading rows to scan for a header
pub const HEADER_SCAN_ROWS: usize = 10;

/// Canonical fields a header column can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Site,
    Indicator,
    Value,
    Period,
    OrgUnit,
}

impl Field {
    /// Positional fallback column for a field left unmapped by headers
    pub fn positional_column(self) -> usize {
        match self {
            Field::Site => 0,
            Field::Indicator => 1,
            Field::Value => 2,
            Field::Period => 3,
            Field::OrgUnit => 4,
        }
    }
}

/// Keywords that mark a row as a header row (case-insensitive substring)
static HEADER_KEYWORDS: &[&str] = &[
    "site",
    "facility",
    "clinic",
    "indicator",
    "data element",
    "value",
    "count",
    "total",
    "period",
    "month",
    "org unit",
    "orgunit",
];

/// Prioritized header patterns per field; first match wins per field
static FIELD_PATTERNS: Lazy<Vec<(Field, Vec<Regex>)>> = Lazy::new(|| {
    let rx = |s: &str| Regex::new(s).unwrap();
    vec![
        (
            Field::OrgUnit,
            vec![
                rx(r"(?i)org(ani[sz]ation)?[\s_-]?unit"),
                rx(r"(?i)^\s*ou\s*$"),
            ],
        ),
        (
            Field::Site,
            vec![
                rx(r"(?i)site[\s_-]?name"),
                rx(r"(?i)facility[\s_-]?name"),
                rx(r"(?i)^\s*site\s*$"),
                rx(r"(?i)facility"),
                rx(r"(?i)clinic"),
            ],
        ),
        (
            Field::Indicator,
            vec![
                rx(r"(?i)indicator"),
                rx(r"(?i)data[\s_-]?element"),
                rx(r"(?i)^\s*service\s*$"),
            ],
        ),
        (
            Field::Value,
            vec![
                rx(r"(?i)^\s*value\s*$"),
                rx(r"(?i)^\s*count\s*$"),
                rx(r"(?i)^\s*total\s*$"),
                rx(r"(?i)\bvalue\b"),
                rx(r"(?i)number|result"),
            ],
        ),
        (
            Field::Period,
            vec![
                rx(r"(?i)period"),
                rx(r"(?i)reporting[\s_-]?month"),
                rx(r"(?i)^\s*month\s*$"),
            ],
        ),
    ]
});

/// Resolved header layout for one sheet
#[derive(Debug, Clone)]
pub struct HeaderMap {
    /// Row index of the detected header (0-based)
    pub header_row: usize,
    /// Whether no header row was detected and row 0 was assumed
    pub degraded: bool,
    mapped: HashMap<Field, usize>,
    claimed: Vec<usize>,
}

impl HeaderMap {
    /// Column index for a field: the mapped column, or the positional
    /// fallback when that column is not already claimed by another field
    pub fn column(&self, field: Field) -> Option<usize> {
        if let Some(col) = self.mapped.get(&field) {
            return Some(*col);
        }
        let pos = field.positional_column();
        if self.claimed.contains(&pos) {
            None
        } else {
            Some(pos)
        }
    }

    /// Whether the field was resolved from an actual header cell
    pub fn is_mapped(&self, field: Field) -> bool {
        self.mapped.contains_key(&field)
    }
}

/// Locate the header row: first of the leading rows containing at least one
/// header keyword
pub fn locate_header_row(sheet: &RawSheet) -> Option<usize> {
    for (idx, row) in sheet.rows.iter().take(HEADER_SCAN_ROWS).enumerate() {
        let is_header = row.iter().any(|cell| {
            let text = cell.to_text().to_lowercase();
            !text.is_empty() && HEADER_KEYWORDS.iter().any(|kw| text.contains(kw))
        });
        if is_header {
            return Some(idx);
        }
    }
    None
}

/// Resolve header cells into a field→column map.
///
/// Per field the prioritized patterns are tried in order against every
/// header cell; the first (pattern, cell) hit wins. A column already
/// claimed by an earlier field is not reused.
pub fn resolve_headers(header_row: usize, headers: &[Cell], degraded: bool) -> HeaderMap {
    let texts: Vec<String> = headers.iter().map(|c| c.to_text()).collect();
    let mut mapped: HashMap<Field, usize> = HashMap::new();
    let mut claimed: Vec<usize> = Vec::new();

    for (field, patterns) in FIELD_PATTERNS.iter() {
        'field: for pattern in patterns {
            for (col, text) in texts.iter().enumerate() {
                if claimed.contains(&col) || text.trim().is_empty() {
                    continue;
                }
                if pattern.is_match(text) {
                    mapped.insert(*field, col);
                    claimed.push(col);
                    break 'field;
                }
            }
        }
    }

    HeaderMap {
        header_row,
        degraded,
        mapped,
        claimed,
    }
}

/// Locate and resolve in one step, falling back to row 0 when no header
/// row is found. Returns `None` only for sheets without any rows.
pub fn resolve_sheet_headers(sheet: &RawSheet) -> Option<HeaderMap> {
    if sheet.rows.is_empty() {
        return None;
    }
    match locate_header_row(sheet) {
        Some(row) => Some(resolve_headers(row, &sheet.rows[row], false)),
        None => Some(resolve_headers(0, &sheet.rows[0], true)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(rows: Vec<Vec<Cell>>) -> RawSheet {
        RawSheet {
            name: "Sheet1".into(),
            rows,
        }
    }

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|s| Cell::from(*s)).collect()
    }

    #[test]
    fn test_locate_header_row_offset() {
        let s = sheet(vec![
            row(&["Ministry of Health", "", ""]),
            row(&["Quarterly export", "", ""]),
            row(&["Facility Name", "Indicator", "Value"]),
            row(&["Kigali Clinic", "TX_NEW", "85"]),
        ]);
        assert_eq!(locate_header_row(&s), Some(2));
    }

    #[test]
    fn test_locate_header_row_none() {
        let s = sheet(vec![row(&["a", "b"]), row(&["c", "d"])]);
        assert_eq!(locate_header_row(&s), None);
    }

    #[test]
    fn test_resolve_headers_maps_fields() {
        let headers = row(&["Facility Name", "Data Element", "Count", "Reporting Month", "Org Unit"]);
        let map = resolve_headers(0, &headers, false);
        assert_eq!(map.column(Field::Site), Some(0));
        assert_eq!(map.column(Field::Indicator), Some(1));
        assert_eq!(map.column(Field::Value), Some(2));
        assert_eq!(map.column(Field::Period), Some(3));
        assert_eq!(map.column(Field::OrgUnit), Some(4));
        assert!(map.is_mapped(Field::Value));
    }

    #[test]
    fn test_resolve_headers_shuffled_columns() {
        let headers = row(&["Indicator", "Site", "Period", "Value"]);
        let map = resolve_headers(0, &headers, false);
        assert_eq!(map.column(Field::Indicator), Some(0));
        assert_eq!(map.column(Field::Site), Some(1));
        assert_eq!(map.column(Field::Period), Some(2));
        assert_eq!(map.column(Field::Value), Some(3));
    }

    #[test]
    fn test_resolve_headers_positional_fallback() {
        let headers = row(&["alpha", "beta", "gamma"]);
        let map = resolve_headers(0, &headers, true);
        assert!(!map.is_mapped(Field::Indicator));
        assert_eq!(map.column(Field::Site), Some(0));
        assert_eq!(map.column(Field::Indicator), Some(1));
        assert_eq!(map.column(Field::Value), Some(2));
    }

    #[test]
    fn test_org_unit_claimed_before_site() {
        // "Org Unit" must not be swallowed by a looser site pattern
        let headers = row(&["Org Unit", "Indicator", "Value"]);
        let map = resolve_headers(0, &headers, false);
        assert_eq!(map.column(Field::OrgUnit), Some(0));
        assert!(!map.is_mapped(Field::Site));
        // positional fallback for site would collide with the mapped org unit
        assert_eq!(map.column(Field::Site), None);
    }

    #[test]
    fn test_resolve_sheet_headers_degraded() {
        let s = sheet(vec![row(&["a", "b", "c"]), row(&["d", "e", "f"])]);
        let map = resolve_sheet_headers(&s).unwrap();
        assert!(map.degraded);
        assert_eq!(map.header_row, 0);
    }

    #[test]
    fn test_resolve_sheet_headers_empty_sheet() {
        let s = sheet(vec![]);
        assert!(resolve_sheet_headers(&s).is_none());
    }
}
