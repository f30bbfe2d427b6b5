//! Workbook normalization: raw sheets to canonical records
//!
//! Malformed rows never fail a file; they become warnings and are excluded
//! from the record set. Only an unreadable container (handled by the
//! reader) is a hard error.

use crate::reconcile::excel::headers::{Field, HeaderMap, resolve_sheet_headers};
use crate::reconcile::excel::strategy::{SheetStrategy, select_strategy};
use crate::reconcile::types::{
    Cell, CanonicalRecord, RawSheet, RawWorkbook, ValidationWarning, slugify_org_unit,
};

static EMPTY_CELL: Cell = Cell::Empty;

/// Defaults applied when a source sheet omits a column entirely
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Reporting period used when no period column resolves
    pub default_period: String,
    /// Org unit used when neither an org unit column nor a site is present
    pub default_org_unit: String,
}

/// Output of normalizing one source file
#[derive(Debug, Clone)]
pub struct NormalizedFile {
    pub records: Vec<CanonicalRecord>,
    pub warnings: Vec<ValidationWarning>,
}

/// Normalize a decoded workbook into canonical records plus warnings.
///
/// The parsing strategy is selected from the file name; each sheet gets its
/// own header resolution. Sheets without rows yield nothing.
pub fn normalize(workbook: &RawWorkbook, options: &NormalizeOptions) -> NormalizedFile {
    let strategy = select_strategy(&workbook.file_name);
    let mut records = Vec::new();
    let mut warnings = Vec::new();

    for sheet in &workbook.sheets {
        normalize_sheet(sheet, strategy, options, &mut records, &mut warnings);
    }

    NormalizedFile { records, warnings }
}

fn normalize_sheet(
    sheet: &RawSheet,
    strategy: SheetStrategy,
    options: &NormalizeOptions,
    records: &mut Vec<CanonicalRecord>,
    warnings: &mut Vec<ValidationWarning>,
) {
    let headers = match resolve_sheet_headers(sheet) {
        Some(h) => h,
        None => return, // no rows at all
    };

    if headers.degraded {
        warnings.push(ValidationWarning {
            sheet: sheet.name.clone(),
            row: None,
            message: "no header row detected; assuming row 1".into(),
        });
    }

    for (idx, row) in sheet.rows.iter().enumerate().skip(headers.header_row + 1) {
        let row_index = idx + 1; // 1-based for traceability
        if row.iter().all(Cell::is_blank) {
            continue;
        }
        match extract_record(row, &headers, strategy, options, &sheet.name, row_index) {
            Ok(record) => records.push(record),
            Err(message) => warnings.push(ValidationWarning {
                sheet: sheet.name.clone(),
                row: Some(row_index),
                message,
            }),
        }
    }
}

fn extract_record(
    row: &[Cell],
    headers: &HeaderMap,
    strategy: SheetStrategy,
    options: &NormalizeOptions,
    sheet_name: &str,
    row_index: usize,
) -> Result<CanonicalRecord, String> {
    let indicator = field_cell(row, headers, Field::Indicator)
        .to_text()
        .trim()
        .to_string();
    if indicator.is_empty() {
        return Err("row skipped: blank indicator".into());
    }

    let site = {
        let text = field_cell(row, headers, Field::Site).to_text();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    };
    if strategy.requires_site && site.is_none() {
        return Err(format!("row skipped: blank site ({} layout)", strategy.name));
    }

    let value_cell = field_cell(row, headers, Field::Value);
    let value = coerce_value(value_cell).ok_or_else(|| {
        format!(
            "row dropped: value '{}' is not numeric",
            value_cell.to_text()
        )
    })?;

    let period = {
        let text = field_cell(row, headers, Field::Period).to_text();
        let trimmed = text.trim().to_string();
        if trimmed.is_empty() {
            options.default_period.clone()
        } else {
            trimmed
        }
    };

    let org_unit = {
        let text = field_cell(row, headers, Field::OrgUnit).to_text();
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            trimmed.to_string()
        } else if let Some(site_name) = &site {
            slugify_org_unit(site_name)
        } else {
            options.default_org_unit.clone()
        }
    };

    Ok(CanonicalRecord {
        site,
        indicator,
        value,
        period,
        org_unit,
        sheet_name: sheet_name.to_string(),
        row_index,
    })
}

fn field_cell<'a>(row: &'a [Cell], headers: &HeaderMap, field: Field) -> &'a Cell {
    match headers.column(field) {
        Some(col) => row.get(col).unwrap_or(&EMPTY_CELL),
        None => &EMPTY_CELL,
    }
}

/// Coerce a cell to a finite numeric value.
///
/// Empty cells mean zero in these registers. Numeric strings may carry
/// thousands separators. A non-empty cell that fails to parse is `None`
/// and drops its row upstream.
fn coerce_value(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Empty => Some(0.0),
        Cell::Number(n) => {
            if n.is_finite() {
                Some(*n)
            } else {
                None
            }
        }
        Cell::Text(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',' && *c != ' ').collect();
            if cleaned.is_empty() {
                return Some(0.0);
            }
            cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> NormalizeOptions {
        NormalizeOptions {
            default_period: "202601".into(),
            default_org_unit: "OU_DEFAULT".into(),
        }
    }

    fn workbook(file_name: &str, rows: Vec<Vec<Cell>>) -> RawWorkbook {
        RawWorkbook {
            file_name: file_name.into(),
            sheets: vec![RawSheet {
                name: "Sheet1".into(),
                rows,
            }],
        }
    }

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|s| Cell::from(*s)).collect()
    }

    #[test]
    fn test_normalize_basic() {
        let wb = workbook(
            "report.xlsx",
            vec![
                row(&["Site", "Indicator", "Value", "Period"]),
                row(&["Kigali Clinic", "TX_NEW", "85", "202601"]),
            ],
        );
        let out = normalize(&wb, &options());
        assert_eq!(out.records.len(), 1);
        assert!(out.warnings.is_empty());
        let rec = &out.records[0];
        assert_eq!(rec.indicator, "TX_NEW");
        assert_eq!(rec.value, 85.0);
        assert_eq!(rec.period, "202601");
        assert_eq!(rec.site.as_deref(), Some("Kigali Clinic"));
        assert_eq!(rec.row_index, 2);
        assert_eq!(rec.sheet_name, "Sheet1");
    }

    #[test]
    fn test_normalize_empty_workbook() {
        let wb = workbook("report.xlsx", vec![]);
        let out = normalize(&wb, &options());
        assert!(out.records.is_empty());
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_normalize_header_only_sheet() {
        let wb = workbook("report.xlsx", vec![row(&["Site", "Indicator", "Value"])]);
        let out = normalize(&wb, &options());
        assert!(out.records.is_empty());
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_normalize_offset_header() {
        let wb = workbook(
            "report.xlsx",
            vec![
                row(&["Ministry of Health", "", ""]),
                row(&["", "", ""]),
                row(&["Facility Name", "Indicator", "Count"]),
                row(&["Nyamata HC", "TX_CURR", "1,204"]),
            ],
        );
        let out = normalize(&wb, &options());
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].value, 1204.0);
        assert_eq!(out.records[0].row_index, 4);
    }

    #[test]
    fn test_normalize_unparseable_value_drops_row_with_warning() {
        let wb = workbook(
            "report.xlsx",
            vec![
                row(&["Site", "Indicator", "Value"]),
                row(&["Kigali Clinic", "TX_NEW", "n/a"]),
                row(&["Kigali Clinic", "TX_CURR", "40"]),
            ],
        );
        let out = normalize(&wb, &options());
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].indicator, "TX_CURR");
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].row, Some(2));
    }

    #[test]
    fn test_normalize_empty_value_is_zero() {
        let wb = workbook(
            "report.xlsx",
            vec![
                row(&["Site", "Indicator", "Value"]),
                row(&["Kigali Clinic", "TX_NEW", ""]),
            ],
        );
        let out = normalize(&wb, &options());
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].value, 0.0);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_normalize_blank_indicator_skipped_with_warning() {
        let wb = workbook(
            "report.xlsx",
            vec![
                row(&["Site", "Indicator", "Value"]),
                row(&["Kigali Clinic", "", "12"]),
            ],
        );
        let out = normalize(&wb, &options());
        assert!(out.records.is_empty());
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_normalize_fully_blank_rows_skipped_silently() {
        let wb = workbook(
            "report.xlsx",
            vec![
                row(&["Site", "Indicator", "Value"]),
                row(&["", "", ""]),
                row(&["Kigali Clinic", "TX_NEW", "3"]),
            ],
        );
        let out = normalize(&wb, &options());
        assert_eq!(out.records.len(), 1);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_normalize_synthesizes_org_unit_from_site() {
        let wb = workbook(
            "report.xlsx",
            vec![
                row(&["Site", "Indicator", "Value"]),
                row(&["Nyamata HC", "TX_NEW", "7"]),
            ],
        );
        let out = normalize(&wb, &options());
        assert_eq!(out.records[0].org_unit, "OU_NYAMATA_HC");
    }

    #[test]
    fn test_normalize_org_unit_column_wins() {
        let wb = workbook(
            "report.xlsx",
            vec![
                row(&["Site", "Indicator", "Value", "Period", "Org Unit"]),
                row(&["Nyamata HC", "TX_NEW", "7", "202601", "XyZ123abc"]),
            ],
        );
        let out = normalize(&wb, &options());
        assert_eq!(out.records[0].org_unit, "XyZ123abc");
    }

    #[test]
    fn test_normalize_default_org_unit_without_site() {
        let wb = workbook(
            "report.xlsx",
            vec![row(&["Indicator", "Value"]), row(&["TX_NEW", "7"])],
        );
        let out = normalize(&wb, &options());
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].org_unit, "OU_DEFAULT");
        assert_eq!(out.records[0].period, "202601");
    }

    #[test]
    fn test_normalize_requires_site_strategy() {
        let wb = workbook(
            "ART_Register_Q1.xlsx",
            vec![
                row(&["Site", "Indicator", "Value"]),
                row(&["", "TX_NEW", "12"]),
                row(&["Kigali Clinic", "TX_NEW", "5"]),
            ],
        );
        let out = normalize(&wb, &options());
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].value, 5.0);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_normalize_degraded_header_warns() {
        let wb = workbook(
            "report.xlsx",
            vec![row(&["alpha", "TX_NEW", "4"]), row(&["beta", "TX_CURR", "9"])],
        );
        let out = normalize(&wb, &options());
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].message.contains("no header row"));
        // row 0 assumed to be the header, so only row 2 yields a record
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].indicator, "TX_CURR");
    }

    #[test]
    fn test_normalize_duplicate_indicators_retained() {
        let wb = workbook(
            "report.xlsx",
            vec![
                row(&["Site", "Indicator", "Value"]),
                row(&["Kigali Clinic", "TX_NEW", "5"]),
                row(&["Kigali Clinic", "TX_NEW", "9"]),
            ],
        );
        let out = normalize(&wb, &options());
        // dedup is the matcher's concern, not the normalizer's
        assert_eq!(out.records.len(), 2);
    }
}
