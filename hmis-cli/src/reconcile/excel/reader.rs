//! Decode source files into the owned workbook model
//!
//! Excel containers (xlsx/xlsm/xls/ods) go through calamine; CSV exports
//! are presented as a single-sheet workbook so the rest of the pipeline
//! never cares which container a file arrived in. An unreadable container
//! is the only hard failure here.

use std::path::Path;

use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, open_workbook_auto};

use crate::reconcile::types::{Cell, RawSheet, RawWorkbook};

/// File extensions the pipeline accepts as source workbooks
pub const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods", "csv"];

/// Whether a file name looks like a source workbook
pub fn is_supported_source(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Open a source file into a `RawWorkbook`
pub fn open_source_workbook(path: &Path) -> Result<RawWorkbook> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
        .with_context(|| format!("Invalid source file name: {}", path.display()))?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let sheets = match extension.as_str() {
        "csv" => vec![read_csv_sheet(path)?],
        "xlsx" | "xlsm" | "xls" | "ods" => read_excel_sheets(path)?,
        other => bail!("Unsupported source file type: '{}'", other),
    };

    Ok(RawWorkbook { file_name, sheets })
}

fn read_excel_sheets(path: &Path) -> Result<Vec<RawSheet>> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook: {}", path.display()))?;

    let sheet_names = workbook.sheet_names().to_owned();
    let mut sheets = Vec::with_capacity(sheet_names.len());

    for name in sheet_names {
        let range = workbook
            .worksheet_range(&name)
            .with_context(|| format!("Failed to read sheet: {}", name))?;

        let rows = range
            .rows()
            .map(|row| row.iter().map(convert_cell).collect())
            .collect();

        sheets.push(RawSheet { name, rows });
    }

    Ok(sheets)
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::String(s) => {
            if s.trim().is_empty() {
                Cell::Empty
            } else {
                Cell::Text(s.clone())
            }
        }
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) => Cell::Text(s.clone()),
        _ => Cell::Empty,
    }
}

fn read_csv_sheet(path: &Path) -> Result<RawSheet> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("csv")
        .to_string();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.with_context(|| format!("Failed to read CSV row in {}", path.display()))?;
        rows.push(record.iter().map(Cell::from).collect());
    }

    Ok(RawSheet { name, rows })
}
