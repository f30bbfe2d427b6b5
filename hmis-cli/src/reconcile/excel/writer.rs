//! Review workbook export for human sign-off
//!
//! Written by `inspect --export`: one sheet with the full match table and
//! one with the normalization warnings.

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::reconcile::types::ValidationWarning;
use crate::services::matching::MatchOutcome;

/// Column indices for the match sheet
mod match_cols {
    pub const INDICATOR_KEY: u16 = 0;
    pub const BACKEND_CODE: u16 = 1;
    pub const MATCH_TYPE: u16 = 2;
    pub const SOURCE_INDICATOR: u16 = 3;
    pub const VALUE: u16 = 4;
}

/// Column indices for the warnings sheet
mod warning_cols {
    pub const SHEET: u16 = 0;
    pub const ROW: u16 = 1;
    pub const MESSAGE: u16 = 2;
}

/// Write one file's reconciliation outcome to an Excel review workbook
pub fn write_review_excel(
    path: &str,
    outcome: &MatchOutcome,
    warnings: &[ValidationWarning],
) -> Result<()> {
    let mut workbook = Workbook::new();

    let matches = workbook.add_worksheet();
    matches.set_name("Matches")?;
    write_match_sheet(matches, outcome)?;

    let warning_sheet = workbook.add_worksheet();
    warning_sheet.set_name("Warnings")?;
    write_warning_sheet(warning_sheet, warnings)?;

    workbook
        .save(path)
        .with_context(|| format!("Failed to save review workbook: {}", path))?;

    Ok(())
}

fn write_match_sheet(ws: &mut Worksheet, outcome: &MatchOutcome) -> Result<()> {
    ws.write_string(0, match_cols::INDICATOR_KEY, "indicator_key")?;
    ws.write_string(0, match_cols::BACKEND_CODE, "backend_code")?;
    ws.write_string(0, match_cols::MATCH_TYPE, "match_type")?;
    ws.write_string(0, match_cols::SOURCE_INDICATOR, "source_indicator")?;
    ws.write_string(0, match_cols::VALUE, "value")?;

    for (idx, result) in outcome.results.iter().enumerate() {
        let row = (idx + 1) as u32;
        ws.write_string(row, match_cols::INDICATOR_KEY, &result.indicator_key)?;
        ws.write_string(row, match_cols::BACKEND_CODE, &result.backend_code)?;
        ws.write_string(row, match_cols::MATCH_TYPE, result.match_type.label())?;
        ws.write_string(
            row,
            match_cols::SOURCE_INDICATOR,
            result.source_indicator.as_deref().unwrap_or(""),
        )?;
        ws.write_number(row, match_cols::VALUE, result.value)?;
    }

    Ok(())
}

fn write_warning_sheet(ws: &mut Worksheet, warnings: &[ValidationWarning]) -> Result<()> {
    ws.write_string(0, warning_cols::SHEET, "sheet")?;
    ws.write_string(0, warning_cols::ROW, "row")?;
    ws.write_string(0, warning_cols::MESSAGE, "message")?;

    for (idx, warning) in warnings.iter().enumerate() {
        let row = (idx + 1) as u32;
        ws.write_string(row, warning_cols::SHEET, &warning.sheet)?;
        match warning.row {
            Some(row_index) => {
                ws.write_number(row, warning_cols::ROW, row_index as f64)?;
            }
            None => {
                ws.write_string(row, warning_cols::ROW, "")?;
            }
        }
        ws.write_string(row, warning_cols::MESSAGE, &warning.message)?;
    }

    Ok(())
}
