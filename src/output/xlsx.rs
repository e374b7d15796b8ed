//! Spreadsheet (`.xlsx`) export of a filtered report.
//!
//! The workbook has one sheet: a bold, frozen header row followed by one row
//! per kept vulnerability. Cells are typed from the JSON value:
//!
//! | JSON | Cell |
//! |------|------|
//! | string | text |
//! | number | number |
//! | bool | boolean |
//! | null / absent | empty |
//! | array / object | compact JSON text |
//!
//! Text longer than Excel's 32,767-character cell limit is truncated with a
//! warning. Integers that do not fit an `f64` exactly are written as text.

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use serde_json::{Number, Value};
use std::borrow::Cow;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{ReportError, Result};
use crate::filter::FilteredReportTable;

/// Default sheet name for exported workbooks.
pub const DEFAULT_SHEET_NAME: &str = "Vulnerabilities";

/// Maximum number of characters Excel stores in one cell.
const MAX_CELL_CHARS: usize = 32_767;

/// Largest integer magnitude an `f64` represents exactly.
const MAX_EXACT_INT: u64 = 1 << 53;

/// Builds the workbook in memory and writes it to `path`, replacing any
/// existing file.
///
/// # Errors
///
/// Returns [`ReportError::Export`] if the workbook cannot be built (for
/// example an invalid sheet name) or the file cannot be written. Build errors
/// are raised before the output path is touched.
pub fn write_xlsx(table: &FilteredReportTable, sheet_name: &str, path: &Path) -> Result<()> {
    let export_err = |source| ReportError::Export {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = build_workbook(table, sheet_name).map_err(export_err)?;
    workbook.save(path).map_err(export_err)?;

    info!(
        path = %path.display(),
        rows = table.rows().len(),
        columns = table.columns().len(),
        "Wrote spreadsheet"
    );
    Ok(())
}

/// Renders the workbook to bytes without touching the filesystem.
#[cfg(test)]
fn xlsx_bytes(table: &FilteredReportTable, sheet_name: &str) -> Result<Vec<u8>, XlsxError> {
    build_workbook(table, sheet_name)?.save_to_buffer()
}

fn build_workbook(table: &FilteredReportTable, sheet_name: &str) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name)?;

        for (col, name) in table.columns().iter().enumerate() {
            let name = clip_text(name, name, None);
            worksheet.write_string_with_format(0, col_num(col)?, &*name, &header)?;
        }

        for (index, vuln) in table.rows().iter().enumerate() {
            let row = row_num(index + 1)?;
            for (col, (column, cell)) in table.columns().iter().zip(table.cells(vuln)).enumerate() {
                if let Some(value) = cell {
                    let cell = Cell {
                        row,
                        col: col_num(col)?,
                        column,
                        id: vuln.id(),
                    };
                    write_cell(worksheet, &cell, value)?;
                }
            }
        }

        worksheet.set_freeze_panes(1, 0)?;
        if !table.columns().is_empty() {
            let last_row = row_num(table.rows().len())?;
            let last_col = col_num(table.columns().len() - 1)?;
            worksheet.autofilter(0, 0, last_row, last_col)?;
        }
        worksheet.autofit();
    }

    Ok(workbook)
}

/// Position of a data cell and the record it belongs to.
struct Cell<'a> {
    row: u32,
    col: u16,
    column: &'a str,
    id: Option<&'a str>,
}

fn write_cell(worksheet: &mut Worksheet, cell: &Cell<'_>, value: &Value) -> Result<(), XlsxError> {
    let (row, col) = (cell.row, cell.col);
    match value {
        Value::Null => {}
        Value::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        Value::Number(n) => match exact_f64(n) {
            Some(f) => {
                worksheet.write_number(row, col, f)?;
            }
            None => {
                worksheet.write_string(row, col, n.to_string())?;
            }
        },
        Value::String(s) => {
            let text = clip_text(s, cell.column, cell.id);
            worksheet.write_string(row, col, &*text)?;
        }
        Value::Array(_) | Value::Object(_) => {
            let json = value.to_string();
            let text = clip_text(&json, cell.column, cell.id);
            worksheet.write_string(row, col, &*text)?;
        }
    }
    Ok(())
}

/// Returns the number as an `f64` when the conversion is lossless.
///
/// Integers beyond 2^53 return `None` and are written as text.
fn exact_f64(n: &Number) -> Option<f64> {
    if let Some(u) = n.as_u64() {
        return (u <= MAX_EXACT_INT).then_some(u as f64);
    }
    if let Some(i) = n.as_i64() {
        return (i.unsigned_abs() <= MAX_EXACT_INT).then_some(i as f64);
    }
    n.as_f64()
}

/// Cuts text to Excel's per-cell limit on a char boundary.
fn clip_text<'a>(text: &'a str, column: &str, id: Option<&str>) -> Cow<'a, str> {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        None => Cow::Borrowed(text),
        Some((end, _)) => {
            warn!(
                vulnerability = id.unwrap_or("-"),
                column,
                chars = text.chars().count(),
                limit = MAX_CELL_CHARS,
                "Truncating cell text to the Excel limit"
            );
            Cow::Borrowed(&text[..end])
        }
    }
}

fn row_num(index: usize) -> Result<u32, XlsxError> {
    u32::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}

fn col_num(index: usize) -> Result<u16, XlsxError> {
    u16::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}
