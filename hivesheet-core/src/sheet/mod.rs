//! Worksheet writing and workbook reading.
//!
//! - `width`: display width and column sizing
//! - `naming`: sanitizing and collision registries
//!
//! Workbooks are written with `rust_xlsxwriter` and read with `calamine`.
//! A [`Dataset`] maps onto a worksheet as one bold header row followed by
//! the data rows.

pub mod naming;
pub mod width;

use crate::models::{CellValue, Dataset};
use crate::{HiveSheetError, Result};
use calamine::{Data, Reader, Xlsx, open_workbook};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;

/// Builds a named worksheet holding `dataset`, with column widths adjusted.
///
/// The worksheet is not attached to any workbook, so a failure here leaves
/// the destination workbook untouched.
///
/// # Errors
/// Returns a write error for invalid sheet names or data beyond Excel's limits.
pub fn dataset_worksheet(name: &str, dataset: &Dataset, max_width: usize) -> Result<Worksheet> {
    let mut worksheet = Worksheet::new();
    worksheet
        .set_name(name)
        .map_err(|e| HiveSheetError::spreadsheet_write(format!("naming sheet '{name}'"), e))?;

    let header_format = Format::new().set_bold();
    for (col, header) in dataset.headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, column_number(col)?, header, &header_format)
            .map_err(|e| HiveSheetError::spreadsheet_write(format!("writing header of '{name}'"), e))?;
    }

    for (index, row) in dataset.rows.iter().enumerate() {
        let row_number = u32::try_from(index)
            .ok()
            .and_then(|r| r.checked_add(1))
            .ok_or_else(|| {
                HiveSheetError::configuration(format!("sheet '{name}' has too many rows"))
            })?;
        for (col, cell) in row.iter().enumerate() {
            write_cell(&mut worksheet, row_number, column_number(col)?, cell)
                .map_err(|e| HiveSheetError::spreadsheet_write(format!("writing data of '{name}'"), e))?;
        }
    }

    width::adjust_column_widths(&mut worksheet, dataset, max_width)?;
    Ok(worksheet)
}

fn column_number(index: usize) -> Result<u16> {
    u16::try_from(index)
        .map_err(|_| HiveSheetError::configuration(format!("column {index} exceeds worksheet limits")))
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
) -> std::result::Result<(), rust_xlsxwriter::XlsxError> {
    match cell {
        CellValue::Empty => {}
        CellValue::Text(text) => {
            worksheet.write_string(row, col, text)?;
        }
        CellValue::Number(n) => {
            worksheet.write_number(row, col, *n)?;
        }
        CellValue::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
    }
    Ok(())
}

/// Saves `workbook` to `path`.
///
/// # Errors
/// Returns a write error if the file cannot be created.
pub fn save_workbook(workbook: &mut Workbook, path: &Path) -> Result<()> {
    workbook
        .save(path)
        .map_err(|e| HiveSheetError::spreadsheet_write(format!("saving {}", path.display()), e))
}

/// Reads every sheet of an `.xlsx` file, in workbook order.
///
/// The first row of each sheet becomes the headers; blank header cells are
/// named `Unnamed: <index>`. Date cells become `YYYY-MM-DD HH:MM:SS` text.
///
/// # Errors
/// Returns a read error if the file cannot be opened or a sheet cannot be parsed.
pub fn read_workbook(path: &Path) -> Result<Vec<(String, Dataset)>> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e| HiveSheetError::spreadsheet_read(format!("opening {}", path.display()), e))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name).map_err(|e| {
            HiveSheetError::spreadsheet_read(format!("reading sheet '{name}' of {}", path.display()), e)
        })?;

        let mut rows = range.rows();
        let dataset = match rows.next() {
            None => Dataset::default(),
            Some(header_row) => {
                let headers = header_row
                    .iter()
                    .enumerate()
                    .map(|(index, data)| {
                        let text = cell_from_data(data).display_text();
                        if text.is_empty() {
                            format!("Unnamed: {index}")
                        } else {
                            text
                        }
                    })
                    .collect();
                let body = rows
                    .map(|row| row.iter().map(cell_from_data).collect())
                    .collect();
                Dataset::new(headers, body)?
            }
        };
        sheets.push((name, dataset));
    }

    Ok(sheets)
}

#[allow(clippy::cast_precision_loss)]
fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => dt.as_datetime().map_or_else(
            || CellValue::Number(dt.as_f64()),
            |ndt| CellValue::Text(ndt.format("%Y-%m-%d %H:%M:%S").to_string()),
        ),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}
