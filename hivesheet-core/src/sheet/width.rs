//! Column sizing from an approximate display width.
//!
//! There is no font-metrics model here: CJK unified ideographs count as two
//! columns and every other character as one.

use crate::models::Dataset;
use crate::{HiveSheetError, Result};
use rust_xlsxwriter::Worksheet;

/// Default ceiling for a computed column width.
pub const DEFAULT_MAX_COLUMN_WIDTH: usize = 100;

/// Extra space added after the widest value in a column.
const COLUMN_PADDING: usize = 2;

const fn is_wide(c: char) -> bool {
    matches!(c, '\u{4E00}'..='\u{9FFF}')
}

/// Approximate rendered width of `s`.
///
/// # Example
/// ```rust
/// use hivesheet_core::sheet::width::display_width;
///
/// assert_eq!(display_width(""), 0);
/// assert_eq!(display_width("ab"), 2);
/// assert_eq!(display_width("表名"), 4);
/// ```
pub fn display_width(s: &str) -> usize {
    s.chars()
        .map(|c| if is_wide(c) { 2_usize } else { 1 })
        .fold(0, usize::saturating_add)
}

/// Width for every column of `dataset`:
/// `min(max(header width, widest cell) + 2, max_width)`.
pub fn column_widths(dataset: &Dataset, max_width: usize) -> Vec<usize> {
    dataset
        .headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            let data_width = dataset
                .column(index)
                .map(|cell| display_width(&cell.display_text()))
                .max()
                .unwrap_or(0);
            display_width(header)
                .max(data_width)
                .saturating_add(COLUMN_PADDING)
                .min(max_width)
        })
        .collect()
}

/// Sets each worksheet column's width from `dataset`. Touches nothing else.
///
/// # Errors
/// Returns a write error if a column index exceeds the worksheet limits.
pub fn adjust_column_widths(
    worksheet: &mut Worksheet,
    dataset: &Dataset,
    max_width: usize,
) -> Result<()> {
    for (index, width) in column_widths(dataset, max_width).into_iter().enumerate() {
        let col = u16::try_from(index).map_err(|_| {
            HiveSheetError::configuration(format!("column {index} exceeds worksheet limits"))
        })?;
        #[allow(clippy::cast_precision_loss)]
        worksheet
            .set_column_width(col, width as f64)
            .map_err(|e| HiveSheetError::spreadsheet_write("setting column width", e))?;
    }
    Ok(())
}
