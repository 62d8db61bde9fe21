//! Core data models for exported tables and spreadsheet datasets.

use serde::{Deserialize, Serialize};

/// A table selected for export and the comment used to name its workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Table name as reported by the engine
    pub name: String,
    /// Table comment, or the table name when none could be found
    pub comment: String,
}

impl TableDescriptor {
    /// Creates a descriptor whose comment falls back to the table name.
    pub fn uncommented(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            comment: name.clone(),
            name,
        }
    }
}

/// One column from `DESCRIBE`, in engine order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub data_type: String,
    /// Column comment; empty when the engine reports none
    pub comment: String,
}

impl ColumnDescriptor {
    pub fn new(
        name: impl Into<String>,
        data_type: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            comment: comment.into(),
        }
    }

    /// Spreadsheet header for this column: the comment when present, else the name.
    pub fn header(&self) -> &str {
        if self.comment.is_empty() {
            &self.name
        } else {
            &self.comment
        }
    }

    /// Converts a raw text value from the engine into a typed cell.
    ///
    /// Numeric and boolean Hive types are parsed; anything that fails to
    /// parse is kept as text so no data is lost.
    pub fn cell_from_text(&self, raw: Option<&str>) -> CellValue {
        let Some(text) = raw else {
            return CellValue::Empty;
        };

        let kind = self.data_type.trim().to_ascii_lowercase();
        let base = kind.split('(').next().unwrap_or_default().trim();
        match base {
            "tinyint" | "smallint" | "int" | "integer" | "bigint" | "float" | "double"
            | "double precision" | "decimal" | "numeric" => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map_or_else(|| CellValue::Text(text.to_string()), CellValue::Number),
            "boolean" => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => CellValue::Bool(true),
                "false" | "0" => CellValue::Bool(false),
                _ => CellValue::Text(text.to_string()),
            },
            _ => CellValue::Text(text.to_string()),
        }
    }
}

/// A single spreadsheet cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// Text used for display-width measurement.
    pub fn display_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(text) => text.clone(),
            Self::Number(n) => format_number(*n),
            Self::Bool(true) => "True".to_string(),
            Self::Bool(false) => "False".to_string(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Integral values render without a fractional part.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Tabular data destined for one worksheet: a header row plus data rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    /// Creates a dataset, rejecting rows whose arity differs from the headers.
    ///
    /// # Errors
    /// Returns a configuration error naming the first mismatching row.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> crate::Result<Self> {
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != headers.len())
        {
            return Err(crate::error::HiveSheetError::configuration(format!(
                "row {} has {} values but {} columns were described",
                index.saturating_add(1),
                row.len(),
                headers.len()
            )));
        }
        Ok(Self { headers, rows })
    }

    /// Number of data rows (the header row is not counted).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Iterates over the cells of one column.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &CellValue> {
        self.rows.iter().filter_map(move |row| row.get(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_prefers_comment() {
        let commented = ColumnDescriptor::new("id", "int", "编号");
        assert_eq!(commented.header(), "编号");

        let bare = ColumnDescriptor::new("id", "int", "");
        assert_eq!(bare.header(), "id");
    }

    #[test]
    fn test_cell_from_text_by_type() {
        let int_col = ColumnDescriptor::new("n", "bigint", "");
        assert_eq!(int_col.cell_from_text(Some("42")), CellValue::Number(42.0));
        assert_eq!(int_col.cell_from_text(None), CellValue::Empty);
        assert_eq!(
            int_col.cell_from_text(Some("n/a")),
            CellValue::Text("n/a".to_string())
        );

        let dec_col = ColumnDescriptor::new("d", "decimal(10,2)", "");
        assert_eq!(dec_col.cell_from_text(Some("3.50")), CellValue::Number(3.5));

        let bool_col = ColumnDescriptor::new("b", "boolean", "");
        assert_eq!(bool_col.cell_from_text(Some("true")), CellValue::Bool(true));

        let str_col = ColumnDescriptor::new("s", "string", "");
        assert_eq!(
            str_col.cell_from_text(Some("007")),
            CellValue::Text("007".to_string())
        );
    }

    #[test]
    fn test_display_text() {
        assert_eq!(CellValue::Number(5.0).display_text(), "5");
        assert_eq!(CellValue::Number(1.25).display_text(), "1.25");
        assert_eq!(CellValue::Bool(false).display_text(), "False");
        assert_eq!(CellValue::Empty.display_text(), "");
    }

    #[test]
    fn test_dataset_rejects_ragged_rows() {
        let headers = vec!["a".to_string(), "b".to_string()];
        let ok = Dataset::new(headers.clone(), vec![vec!["1".into(), "2".into()]]);
        assert!(ok.is_ok());

        let ragged = Dataset::new(headers, vec![vec!["1".into()]]);
        assert!(ragged.is_err());
    }

    #[test]
    fn test_uncommented_descriptor() {
        let table = TableDescriptor::uncommented("dws_x_a");
        assert_eq!(table.comment, "dws_x_a");
    }
}
