//! Hive table exporter.
//!
//! One run discovers every table matching a name prefix in one database and
//! writes each to its own workbook with three sheets: the table data, a
//! table-info sheet and a column-info sheet. Tables are processed in
//! discovery order; a failure in one table is recorded in the run summary and
//! the run moves on to the next.
//!
//! # Example
//! ```rust,no_run
//! use hivesheet_core::adapters::{HiveConfig, create_connector};
//! use hivesheet_core::export::{ExportOptions, TableExporter};
//! use hivesheet_core::security::Credentials;
//!
//! let connector = create_connector()?;
//! let config = HiveConfig::new("hive.internal".to_string());
//! let credentials = Credentials::new("analyst".to_string(), "secret".to_string());
//!
//! let options = ExportOptions::new("dws", "dws_orders_").with_output_dir("out");
//! let summary = TableExporter::new(options).run(connector.as_ref(), &config, &credentials)?;
//! println!("{} of {} tables exported", summary.exported(), summary.expected);
//! # Ok::<(), hivesheet_core::HiveSheetError>(())
//! ```

mod summary;

pub use summary::{ExportOutcome, ExportSummary};

use crate::adapters::{HiveConfig, HiveConnector, HiveSession, Row, identifiers, with_session};
use crate::models::{CellValue, ColumnDescriptor, Dataset, TableDescriptor};
use crate::security::Credentials;
use crate::sheet::naming::{FilenameRegistry, sanitize_filename};
use crate::sheet::width::DEFAULT_MAX_COLUMN_WIDTH;
use crate::sheet::{dataset_worksheet, save_workbook};
use crate::{HiveSheetError, Result};
use rust_xlsxwriter::Workbook;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Base file name used when a table comment sanitizes to nothing.
pub const PLACEHOLDER_FILENAME: &str = "输出";

/// Directory exported workbooks are written to by default.
pub const DEFAULT_EXPORT_DIR: &str = "../input";

/// Sheet holding the table rows.
pub const DATA_SHEET: &str = "数据";
/// Sheet holding table name, comment and row count.
pub const TABLE_INFO_SHEET: &str = "表信息";
/// Sheet holding one row per column.
pub const COLUMN_INFO_SHEET: &str = "列信息";

const MISSING_PROPERTY_MARKER: &str = "does not have property";

/// What to export and where to put it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    pub database: String,
    /// Table-name prefix; passed to `SHOW TABLES LIKE '<prefix>*'`
    pub prefix: String,
    pub output_dir: PathBuf,
    pub max_column_width: usize,
}

impl ExportOptions {
    pub fn new(database: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            prefix: prefix.into(),
            output_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            max_column_width: DEFAULT_MAX_COLUMN_WIDTH,
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub const fn with_max_column_width(mut self, width: usize) -> Self {
        self.max_column_width = width;
        self
    }

    /// Checks the options before any connection is made.
    ///
    /// # Errors
    /// Returns a configuration error for an unusable database name, a prefix
    /// that cannot be embedded in a pattern literal, or a zero column width.
    pub fn validate(&self) -> Result<()> {
        identifiers::quote_identifier(&self.database)?;
        identifiers::table_pattern_literal(&self.prefix)?;
        if self.max_column_width == 0 {
            return Err(HiveSheetError::configuration(
                "max column width must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Exports matching tables; owns the run's filename registry.
#[derive(Debug)]
pub struct TableExporter {
    options: ExportOptions,
    filenames: FilenameRegistry,
}

impl TableExporter {
    pub fn new(options: ExportOptions) -> Self {
        Self {
            options,
            filenames: FilenameRegistry::new(),
        }
    }

    pub const fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Opens a session, exports every matching table and closes the session.
    ///
    /// # Errors
    /// Returns configuration, connection and discovery errors. Per-table
    /// failures are reported in the summary instead.
    pub fn run(
        &mut self,
        connector: &dyn HiveConnector,
        config: &HiveConfig,
        credentials: &Credentials,
    ) -> Result<ExportSummary> {
        self.options.validate()?;
        with_session(connector, config, credentials, |session| self.export(session))
    }

    /// Exports every matching table through an already open session.
    ///
    /// # Errors
    /// Returns [`HiveSheetError::NoMatchingTables`] when discovery finds
    /// nothing, or the error of a failed discovery statement.
    pub fn export(&mut self, session: &mut dyn HiveSession) -> Result<ExportSummary> {
        info!("----- Starting export -----");
        let tables = self.discover_tables(session).map_err(|e| {
            error!("Export failed: {}", e);
            e
        })?;

        let total = tables.len();
        let mut summary = ExportSummary::new(&self.options.database, &self.options.prefix, total);

        for (index, table) in tables.iter().enumerate() {
            info!("----- Table {}/{}: {} -----", index.saturating_add(1), total, table);
            let outcome = match self.export_table(session, table) {
                Ok((path, rows)) => {
                    info!(
                        "Exported table {}/{}: '{}' to '{}' ({} rows)",
                        index.saturating_add(1),
                        total,
                        table,
                        path.display(),
                        rows
                    );
                    ExportOutcome::Exported {
                        table: table.clone(),
                        path,
                        rows,
                    }
                }
                Err(e) => {
                    error!("Failed to export table '{}': {}", table, e);
                    ExportOutcome::Failed {
                        table: table.clone(),
                        reason: e.to_string(),
                    }
                }
            };
            summary.outcomes.push(outcome);
        }

        summary.log();
        Ok(summary)
    }

    /// Switches to the configured database and lists matching tables.
    ///
    /// # Errors
    /// Returns a query error if either statement fails, or
    /// [`HiveSheetError::NoMatchingTables`] if the listing is empty.
    pub fn discover_tables(&self, session: &mut dyn HiveSession) -> Result<Vec<String>> {
        let ExportOptions {
            database, prefix, ..
        } = &self.options;

        session.execute(&identifiers::use_database(database)?)?;
        let rows = session.query(&identifiers::show_tables_like(prefix)?)?;

        let tables: Vec<String> = rows
            .into_iter()
            .filter_map(|row| first_text(&row))
            .collect();

        if tables.is_empty() {
            warn!("No tables matching prefix '{}' in database '{}'", prefix, database);
            return Err(HiveSheetError::NoMatchingTables {
                database: database.clone(),
                prefix: prefix.clone(),
            });
        }

        info!("Found {} table(s) matching prefix '{}':", tables.len(), prefix);
        for table in &tables {
            info!("  - {}", table);
        }
        Ok(tables)
    }

    /// Looks up the table comment, falling back to the table name.
    ///
    /// Never fails: a missing property, an empty value or a failed statement
    /// all log the fallback and yield an uncommented descriptor.
    pub fn table_comment(&self, session: &mut dyn HiveSession, table: &str) -> TableDescriptor {
        let rows = identifiers::show_table_comment(table).and_then(|sql| session.query(&sql));
        match rows {
            Ok(rows) => match comment_from_properties(&rows) {
                Some(comment) => TableDescriptor {
                    name: table.to_string(),
                    comment,
                },
                None => {
                    info!("Table '{}' has no comment property, using the table name", table);
                    TableDescriptor::uncommented(table)
                }
            },
            Err(e) => {
                warn!("Failed to read comment of table '{}': {}", table, e);
                warn!("Using the table name as the comment of '{}'", table);
                TableDescriptor::uncommented(table)
            }
        }
    }

    /// Lists the table's columns in engine order.
    ///
    /// Stops at the first blank or `#` row, where `DESCRIBE` starts the
    /// partition-information block.
    ///
    /// # Errors
    /// Returns a query error if `DESCRIBE` fails.
    pub fn describe_columns(
        &self,
        session: &mut dyn HiveSession,
        table: &str,
    ) -> Result<Vec<ColumnDescriptor>> {
        let rows = session.query(&identifiers::describe_table(table)?)?;
        Ok(columns_from_describe(&rows))
    }

    /// Reads the whole table into a dataset headed by comment-or-name.
    ///
    /// # Errors
    /// Returns a query error if the statement fails or a result row does not
    /// have one value per described column.
    pub fn fetch_dataset(
        &self,
        session: &mut dyn HiveSession,
        table: &str,
        columns: &[ColumnDescriptor],
    ) -> Result<Dataset> {
        let sql = identifiers::select_all(table)?;
        let rows = session.query(&sql)?;

        let cells = rows
            .iter()
            .map(|row| {
                if row.len() == columns.len() {
                    Ok(columns
                        .iter()
                        .zip(row)
                        .map(|(column, value)| column.cell_from_text(value.as_deref()))
                        .collect())
                } else {
                    Err(HiveSheetError::query_failed(
                        sql.as_str(),
                        format!(
                            "result row has {} values but DESCRIBE reported {} columns",
                            row.len(),
                            columns.len()
                        ),
                    ))
                }
            })
            .collect::<Result<Vec<Vec<CellValue>>>>()?;

        let headers = columns.iter().map(|c| c.header().to_string()).collect();
        Dataset::new(headers, cells)
    }

    fn export_table(
        &mut self,
        session: &mut dyn HiveSession,
        table: &str,
    ) -> Result<(PathBuf, usize)> {
        let descriptor = self.table_comment(session, table);
        info!("Table comment: {}", descriptor.comment);

        let columns = self.describe_columns(session, table)?;
        debug!("Columns of '{}':", table);
        for column in &columns {
            debug!("  {} ({}): {}", column.name, column.data_type, column.comment);
        }

        let dataset = self.fetch_dataset(session, table, &columns)?;
        let rows = dataset.row_count();
        let path = self.write_workbook(&descriptor, &columns, &dataset)?;
        Ok((path, rows))
    }

    /// Writes the three-sheet workbook for one table and returns its path.
    ///
    /// The file name comes from the sanitized comment, made unique within
    /// this run. An existing file at the resolved path is never overwritten.
    ///
    /// # Errors
    /// Returns an I/O error if the output directory cannot be created or the
    /// target already exists, and a write error if the workbook cannot be saved.
    pub fn write_workbook(
        &mut self,
        table: &TableDescriptor,
        columns: &[ColumnDescriptor],
        dataset: &Dataset,
    ) -> Result<PathBuf> {
        let output_dir = self.options.output_dir.as_path();
        std::fs::create_dir_all(output_dir).map_err(|e| {
            HiveSheetError::io(
                format!("creating output directory {}", output_dir.display()),
                e,
            )
        })?;

        let sanitized = sanitize_filename(&table.comment);
        let base = if sanitized.is_empty() {
            PLACEHOLDER_FILENAME
        } else {
            sanitized.as_str()
        };
        let path = output_dir.join(self.filenames.unique(base));
        ensure_absent(&path)?;

        let max_width = self.options.max_column_width;
        let mut workbook = Workbook::new();
        workbook.push_worksheet(dataset_worksheet(DATA_SHEET, dataset, max_width)?);
        workbook.push_worksheet(dataset_worksheet(
            TABLE_INFO_SHEET,
            &table_info(table, dataset.row_count())?,
            max_width,
        )?);
        workbook.push_worksheet(dataset_worksheet(
            COLUMN_INFO_SHEET,
            &column_info(columns)?,
            max_width,
        )?);
        save_workbook(&mut workbook, &path)?;

        Ok(path)
    }
}

fn ensure_absent(path: &Path) -> Result<()> {
    if path.exists() {
        warn!("File '{}' already exists and will not be overwritten", path.display());
        return Err(HiveSheetError::io(
            format!("writing {}", path.display()),
            std::io::Error::new(std::io::ErrorKind::AlreadyExists, "file already exists"),
        ));
    }
    Ok(())
}

fn first_text(row: &Row) -> Option<String> {
    row.first()
        .and_then(Option::as_deref)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Extracts the comment from a `SHOW TBLPROPERTIES t('comment')` answer.
///
/// Drivers answer either with the bare value or with a `(key, value)` pair;
/// a missing property comes back as a message row rather than an error.
fn comment_from_properties(rows: &[Row]) -> Option<String> {
    let row = rows.first()?;
    let value = match row.as_slice() {
        [Some(key), value, ..] if key.trim() == "comment" => value.as_deref()?,
        [Some(value), ..] => value.as_str(),
        _ => return None,
    };

    let value = value.trim();
    if value.is_empty() || value.contains(MISSING_PROPERTY_MARKER) {
        None
    } else {
        Some(value.to_string())
    }
}

fn columns_from_describe(rows: &[Row]) -> Vec<ColumnDescriptor> {
    let text = |row: &Row, i: usize| {
        row.get(i)
            .and_then(Option::as_deref)
            .map(str::trim)
            .unwrap_or_default()
            .to_string()
    };

    rows.iter()
        .map(|row| ColumnDescriptor::new(text(row, 0), text(row, 1), text(row, 2)))
        .take_while(|column| !column.name.is_empty() && !column.name.starts_with('#'))
        .collect()
}

fn table_info(table: &TableDescriptor, row_count: usize) -> Result<Dataset> {
    #[allow(clippy::cast_precision_loss)]
    let count = CellValue::Number(row_count as f64);
    Dataset::new(
        vec!["信息".to_string(), "内容".to_string()],
        vec![
            vec!["表名".into(), table.name.as_str().into()],
            vec!["表注释".into(), table.comment.as_str().into()],
            vec!["数据量".into(), count],
        ],
    )
}

fn column_info(columns: &[ColumnDescriptor]) -> Result<Dataset> {
    Dataset::new(
        vec!["列名".to_string(), "列类型".to_string(), "列注释".to_string()],
        columns
            .iter()
            .map(|c| {
                vec![
                    c.name.as_str().into(),
                    c.data_type.as_str().into(),
                    c.comment.as_str().into(),
                ]
            })
            .collect(),
    )
}
