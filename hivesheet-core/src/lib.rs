//! Core export, merge and spreadsheet utilities for hivesheet.
//!
//! This crate holds everything shared by the `hivesheet-export` and
//! `hivesheet` binaries: the Hive session abstraction, the table exporter,
//! the workbook merger and the spreadsheet helpers both of them use.
//!
//! # Security Guarantees
//! - Credentials are never logged and never appear in error messages
//! - Passwords are zeroized when dropped
//! - Every statement issued against Hive is read-only
//! - Identifiers are quoted before they reach a statement
//!
//! # Architecture
//! - Session traits with a scoped `with_session` guard for Hive access
//! - Feature-gated drivers (`odbc`)
//! - Explicit per-run registries for file and sheet names
//! - Per-item outcomes aggregated into run summaries

pub mod adapters;
pub mod error;
pub mod export;
pub mod logging;
pub mod merge;
pub mod models;
pub mod security;
pub mod sheet;

// Re-export commonly used types
pub use adapters::{HiveConfig, HiveConnector, HiveSession, Row, create_connector, with_session};
pub use error::{HiveSheetError, Result};
pub use export::{ExportOptions, ExportOutcome, ExportSummary, TableExporter};
pub use merge::{GroupOutcome, MergeOptions, MergeSummary, merge_workbooks};
pub use models::{CellValue, ColumnDescriptor, Dataset, TableDescriptor};
pub use security::{Credentials, load_secrets};
