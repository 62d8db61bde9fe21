//! Per-table outcomes and the end-of-run summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// Result of exporting one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExportOutcome {
    /// The workbook was written
    Exported {
        table: String,
        path: PathBuf,
        rows: usize,
    },
    /// The table was skipped; `reason` is the error message
    Failed { table: String, reason: String },
}

impl ExportOutcome {
    pub fn table(&self) -> &str {
        match self {
            Self::Exported { table, .. } | Self::Failed { table, .. } => table,
        }
    }

    pub const fn is_exported(&self) -> bool {
        matches!(self, Self::Exported { .. })
    }
}

/// Outcome of a whole export run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportSummary {
    pub database: String,
    pub prefix: String,
    pub started_at: DateTime<Utc>,
    /// Number of tables discovered, i.e. the number of files expected
    pub expected: usize,
    pub outcomes: Vec<ExportOutcome>,
}

impl ExportSummary {
    pub fn new(database: impl Into<String>, prefix: impl Into<String>, expected: usize) -> Self {
        Self {
            database: database.into(),
            prefix: prefix.into(),
            started_at: Utc::now(),
            expected,
            outcomes: Vec::with_capacity(expected),
        }
    }

    /// Number of workbooks actually written.
    pub fn exported(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_exported()).count()
    }

    /// Paths of the written workbooks, in export order.
    pub fn exported_paths(&self) -> Vec<&PathBuf> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                ExportOutcome::Exported { path, .. } => Some(path),
                ExportOutcome::Failed { .. } => None,
            })
            .collect()
    }

    /// Names of the tables that failed, in export order.
    pub fn failed_tables(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_exported())
            .map(ExportOutcome::table)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.exported() == self.expected
    }

    /// Logs the expected vs. actual file count and every failed table.
    pub fn log(&self) {
        info!("----- Export summary -----");
        info!("Expected files: {}", self.expected);
        info!("Written files: {}", self.exported());

        let failed = self.failed_tables();
        if failed.is_empty() {
            info!("All tables exported successfully");
        } else {
            warn!("{} table(s) failed to export:", failed.len());
            for outcome in &self.outcomes {
                if let ExportOutcome::Failed { table, reason } = outcome {
                    warn!("  - {}: {}", table, reason);
                }
            }
        }
        info!("----- Export finished -----");
    }
}
