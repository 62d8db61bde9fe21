//! Per-group merge outcomes.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// What happened to one group of source files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupOutcome {
    pub prefix: String,
    /// Merged workbook, if one was written
    pub output: Option<PathBuf>,
    /// Sheet names written, in workbook order
    pub sheets: Vec<String>,
    /// Requested sheets that were skipped (missing index or write failure)
    pub skipped: usize,
    pub unreadable_files: Vec<String>,
    pub deleted_files: Vec<String>,
    pub deletion_failures: Vec<String>,
    /// Set when the merged workbook could not be saved
    pub error: Option<String>,
}

impl GroupOutcome {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    pub fn log(&self) {
        match (&self.output, &self.error) {
            (Some(path), None) => {
                info!("Merged prefix '{}' into: {}", self.prefix, path.display());
                info!("The merged workbook has {} sheet(s)", self.sheets.len());
            }
            (_, Some(e)) => warn!("Prefix '{}' was not merged: {}", self.prefix, e),
            (None, None) => warn!("Prefix '{}' produced no sheets, nothing written", self.prefix),
        }
        if self.skipped > 0 {
            warn!("{} requested sheet(s) skipped", self.skipped);
        }
        for file in &self.unreadable_files {
            warn!("  unreadable: {}", file);
        }
        info!("----- Finished prefix '{}' -----", self.prefix);
    }
}

/// Outcome of one merge run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeSummary {
    /// `.xlsx` files found in the input directory
    pub files_found: usize,
    pub groups: Vec<GroupOutcome>,
}

impl MergeSummary {
    /// Paths of all merged workbooks written.
    pub fn outputs(&self) -> Vec<&PathBuf> {
        self.groups.iter().filter_map(|g| g.output.as_ref()).collect()
    }

    pub fn sheets_written(&self) -> usize {
        self.groups.iter().map(|g| g.sheets.len()).sum()
    }

    pub fn group(&self, prefix: &str) -> Option<&GroupOutcome> {
        self.groups.iter().find(|g| g.prefix == prefix)
    }
}
