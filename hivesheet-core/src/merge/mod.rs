//! Workbook merger.
//!
//! Collects selected sheets from many `.xlsx` files into one workbook per
//! group of files. Groups come either from a fixed file-name prefix or from
//! the text up to the first `_` of each file name. Sheet names are unique
//! within each merged workbook; the registry starts empty for every group.
//!
//! The merger never opens a database connection.

pub mod grouping;
mod summary;

pub use summary::{GroupOutcome, MergeSummary};

use crate::sheet::naming::{SheetNameRegistry, unique_output_path};
use crate::sheet::width::DEFAULT_MAX_COLUMN_WIDTH;
use crate::sheet::{dataset_worksheet, read_workbook, save_workbook};
use crate::{HiveSheetError, Result};
use grouping::{group_files_by_prefix, list_workbooks, select_files_with_prefix};
use rust_xlsxwriter::Workbook;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Output file stem used when a group prefix sanitizes to nothing.
pub const FALLBACK_OUTPUT_NAME: &str = "合并结果";

/// Directory source workbooks are read from by default.
pub const DEFAULT_INPUT_DIR: &str = "../input";

/// Directory merged workbooks are written to by default.
pub const DEFAULT_OUTPUT_DIR: &str = "../output";

/// Merge run parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Merge only files starting with this prefix, as a single group
    pub file_prefix: Option<String>,
    /// Prepended to every merged sheet name
    pub sheet_prefix: String,
    /// Remove each readable source file once its sheets are merged
    pub delete_source: bool,
    /// 1-based sheet positions to take from each source file
    pub sheet_indices: Vec<usize>,
    pub max_column_width: usize,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            file_prefix: None,
            sheet_prefix: String::new(),
            delete_source: false,
            sheet_indices: vec![1],
            max_column_width: DEFAULT_MAX_COLUMN_WIDTH,
        }
    }
}

impl MergeOptions {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// An empty prefix means no fixed prefix.
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.file_prefix = (!prefix.is_empty()).then_some(prefix);
        self
    }

    pub fn with_sheet_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.sheet_prefix = prefix.into();
        self
    }

    pub const fn with_delete_source(mut self, delete: bool) -> Self {
        self.delete_source = delete;
        self
    }

    pub fn with_sheet_indices(mut self, indices: Vec<usize>) -> Self {
        self.sheet_indices = indices;
        self
    }

    pub const fn with_max_column_width(mut self, width: usize) -> Self {
        self.max_column_width = width;
        self
    }

    /// # Errors
    /// Returns a configuration error for an empty index list, an index of
    /// 0, or a zero column width.
    pub fn validate(&self) -> Result<()> {
        if self.sheet_indices.is_empty() {
            return Err(HiveSheetError::configuration(
                "at least one sheet index is required, e.g. [1, 3]",
            ));
        }
        if self.sheet_indices.contains(&0) {
            return Err(HiveSheetError::configuration(
                "sheet indices are 1-based; every index must be at least 1",
            ));
        }
        if self.max_column_width == 0 {
            return Err(HiveSheetError::configuration(
                "max column width must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Merges the input directory's workbooks according to `options`.
///
/// Unreadable files, missing sheet indices and sheet write failures are
/// logged and recorded in the summary; they never stop the run.
///
/// # Errors
/// Returns a configuration error for invalid options, and an I/O error when
/// the input directory does not exist or the output directory cannot be created.
pub fn merge_workbooks(options: &MergeOptions) -> Result<MergeSummary> {
    options.validate()?;

    let input_dir = options.input_dir.as_path();
    if !input_dir.is_dir() {
        return Err(HiveSheetError::io(
            format!("input directory {}", input_dir.display()),
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "input directory does not exist",
            ),
        ));
    }
    std::fs::create_dir_all(&options.output_dir).map_err(|e| {
        HiveSheetError::io(
            format!("creating output directory {}", options.output_dir.display()),
            e,
        )
    })?;

    let files = list_workbooks(input_dir)?;
    info!("Found {} workbook(s) to merge in {}", files.len(), input_dir.display());

    let mut summary = MergeSummary {
        files_found: files.len(),
        groups: Vec::new(),
    };
    if files.is_empty() {
        info!("No workbooks to merge");
        return Ok(summary);
    }

    let groups = match options.file_prefix.as_deref() {
        Some(prefix) => {
            let groups = select_files_with_prefix(&files, prefix);
            if groups.is_empty() {
                info!("No workbooks start with prefix '{}'", prefix);
            }
            groups
        }
        None => group_files_by_prefix(&files),
    };

    for (prefix, members) in &groups {
        let outcome = merge_group(options, prefix, members);
        outcome.log();
        summary.groups.push(outcome);
    }

    Ok(summary)
}

fn merge_group(options: &MergeOptions, prefix: &str, files: &[String]) -> GroupOutcome {
    info!("----- Merging {} file(s) with prefix '{}' -----", files.len(), prefix);

    let mut outcome = GroupOutcome::new(prefix);
    let mut registry = SheetNameRegistry::new();
    let mut workbook = Workbook::new();
    let mut merged_sources = Vec::new();

    for (index, file) in files.iter().enumerate() {
        let path = options.input_dir.join(file);
        info!("Processing file {}/{}: {}", index.saturating_add(1), files.len(), path.display());

        let sheets = match read_workbook(&path) {
            Ok(sheets) => sheets,
            Err(e) => {
                error!("Cannot read {}: {}", file, e);
                outcome.unreadable_files.push(file.clone());
                continue;
            }
        };

        let stem = Path::new(file)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        for &sheet_index in &options.sheet_indices {
            let Some((source_name, dataset)) = sheets.get(sheet_index.saturating_sub(1)) else {
                warn!("{} has no sheet {}, skipping it", file, sheet_index);
                outcome.skipped = outcome.skipped.saturating_add(1);
                continue;
            };

            let base = if sheets.len() == 1 {
                format!("{}{stem}", options.sheet_prefix)
            } else {
                format!("{}{stem}_{source_name}", options.sheet_prefix)
            };
            let name = registry.unique(&base);
            registry.register(&name);
            info!("Writing sheet '{}' of '{}' as '{}'", source_name, file, name);

            match dataset_worksheet(&name, dataset, options.max_column_width) {
                Ok(worksheet) => {
                    workbook.push_worksheet(worksheet);
                    outcome.sheets.push(name);
                }
                Err(e) => {
                    error!("Failed to write sheet '{}': {}", name, e);
                    outcome.skipped = outcome.skipped.saturating_add(1);
                }
            }
        }

        merged_sources.push(path);
    }

    if outcome.sheets.is_empty() {
        delete_sources(options, &merged_sources, &mut outcome);
        return outcome;
    }

    let output = unique_output_path(&options.output_dir, prefix, FALLBACK_OUTPUT_NAME);
    match save_workbook(&mut workbook, &output) {
        Ok(()) => {
            outcome.output = Some(output);
            delete_sources(options, &merged_sources, &mut outcome);
        }
        Err(e) => {
            error!("Failed to save {}: {}", output.display(), e);
            if options.delete_source {
                warn!("Source files of prefix '{}' were kept", prefix);
            }
            outcome.error = Some(e.to_string());
        }
    }
    outcome
}

fn delete_sources(options: &MergeOptions, sources: &[PathBuf], outcome: &mut GroupOutcome) {
    if !options.delete_source {
        return;
    }
    for path in sources {
        let shown = path.display().to_string();
        match std::fs::remove_file(path) {
            Ok(()) => {
                info!("Deleted source file: {}", shown);
                outcome.deleted_files.push(shown);
            }
            Err(e) => {
                error!("Cannot delete {}: {}", shown, e);
                outcome.deletion_failures.push(shown);
            }
        }
    }
}
