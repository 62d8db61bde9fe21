//! Library module for the hivesheet merge tool
//!
//! Exposes the command-line surface for testing. The binary entry point is
//! in main.rs. Nothing here touches the network.

use clap::{Args, Parser, Subcommand};
use hivesheet_core::merge::{DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR};
use hivesheet_core::sheet::width::DEFAULT_MAX_COLUMN_WIDTH;
use hivesheet_core::{HiveSheetError, MergeOptions, MergeSummary, Result, merge_workbooks};
use std::path::{Path, PathBuf};
use tracing::info;

/// Command-line interface for the workbook merger
#[derive(Parser, Debug)]
#[command(name = "hivesheet")]
#[command(about = "Merge Excel workbooks by file-name prefix")]
#[command(version)]
pub struct Cli {
    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true, help = "Suppress all output except errors")]
    pub quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge selected sheets of many workbooks into one workbook per group
    Merge(MergeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct MergeArgs {
    /// Directory holding the source workbooks
    #[arg(short, long, default_value = DEFAULT_INPUT_DIR, value_name = "DIR")]
    pub input: PathBuf,

    /// Directory the merged workbooks are written to
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR, value_name = "DIR")]
    pub output: PathBuf,

    /// Merge only files starting with this prefix, as a single group
    #[arg(long, value_name = "PREFIX")]
    pub file_prefix: Option<String>,

    /// Prepended to every merged sheet name
    #[arg(long, default_value = "", value_name = "PREFIX")]
    pub sheet_prefix: String,

    /// Delete each source file after its sheets are merged
    #[arg(long)]
    pub delete_source: bool,

    /// 1-based sheet positions to take from each file
    #[arg(long, value_delimiter = ',', default_value = "1", value_name = "N,...")]
    pub sheets: Vec<usize>,

    /// Upper bound for column widths
    #[arg(long, default_value_t = DEFAULT_MAX_COLUMN_WIDTH)]
    pub max_width: usize,

    /// Also write the run summary as JSON
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

impl MergeArgs {
    /// Builds merger options from the parsed flags.
    pub fn to_options(&self) -> MergeOptions {
        let mut options = MergeOptions::new(&self.input, &self.output)
            .with_sheet_prefix(self.sheet_prefix.as_str())
            .with_delete_source(self.delete_source)
            .with_sheet_indices(self.sheets.clone())
            .with_max_column_width(self.max_width);
        if let Some(prefix) = &self.file_prefix {
            options = options.with_file_prefix(prefix.as_str());
        }
        options
    }
}

/// Runs one merge and writes the optional JSON report.
///
/// # Errors
/// Returns invalid-option and directory errors; per-file problems are only
/// recorded in the summary.
pub fn run_merge(args: &MergeArgs) -> Result<MergeSummary> {
    let options = args.to_options();
    info!(
        "Merging workbooks from {} into {}",
        options.input_dir.display(),
        options.output_dir.display()
    );

    let summary = merge_workbooks(&options)?;
    info!(
        "Wrote {} workbook(s) with {} sheet(s)",
        summary.outputs().len(),
        summary.sheets_written()
    );

    if let Some(path) = &args.report {
        write_report(&summary, path)?;
        info!("Run summary written to {}", path.display());
    }
    Ok(summary)
}

fn write_report(summary: &MergeSummary, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).map_err(|e| HiveSheetError::Serialization {
        context: "serializing merge summary".to_string(),
        source: e,
    })?;
    std::fs::write(path, json)
        .map_err(|e| HiveSheetError::io(format!("writing report {}", path.display()), e))
}
