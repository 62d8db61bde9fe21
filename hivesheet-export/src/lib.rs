//! Library module for hivesheet-export
//!
//! Holds the command-line surface and the run helpers so they can be tested
//! without a Hive server. The binary entry point is in main.rs.

use clap::{Args, Parser, Subcommand};
use hivesheet_core::adapters::{HiveConfig, HiveConnector, with_session};
use hivesheet_core::export::DEFAULT_EXPORT_DIR;
use hivesheet_core::security::DEFAULT_SECRETS_PATH;
use hivesheet_core::sheet::width::DEFAULT_MAX_COLUMN_WIDTH;
use hivesheet_core::{
    Credentials, ExportOptions, ExportSummary, HiveSheetError, Result, TableExporter, load_secrets,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "hivesheet-export")]
#[command(about = "Export Hive tables to Excel workbooks")]
#[command(version)]
#[command(long_about = "
hivesheet-export - one workbook per Hive table

Every table in DATABASE whose name matches PREFIX is written to its own
.xlsx file, named after the table comment (or the table name when there is
none). Each workbook has three sheets:
- 数据: the table rows, headed by column comments
- 表信息: table name, comment and row count
- 列信息: name, type and comment of every column

Connection settings are read from a JSON secrets file:
  {\"hive\": {\"host\": \"...\", \"port\": 10000, \"username\": \"...\", \"password\": \"...\"}}

EXAMPLES:
  hivesheet-export --database dws --prefix dws_orders_ --output ./input
  hivesheet-export --secrets /etc/hivesheet/secrets.json test
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub export: ExportArgs,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Open and close a session to check connectivity
    Test,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
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

    /// Secrets file with the Hive connection settings
    #[arg(
        long,
        global = true,
        env = "HIVESHEET_SECRETS",
        default_value = DEFAULT_SECRETS_PATH,
        value_name = "FILE"
    )]
    pub secrets: PathBuf,

    /// Login timeout in seconds
    #[arg(long, global = true, default_value_t = 30, value_name = "SECS")]
    pub connect_timeout: u64,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Database holding the tables
    #[arg(short, long, env = "HIVESHEET_DATABASE")]
    pub database: Option<String>,

    /// Table-name prefix; matched with SHOW TABLES LIKE '<prefix>*'
    #[arg(short, long, env = "HIVESHEET_PREFIX")]
    pub prefix: Option<String>,

    /// Directory the workbooks are written to
    #[arg(short, long, default_value = DEFAULT_EXPORT_DIR, value_name = "DIR")]
    pub output: PathBuf,

    /// Upper bound for column widths
    #[arg(long, default_value_t = DEFAULT_MAX_COLUMN_WIDTH)]
    pub max_width: usize,

    /// Also write the run summary as JSON
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

impl ExportArgs {
    /// Builds validated exporter options.
    ///
    /// # Errors
    /// Returns a configuration error if the database or prefix is missing or
    /// unusable.
    pub fn to_options(&self) -> Result<ExportOptions> {
        let database = self.database.as_deref().ok_or_else(|| {
            HiveSheetError::configuration("--database is required (or set HIVESHEET_DATABASE)")
        })?;
        let prefix = self.prefix.as_deref().ok_or_else(|| {
            HiveSheetError::configuration("--prefix is required (or set HIVESHEET_PREFIX)")
        })?;

        let options = ExportOptions::new(database, prefix)
            .with_output_dir(&self.output)
            .with_max_column_width(self.max_width);
        options.validate()?;
        Ok(options)
    }
}

/// Loads connection settings from the secrets file.
///
/// # Errors
/// Returns a configuration error if the file is unreadable or incomplete.
pub fn load_connection(secrets: &Path, connect_timeout: u64) -> Result<(HiveConfig, Credentials)> {
    let (config, credentials) = HiveConfig::from_secrets(load_secrets(secrets).as_ref())?;
    let config = config.with_connect_timeout(Duration::from_secs(connect_timeout));
    config.validate()?;
    Ok((config, credentials))
}

/// Runs one export and writes the optional JSON report.
///
/// # Errors
/// Returns run-level failures; failed tables are only listed in the summary.
pub fn run_export(
    args: &ExportArgs,
    connector: &dyn HiveConnector,
    config: &HiveConfig,
    credentials: &Credentials,
) -> Result<ExportSummary> {
    let options = args.to_options()?;
    info!(
        "Exporting tables '{}*' of database '{}' to {}",
        options.prefix,
        options.database,
        options.output_dir.display()
    );

    let summary = TableExporter::new(options).run(connector, config, credentials)?;

    if let Some(path) = &args.report {
        write_report(&summary, path)?;
        info!("Run summary written to {}", path.display());
    }
    Ok(summary)
}

fn write_report(summary: &ExportSummary, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).map_err(|e| HiveSheetError::Serialization {
        context: "serializing export summary".to_string(),
        source: e,
    })?;
    std::fs::write(path, json)
        .map_err(|e| HiveSheetError::io(format!("writing report {}", path.display()), e))
}

/// Opens a session, lists databases and closes it.
///
/// # Errors
/// Returns configuration and connection errors, or the failure of `SHOW DATABASES`.
pub fn test_connection(
    connector: &dyn HiveConnector,
    config: &HiveConfig,
    credentials: &Credentials,
) -> Result<usize> {
    with_session(connector, config, credentials, |session| {
        session.query("SHOW DATABASES").map(|rows| rows.len())
    })
}
