//! Hive table export tool.
//!
//! Connects to HiveServer2, finds the tables matching a prefix and writes
//! one Excel workbook per table.
//!
//! # Security Guarantees
//! - Read-only statements only
//! - Credentials come from the secrets file and are never logged

use anyhow::Context;
use clap::Parser;
use hivesheet_core::{create_connector, logging::init_logging};
use hivesheet_export::{Cli, Command, load_connection, run_export, test_connection};
use tracing::{error, info, warn};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet)?;

    let (config, credentials) = load_connection(&cli.global.secrets, cli.global.connect_timeout)
        .map_err(|e| {
            error!("{}", e);
            e
        })
        .with_context(|| format!("loading {}", cli.global.secrets.display()))?;

    let connector = create_connector().map_err(|e| {
        error!("Failed to create Hive connector: {}", e);
        e
    })?;

    match cli.command {
        Some(Command::Test) => {
            info!("Testing connection to {}...", config);
            let databases = test_connection(connector.as_ref(), &config, &credentials)?;
            info!("✓ Connection test successful");
            println!("Connection to {config} successful ({databases} databases visible)");
        }
        None => {
            let summary = run_export(&cli.export, connector.as_ref(), &config, &credentials)
                .map_err(|e| {
                    error!("Export failed: {}", e);
                    e
                })?;
            if !summary.is_complete() {
                warn!(
                    "{} of {} table(s) were not exported",
                    summary.failed_tables().len(),
                    summary.expected
                );
            }
        }
    }

    Ok(())
}
