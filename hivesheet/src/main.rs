//! Workbook merge tool.
//!
//! Combines the workbooks written by hivesheet-export (or any `.xlsx`
//! files) into one workbook per file-name prefix. Works offline.

use clap::Parser;
use hivesheet::{Cli, Commands, run_merge};
use hivesheet_core::logging::init_logging;
use tracing::error;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet)?;

    match cli.command {
        Some(Commands::Merge(args)) => {
            run_merge(&args).map_err(|e| {
                error!("Merge failed: {}", e);
                e
            })?;
        }
        None => {
            println!("hivesheet v{}", env!("CARGO_PKG_VERSION"));
            println!("Merge Excel workbooks by file-name prefix");
            println!("Use --help for available commands");
        }
    }

    Ok(())
}
