//! Table command

use calendiff_core::diff::model::DiffStatus;
use calendiff_core::display::{default_labels, to_html_table, STANDARD_COLUMNS};
use calendiff_core::DashboardConfig;
use clap::Args;
use std::path::PathBuf;

use super::{display_rows, DisplayArgs};

#[derive(Debug, Args)]
pub struct TableArgs {
    #[command(flatten)]
    pub display: DisplayArgs,

    /// Write the HTML here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Leave unchanged rows out
    #[arg(long)]
    pub changes_only: bool,
}

pub fn execute(args: TableArgs, config: &DashboardConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut rows = display_rows(&args.display, config)?;
    if args.changes_only {
        rows.retain(|r| r.diff_status != DiffStatus::Unchanged);
    }

    let html = to_html_table(&rows, &STANDARD_COLUMNS, &default_labels());

    match args.output {
        Some(path) => {
            std::fs::write(&path, html)?;
            tracing::info!(path = %path.display(), rows = rows.len(), "table written");
            println!("Table written:");
            println!("  path: {}", path.display());
            println!("  rows: {}", rows.len());
        }
        None => println!("{}", html),
    }

    Ok(())
}
