//! Diff command

use calendiff_core::diff::engine::changes_only;
use calendiff_core::{log_op_end, log_op_start, render_human_summary, DashboardConfig};
use clap::{Args, ValueEnum};
use std::time::Instant;

use super::{reconciled_events, SnapshotArgs};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Markdown summary
    Text,
    /// Reconciled events as a JSON array
    Json,
}

#[derive(Debug, Args)]
pub struct DiffArgs {
    #[command(flatten)]
    pub snapshots: SnapshotArgs,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Leave unchanged rows out
    #[arg(long)]
    pub changes_only: bool,
}

pub fn execute(args: DiffArgs, config: &DashboardConfig) -> Result<(), Box<dyn std::error::Error>> {
    let started = Instant::now();
    log_op_start!("cli_diff");

    let mut events = reconciled_events(&args.snapshots, config)?;
    if args.changes_only {
        events = changes_only(&events);
    }

    match args.format {
        OutputFormat::Text => print!("{}", render_human_summary(&events)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&events)?),
    }

    log_op_end!(
        "cli_diff",
        duration_ms = started.elapsed().as_millis() as u64,
        output_len = events.len()
    );
    Ok(())
}
