//! calendiff CLI
//!
//! Command-line front end for calendar snapshot diffs

use calendiff_core::logging_facility::{init, Profile};
use calendiff_core::{DashboardConfig, ExError, ExErrorKind};
use calendiff_core_types::correlation::RequestContext;
use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "calendiff")]
#[command(about = "calendiff - Calendar export diffs, tables and posts", long_about = None)]
struct Cli {
    /// Dashboard configuration (TOML); flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit JSON log lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Reconcile two exports and print the diff
    Diff(commands::diff::DiffArgs),
    /// Render the review table as HTML
    Table(commands::table::TableArgs),
    /// Render forum or Discord posts
    Post(commands::post::PostArgs),
}

fn main() {
    let cli = Cli::parse();

    init(Profile::from_json_flag(cli.log_json));

    let ctx = RequestContext::new().with_command(match &cli.command {
        Commands::Diff(_) => "diff",
        Commands::Table(_) => "table",
        Commands::Post(_) => "post",
    });
    let _span = tracing::info_span!(
        "request",
        request_id = %ctx.request_id,
        command = ctx.command_label()
    )
    .entered();

    let config = match &cli.config {
        Some(path) => DashboardConfig::load(path),
        None => Ok(DashboardConfig::default()),
    };
    let result = match config {
        Ok(config) => match cli.command {
            Commands::Diff(args) => commands::diff::execute(args, &config),
            Commands::Table(args) => commands::table::execute(args, &config),
            Commands::Post(args) => commands::post::execute(args, &config),
        },
        Err(e) => Err(ExError::from(e).into()),
    };

    if let Err(e) = result {
        let err = structured(e).with_request_id(ctx.request_id.clone());
        tracing::debug!(code = err.code(), "command failed");
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

/// Errors without a kind of their own are reported as internal.
fn structured(err: Box<dyn Error>) -> ExError {
    match err.downcast::<ExError>() {
        Ok(err) => *err,
        Err(other) => ExError::new(ExErrorKind::Internal).with_message(other.to_string()),
    }
}
