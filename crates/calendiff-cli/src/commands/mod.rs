//! Subcommands and the input handling they share

pub mod diff;
pub mod post;
pub mod table;

use calendiff_core::diff::engine::{reconcile_with, without_baseline};
use calendiff_core::display::{filter_by_date_range, format_events, DisplayRow, Zone};
use calendiff_core::loader::{load_hero_master, load_rules, load_snapshot};
use calendiff_core::{DashboardConfig, ExError, ExErrorKind, ReconciledEvent};
use chrono::NaiveDate;
use clap::Args;
use std::error::Error;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    /// Current calendar export (defaults to the configured event_folder)
    #[arg(long)]
    pub current: Option<PathBuf>,

    /// Previous calendar export; without one every row is unchanged
    #[arg(long)]
    pub previous: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct DisplayArgs {
    #[command(flatten)]
    pub snapshots: SnapshotArgs,

    /// Type-mapping rules (JSON)
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Hero master (CSV)
    #[arg(long)]
    pub heroes: Option<PathBuf>,

    /// Display timezone: UTC or JST
    #[arg(long)]
    pub tz: Option<Zone>,

    /// First start date to keep (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last start date to keep (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

pub fn reconciled_events(
    args: &SnapshotArgs,
    config: &DashboardConfig,
) -> Result<Vec<ReconciledEvent>, Box<dyn Error>> {
    let current_path = args
        .current
        .clone()
        .or_else(|| config.current_snapshot_path())
        .ok_or_else(|| {
            ExError::new(ExErrorKind::InvalidInput)
                .with_op("reconciled_events")
                .with_message("Must specify --current or set event_folder in the config")
        })?;
    let current = load_snapshot(&current_path)?;

    let previous = match (&args.previous, config.previous_snapshot_path()) {
        (Some(path), _) => Some(load_snapshot(path)?),
        // A configured baseline that is missing on disk only disables the diff
        (None, Some(path)) => match load_snapshot(&path) {
            Ok(snapshot) => Some(snapshot),
            Err(err) if err.kind() == ExErrorKind::NotFound => {
                tracing::warn!(
                    snapshot_path = %path.display(),
                    "Configured previous export not found, showing events without diff"
                );
                None
            }
            Err(err) => return Err(err.into()),
        },
        (None, None) => None,
    };

    match previous {
        Some(previous) => Ok(reconcile_with(&current, &previous, &config.reconcile)?),
        None => Ok(without_baseline(&current)),
    }
}

/// Reconcile, resolve display info and apply the date filter.
pub fn display_rows(
    args: &DisplayArgs,
    config: &DashboardConfig,
) -> Result<Vec<DisplayRow>, Box<dyn Error>> {
    let events = reconciled_events(&args.snapshots, config)?;
    let rules = load_rules(args.rules.as_ref().unwrap_or(&config.files.rules))?;
    let heroes = load_hero_master(args.heroes.as_ref().unwrap_or(&config.files.hero_master))?;
    let zone = args.tz.unwrap_or(config.timezone);

    let rows = format_events(&events, &rules, &heroes, zone);

    let from = args.from.or(config.filter_start_date);
    let to = args.to.or(config.filter_end_date);
    if from.is_none() && to.is_none() {
        return Ok(rows);
    }
    Ok(filter_by_date_range(&rows, from, to))
}
