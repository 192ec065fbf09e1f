//! calendiff core - event calendar snapshot reconciliation
//!
//! This crate provides the domain layer behind the calendar dashboard:
//! - Event records and tabular snapshots loaded from calendar CSV exports
//! - The snapshot diff engine (new / deleted / modified / unchanged / shifted)
//! - Display formatting: timezone conversion, type-mapping rules, hero
//!   translation and HTML table rendering
//! - Template processing for forum and Discord post text
//!
//! The diff engine is pure; loading and rendering live in their own modules.

pub mod config;
pub mod diff;
pub mod display;
pub mod errors;
pub mod loader;
pub mod logging_facility;
pub mod model;
pub mod posts;
pub mod template;
pub mod translation;

// Re-export commonly used types
pub use config::DashboardConfig;
pub use diff::engine::{changes_only, reconcile, reconcile_with, without_baseline};
pub use diff::human_summary::render_human_summary;
pub use diff::model::{
    ChangedField, DiffStatus, DiffSummary, DuplicateIdPolicy, ReconcileOptions, ReconciledEvent,
    ShiftFallback,
};
pub use display::{DisplayRow, RuleSet, Zone};
pub use errors::{CalendiffError, ExError, ExErrorKind, Result};
pub use model::{EventRecord, Snapshot, TimeField};
pub use translation::HeroTranslator;
