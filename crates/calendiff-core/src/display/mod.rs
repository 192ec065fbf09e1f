//! Display formatting for reconciled events.
//!
//! Everything here runs after the diff and only reads its output:
//!
//! - [`time`] converts origin-shifted timestamps into zoned datetimes
//! - [`rules`] is a first-match-wins interpreter over type-mapping rules
//! - [`format`] builds [`DisplayRow`]s (translated heroes, date strings)
//! - [`html`] renders rows into a styled HTML table

pub mod format;
pub mod html;
pub mod rules;
pub mod time;

pub use format::{date_bounds, filter_by_date_range, format_events, keys, DisplayRow};
pub use html::{class_name, default_labels, to_html_table, STANDARD_COLUMNS};
pub use rules::{Condition, ConditionTest, DisplayInfo, RuleSet, TypeRule, BASE_ICON_URL};
pub use time::{format_duration, to_datetime, Zone};
