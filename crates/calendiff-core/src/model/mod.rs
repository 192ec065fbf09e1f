//! Event calendar data model.

pub mod event;
pub mod snapshot;

pub use event::{EventRecord, TimeField, HERO_SLOTS};
pub use snapshot::{required_columns, Snapshot};

/// Column names of a calendar export as read by the diff engine.
pub mod columns {
    pub const DIFF_ID: &str = "diff_id";
    pub const UNIQUE_ID: &str = "unique_id";
    pub const START_DATE: &str = "startDate";
    pub const END_DATE: &str = "endDate";
    pub const TYPE: &str = "type";

    /// Featured hero slot prefix (`H1`..`H6`)
    pub const FEATURED_PREFIX: &str = "H";
    /// Non-featured hero slot prefix (`C1`..`C6`)
    pub const NON_FEATURED_PREFIX: &str = "C";

    pub fn featured_slot(i: usize) -> String {
        format!("{}{}", FEATURED_PREFIX, i + 1)
    }

    pub fn non_featured_slot(i: usize) -> String {
        format!("{}{}", NON_FEATURED_PREFIX, i + 1)
    }
}
