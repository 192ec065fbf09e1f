//! Diff output types.
//!
//! The string forms of [`DiffStatus`] and [`ChangedField`] are the contract
//! with display and post-generation code and must not change.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::errors::CalendiffError;
use crate::model::{EventRecord, TimeField};

/// Classification of one reconciled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStatus {
    /// Present only in the current snapshot
    New,
    /// Present only in the previous snapshot
    Deleted,
    /// Matched on `diff_id` with at least one changed field
    Modified,
    /// Matched on `diff_id` with no changed field
    Unchanged,
    /// Matched only through `unique_id` after its `diff_id` changed
    Shifted,
}

impl DiffStatus {
    pub const ALL: [DiffStatus; 5] = [
        DiffStatus::New,
        DiffStatus::Deleted,
        DiffStatus::Modified,
        DiffStatus::Unchanged,
        DiffStatus::Shifted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiffStatus::New => "new",
            DiffStatus::Deleted => "deleted",
            DiffStatus::Modified => "modified",
            DiffStatus::Unchanged => "unchanged",
            DiffStatus::Shifted => "shifted",
        }
    }
}

impl fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiffStatus {
    type Err = CalendiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiffStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CalendiffError::InvalidConfig {
                reason: format!("unknown diff status '{}'", s),
            })
    }
}

/// Semantic category of a detected change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangedField {
    /// `startDate` or `endDate`
    Dates,
    /// The `H1..H6` roster as a set
    FeaturedHeroes,
    /// The `C1..C6` roster as a set
    NonFeaturedHeroes,
}

impl ChangedField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangedField::Dates => "dates",
            ChangedField::FeaturedHeroes => "featured_heroes",
            ChangedField::NonFeaturedHeroes => "non_featured_heroes",
        }
    }
}

impl fmt::Display for ChangedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One output row of the diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledEvent {
    /// Current-side record when matched or new; previous-side when deleted
    pub record: EventRecord,
    pub diff_status: DiffStatus,
    /// Non-empty iff `diff_status` is modified or shifted
    pub changed_fields: BTreeSet<ChangedField>,
    /// Previous start time; set only on shifted events
    pub original_start_time: Option<TimeField>,
}

impl ReconciledEvent {
    pub fn new(record: EventRecord, diff_status: DiffStatus) -> Self {
        Self {
            record,
            diff_status,
            changed_fields: BTreeSet::new(),
            original_start_time: None,
        }
    }

    /// Build a matched row: modified when anything changed, else unchanged.
    pub fn compared(record: EventRecord, changed_fields: BTreeSet<ChangedField>) -> Self {
        let diff_status = if changed_fields.is_empty() {
            DiffStatus::Unchanged
        } else {
            DiffStatus::Modified
        };
        Self {
            record,
            diff_status,
            changed_fields,
            original_start_time: None,
        }
    }

    pub fn has_change(&self, field: ChangedField) -> bool {
        self.changed_fields.contains(&field)
    }
}

/// How Stage 2 pairs `new` and `deleted` rows that share a `unique_id`
/// with other rows on the same side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateIdPolicy {
    /// Only the last row per id on each side is a candidate; earlier
    /// duplicates keep their Stage 1 status.
    #[default]
    LastWins,
    /// The k-th new row pairs with the k-th deleted row for the same id.
    PairInOrder,
}

/// What Stage 2 does with a pair whose fields are all equal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftFallback {
    /// Leave the pair as separate new and deleted rows.
    #[default]
    KeepNewAndDeleted,
    /// Mark the new row unchanged and absorb the deleted row.
    MergeAsUnchanged,
}

/// Policy knobs for [`reconcile_with`](crate::diff::engine::reconcile_with).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileOptions {
    #[serde(default)]
    pub duplicate_ids: DuplicateIdPolicy,
    #[serde(default)]
    pub unchanged_shift: ShiftFallback,
}

/// Per-status row counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub total: usize,
    pub new: usize,
    pub deleted: usize,
    pub modified: usize,
    pub unchanged: usize,
    pub shifted: usize,
}

impl DiffSummary {
    pub fn from_events(events: &[ReconciledEvent]) -> Self {
        let mut summary = DiffSummary {
            total: events.len(),
            ..DiffSummary::default()
        };
        for event in events {
            *summary.count_mut(event.diff_status) += 1;
        }
        summary
    }

    pub fn count(&self, status: DiffStatus) -> usize {
        match status {
            DiffStatus::New => self.new,
            DiffStatus::Deleted => self.deleted,
            DiffStatus::Modified => self.modified,
            DiffStatus::Unchanged => self.unchanged,
            DiffStatus::Shifted => self.shifted,
        }
    }

    fn count_mut(&mut self, status: DiffStatus) -> &mut usize {
        match status {
            DiffStatus::New => &mut self.new,
            DiffStatus::Deleted => &mut self.deleted,
            DiffStatus::Modified => &mut self.modified,
            DiffStatus::Unchanged => &mut self.unchanged,
            DiffStatus::Shifted => &mut self.shifted,
        }
    }

    /// True when nothing but unchanged rows came out.
    pub fn is_clean(&self) -> bool {
        self.unchanged == self.total
    }
}
