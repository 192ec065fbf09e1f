//! Snapshot reconciliation engine.
//!
//! The entry point is [`reconcile`], which joins two calendar snapshots and
//! produces an ordered list of [`ReconciledEvent`]s in three stages:
//!
//! 1. one-to-one outer join on `diff_id` (new / deleted / modified / unchanged)
//! 2. re-match of leftover new and deleted rows on trimmed `unique_id`
//!    (shifted)
//! 3. stable sort by start instant, rows without one last

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::time::Instant;

use crate::diff::model::{
    ChangedField, DiffStatus, DuplicateIdPolicy, ReconcileOptions, ReconciledEvent, ShiftFallback,
};
use crate::errors::ExError;
use crate::model::columns::UNIQUE_ID;
use crate::model::{EventRecord, Snapshot};
use crate::{log_op_end, log_op_error, log_op_start};

/// Reconcile `current` against `previous` with the default policies.
///
/// # Errors
///
/// - `MissingColumn`: either snapshot lacks a column the engine reads
pub fn reconcile(current: &Snapshot, previous: &Snapshot) -> Result<Vec<ReconciledEvent>, ExError> {
    reconcile_with(current, previous, &ReconcileOptions::default())
}

/// Reconcile `current` against `previous`.
///
/// # Errors
///
/// - `MissingColumn`: either snapshot lacks a column the engine reads
pub fn reconcile_with(
    current: &Snapshot,
    previous: &Snapshot,
    options: &ReconcileOptions,
) -> Result<Vec<ReconciledEvent>, ExError> {
    let started = Instant::now();
    log_op_start!(
        "reconcile",
        current_len = current.len(),
        previous_len = previous.len()
    );

    if let Err(err) = current
        .require_columns()
        .and_then(|_| previous.require_columns())
    {
        log_op_error!(
            "reconcile",
            err.clone(),
            duration_ms = started.elapsed().as_millis() as u64
        );
        return Err(ExError::from(err).with_op("reconcile"));
    }

    let mut rows = join_on_diff_id(current, previous);

    let shifted = if current.has_column(UNIQUE_ID) || previous.has_column(UNIQUE_ID) {
        absorb_moved_events(&mut rows, options)
    } else {
        0
    };

    sort_by_start(&mut rows);

    log_op_end!(
        "reconcile",
        duration_ms = started.elapsed().as_millis() as u64,
        output_len = rows.len(),
        shifted_len = shifted
    );
    Ok(rows)
}

/// Annotate a lone snapshot as entirely unchanged, keeping input order.
///
/// Used when no previous snapshot was selected.
pub fn without_baseline(current: &Snapshot) -> Vec<ReconciledEvent> {
    current
        .records
        .iter()
        .cloned()
        .map(|record| ReconciledEvent::new(record, DiffStatus::Unchanged))
        .collect()
}

/// Drop unchanged rows, keeping order.
pub fn changes_only(events: &[ReconciledEvent]) -> Vec<ReconciledEvent> {
    events
        .iter()
        .filter(|e| e.diff_status != DiffStatus::Unchanged)
        .cloned()
        .collect()
}

/// Compare two versions of an event.
///
/// Dates compare as optional values, so two blanks are equal and blank vs
/// set is a change. Rosters compare as sets of non-blank hero ids.
pub fn compare_events(current: &EventRecord, previous: &EventRecord) -> BTreeSet<ChangedField> {
    let mut changed = BTreeSet::new();
    if current.start_time != previous.start_time || current.end_time != previous.end_time {
        changed.insert(ChangedField::Dates);
    }
    if current.featured_roster() != previous.featured_roster() {
        changed.insert(ChangedField::FeaturedHeroes);
    }
    if current.non_featured_roster() != previous.non_featured_roster() {
        changed.insert(ChangedField::NonFeaturedHeroes);
    }
    changed
}

/// Stage 1. Current rows come out in input order, followed by unmatched
/// previous rows in input order.
///
/// The n-th current row with a given `diff_id` pairs with the n-th previous
/// row with that `diff_id`. Rows without a `diff_id` never pair.
fn join_on_diff_id(current: &Snapshot, previous: &Snapshot) -> Vec<ReconciledEvent> {
    let mut pending: HashMap<&str, VecDeque<usize>> = HashMap::new();
    for (i, record) in previous.records.iter().enumerate() {
        if let Some(key) = record.diff_id.as_deref() {
            pending.entry(key).or_default().push_back(i);
        }
    }

    let mut matched = vec![false; previous.len()];
    let mut rows = Vec::with_capacity(current.len() + previous.len());

    for record in &current.records {
        let partner = record
            .diff_id
            .as_deref()
            .and_then(|key| pending.get_mut(key))
            .and_then(VecDeque::pop_front);
        let row = match partner {
            Some(j) => {
                matched[j] = true;
                let changed = compare_events(record, &previous.records[j]);
                ReconciledEvent::compared(record.clone(), changed)
            }
            None => ReconciledEvent::new(record.clone(), DiffStatus::New),
        };
        rows.push(row);
    }

    for (record, _) in previous
        .records
        .iter()
        .zip(&matched)
        .filter(|(_, was_matched)| !**was_matched)
    {
        rows.push(ReconciledEvent::new(record.clone(), DiffStatus::Deleted));
    }

    rows
}

/// Stage 2. Returns the number of rows reclassified as shifted.
fn absorb_moved_events(rows: &mut Vec<ReconciledEvent>, options: &ReconcileOptions) -> usize {
    let pairs = candidate_pairs(rows, options.duplicate_ids);
    if pairs.is_empty() {
        return 0;
    }

    let mut absorbed: BTreeSet<usize> = BTreeSet::new();
    let mut shifted = 0;

    for (new_idx, deleted_idx) in pairs {
        let changed = compare_events(&rows[new_idx].record, &rows[deleted_idx].record);
        if !changed.is_empty() {
            let original_start = rows[deleted_idx].record.start_time.clone();
            let row = &mut rows[new_idx];
            row.diff_status = DiffStatus::Shifted;
            row.changed_fields = changed;
            row.original_start_time = original_start;
            absorbed.insert(deleted_idx);
            shifted += 1;
        } else if options.unchanged_shift == ShiftFallback::MergeAsUnchanged {
            rows[new_idx].diff_status = DiffStatus::Unchanged;
            absorbed.insert(deleted_idx);
        }
    }

    if !absorbed.is_empty() {
        let mut index = 0;
        rows.retain(|_| {
            let keep = !absorbed.contains(&index);
            index += 1;
            keep
        });
    }

    shifted
}

/// `(new_index, deleted_index)` pairs sharing a trimmed `unique_id`, in id
/// order.
fn candidate_pairs(rows: &[ReconciledEvent], policy: DuplicateIdPolicy) -> Vec<(usize, usize)> {
    let mut new_by_id: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    let mut deleted_by_id: BTreeMap<&str, Vec<usize>> = BTreeMap::new();

    for (i, row) in rows.iter().enumerate() {
        let side = match row.diff_status {
            DiffStatus::New => &mut new_by_id,
            DiffStatus::Deleted => &mut deleted_by_id,
            _ => continue,
        };
        if let Some(uid) = row.record.normalized_unique_id() {
            side.entry(uid).or_default().push(i);
        }
    }

    if new_by_id.is_empty() || deleted_by_id.is_empty() {
        return Vec::new();
    }

    let mut pairs = Vec::new();
    for (uid, new_rows) in &new_by_id {
        let Some(deleted_rows) = deleted_by_id.get(uid) else {
            continue;
        };
        match policy {
            DuplicateIdPolicy::LastWins => {
                if let (Some(&n), Some(&d)) = (new_rows.last(), deleted_rows.last()) {
                    pairs.push((n, d));
                }
            }
            DuplicateIdPolicy::PairInOrder => {
                pairs.extend(new_rows.iter().copied().zip(deleted_rows.iter().copied()));
            }
        }
    }
    pairs
}

/// Stage 3. Stable: rows with equal or missing instants keep their order.
fn sort_by_start(rows: &mut [ReconciledEvent]) {
    rows.sort_by_key(|row| {
        let instant = row.record.start_instant();
        (instant.is_none(), instant)
    });
}
