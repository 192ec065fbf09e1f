//! Reconciliation scenarios over in-memory snapshots.
//!
//! All tests build snapshots from records directly (no I/O).

#![allow(clippy::unwrap_used, clippy::expect_used)]

use calendiff_core::diff::engine::{changes_only, reconcile, reconcile_with, without_baseline};
use calendiff_core::diff::model::{
    ChangedField, DiffStatus, DiffSummary, DuplicateIdPolicy, ReconcileOptions, ShiftFallback,
};
use calendiff_core::errors::ExErrorKind;
use calendiff_core::model::{required_columns, EventRecord, Snapshot, TimeField};
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn snap(name: &str, records: Vec<EventRecord>) -> Snapshot {
    Snapshot::from_records(name, records)
}

fn event(diff_id: &str, start: i64, end: i64) -> EventRecord {
    EventRecord::default()
        .with_diff_id(diff_id)
        .with_times(start, end)
}

fn ids(rows: &[calendiff_core::ReconciledEvent]) -> Vec<String> {
    rows.iter()
        .map(|r| r.record.diff_id.clone().unwrap_or_default())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// S1: A featured roster swap is a modification with only that field changed
#[test]
fn test_featured_roster_change_is_modified() {
    let current = snap("cur", vec![event("e1", 100, 200).with_featured(&["hero_a"])]);
    let previous = snap("prev", vec![event("e1", 100, 200).with_featured(&["hero_b"])]);

    let rows = reconcile(&current, &previous).unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].diff_status, DiffStatus::Modified);
    assert_eq!(
        rows[0].changed_fields,
        BTreeSet::from([ChangedField::FeaturedHeroes])
    );
    assert_eq!(rows[0].record.start_time, Some(TimeField::Instant(100)));
    assert_eq!(rows[0].record.featured_heroes[0].as_deref(), Some("hero_a"));
}

// S2: New, deleted, unchanged and modified rows in one pass
#[test]
fn test_outer_join_classifies_every_row() {
    let current = snap(
        "cur",
        vec![
            event("keep", 10, 20),
            event("move", 30, 45),
            event("fresh", 50, 60),
        ],
    );
    let previous = snap(
        "prev",
        vec![
            event("keep", 10, 20),
            event("move", 30, 40),
            event("gone", 5, 6),
        ],
    );

    let rows = reconcile(&current, &previous).unwrap();

    assert_eq!(ids(&rows), vec!["gone", "keep", "move", "fresh"]);
    let statuses: Vec<DiffStatus> = rows.iter().map(|r| r.diff_status).collect();
    assert_eq!(
        statuses,
        vec![
            DiffStatus::Deleted,
            DiffStatus::Unchanged,
            DiffStatus::Modified,
            DiffStatus::New
        ]
    );
    assert_eq!(rows[2].changed_fields, BTreeSet::from([ChangedField::Dates]));
    assert_eq!(rows[0].record.start_time, Some(TimeField::Instant(5)));
}

// S3: Reordered and duplicated roster slots are not a change
#[test]
fn test_roster_order_is_ignored() {
    let current = snap(
        "cur",
        vec![event("e1", 1, 2)
            .with_featured(&["a", "b", "c"])
            .with_non_featured(&["x", "", "y"])],
    );
    let previous = snap(
        "prev",
        vec![event("e1", 1, 2)
            .with_featured(&["c", "a", "b", "a"])
            .with_non_featured(&["y", "x"])],
    );

    let rows = reconcile(&current, &previous).unwrap();
    assert_eq!(rows[0].diff_status, DiffStatus::Unchanged);
    assert!(rows[0].changed_fields.is_empty());
}

// S4: Non-featured roster change is tracked separately
#[test]
fn test_non_featured_change_and_date_change_together() {
    let current = snap(
        "cur",
        vec![event("e1", 1, 3).with_non_featured(&["x", "z"])],
    );
    let previous = snap(
        "prev",
        vec![event("e1", 1, 2).with_non_featured(&["x", "y"])],
    );

    let rows = reconcile(&current, &previous).unwrap();
    assert_eq!(
        rows[0].changed_fields,
        BTreeSet::from([ChangedField::Dates, ChangedField::NonFeaturedHeroes])
    );
}

// S5: Missing dates on both sides compare equal; one-sided is a change
#[test]
fn test_null_dates() {
    let both_null_cur = EventRecord::default().with_diff_id("n");
    let both_null_prev = EventRecord::default().with_diff_id("n");
    let one_null_cur = EventRecord::default().with_diff_id("o");
    let one_null_prev = event("o", 100, 200);

    let rows = reconcile(
        &snap("cur", vec![both_null_cur, one_null_cur]),
        &snap("prev", vec![both_null_prev, one_null_prev]),
    )
    .unwrap();

    let by_id = |id: &str| rows.iter().find(|r| r.record.diff_id.as_deref() == Some(id)).unwrap();
    assert_eq!(by_id("n").diff_status, DiffStatus::Unchanged);
    assert_eq!(by_id("o").diff_status, DiffStatus::Modified);
    assert!(by_id("o").has_change(ChangedField::Dates));
}

// S6: A regenerated diff_id with a stable unique_id becomes one shifted row
#[test]
fn test_shift_absorbs_deleted_counterpart() {
    let current = snap(
        "cur",
        vec![event("d-new", 500, 600).with_unique_id("U1")],
    );
    let previous = snap(
        "prev",
        vec![event("d-old", 100, 200).with_unique_id(" U1 ")],
    );

    let rows = reconcile(&current, &previous).unwrap();

    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.diff_status, DiffStatus::Shifted);
    assert!(row.has_change(ChangedField::Dates));
    assert_eq!(row.original_start_time, Some(TimeField::Instant(100)));
    assert_eq!(row.record.diff_id.as_deref(), Some("d-new"));
}

// S7: Shift detection is skipped when neither snapshot has unique_id
#[test]
fn test_no_unique_id_column_means_no_shift_stage() {
    let current = snap("cur", vec![event("d-new", 500, 600)]);
    let previous = snap("prev", vec![event("d-old", 100, 200)]);
    assert!(!current.has_column("unique_id"));

    let rows = reconcile(&current, &previous).unwrap();
    let statuses: Vec<DiffStatus> = rows.iter().map(|r| r.diff_status).collect();
    assert_eq!(statuses, vec![DiffStatus::Deleted, DiffStatus::New]);
}

// S8: An id-only churn keeps new + deleted by default
#[test]
fn test_unchanged_shift_keeps_new_and_deleted_by_default() {
    let current = snap("cur", vec![event("d2", 100, 200).with_unique_id("U")]);
    let previous = snap("prev", vec![event("d1", 100, 200).with_unique_id("U")]);

    let rows = reconcile(&current, &previous).unwrap();
    let statuses: BTreeSet<DiffStatus> = rows.iter().map(|r| r.diff_status).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(statuses, BTreeSet::from([DiffStatus::New, DiffStatus::Deleted]));
    assert!(rows.iter().all(|r| r.original_start_time.is_none()));
}

// S9: MergeAsUnchanged folds an id-only churn into one unchanged row
#[test]
fn test_unchanged_shift_merge_policy() {
    let current = snap("cur", vec![event("d2", 100, 200).with_unique_id("U")]);
    let previous = snap("prev", vec![event("d1", 100, 200).with_unique_id("U")]);
    let options = ReconcileOptions {
        unchanged_shift: ShiftFallback::MergeAsUnchanged,
        ..ReconcileOptions::default()
    };

    let rows = reconcile_with(&current, &previous, &options).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].diff_status, DiffStatus::Unchanged);
    assert!(rows[0].changed_fields.is_empty());
    assert_eq!(rows[0].record.diff_id.as_deref(), Some("d2"));
}

// S10: Duplicate unique_ids pair last-to-last by default
#[test]
fn test_duplicate_unique_ids_last_wins() {
    let current = snap(
        "cur",
        vec![
            event("n1", 10, 11).with_unique_id("U"),
            event("n2", 20, 21).with_unique_id("U"),
        ],
    );
    let previous = snap(
        "prev",
        vec![
            event("o1", 1, 2).with_unique_id("U"),
            event("o2", 3, 4).with_unique_id("U"),
        ],
    );

    let rows = reconcile(&current, &previous).unwrap();
    let summary = DiffSummary::from_events(&rows);
    assert_eq!(summary.shifted, 1);
    assert_eq!(summary.new, 1);
    assert_eq!(summary.deleted, 1);

    let shifted = rows
        .iter()
        .find(|r| r.diff_status == DiffStatus::Shifted)
        .unwrap();
    assert_eq!(shifted.record.diff_id.as_deref(), Some("n2"));
    assert_eq!(shifted.original_start_time, Some(TimeField::Instant(3)));
    let deleted = rows
        .iter()
        .find(|r| r.diff_status == DiffStatus::Deleted)
        .unwrap();
    assert_eq!(deleted.record.diff_id.as_deref(), Some("o1"));
}

// S11: PairInOrder pairs every duplicate
#[test]
fn test_duplicate_unique_ids_pair_in_order() {
    let current = snap(
        "cur",
        vec![
            event("n1", 10, 11).with_unique_id("U"),
            event("n2", 20, 21).with_unique_id("U"),
            event("n3", 30, 31).with_unique_id("U"),
        ],
    );
    let previous = snap(
        "prev",
        vec![
            event("o1", 1, 2).with_unique_id("U"),
            event("o2", 3, 4).with_unique_id("U"),
        ],
    );
    let options = ReconcileOptions {
        duplicate_ids: DuplicateIdPolicy::PairInOrder,
        ..ReconcileOptions::default()
    };

    let rows = reconcile_with(&current, &previous, &options).unwrap();
    let summary = DiffSummary::from_events(&rows);
    assert_eq!((summary.shifted, summary.new, summary.deleted), (2, 1, 0));

    let originals: Vec<(String, Option<TimeField>)> = rows
        .iter()
        .filter(|r| r.diff_status == DiffStatus::Shifted)
        .map(|r| (r.record.diff_id.clone().unwrap(), r.original_start_time.clone()))
        .collect();
    assert_eq!(
        originals,
        vec![
            ("n1".to_string(), Some(TimeField::Instant(1))),
            ("n2".to_string(), Some(TimeField::Instant(3)))
        ]
    );
}

// S12: Missing and unparsed start times sort last in input order
#[test]
fn test_sort_places_undated_rows_last() {
    let current = snap(
        "cur",
        vec![
            EventRecord::default().with_diff_id("no-date"),
            event("late", 900, 901),
            EventRecord::default()
                .with_diff_id("garbled")
                .with_start_time(Some(TimeField::Unparsed("tbd".into()))),
            event("early", 100, 101),
        ],
    );

    let rows = reconcile(&current, &snap("prev", vec![])).unwrap();
    assert_eq!(ids(&rows), vec!["early", "late", "no-date", "garbled"]);
    assert!(rows.iter().all(|r| r.diff_status == DiffStatus::New));
}

// S13: Reconciling against itself is all unchanged
#[test]
fn test_self_reconcile_is_unchanged() {
    let records = vec![
        event("a", 3, 4).with_featured(&["h1"]).with_unique_id("u-a"),
        event("b", 1, 2).with_extra("type", "gacha"),
        EventRecord::default().with_diff_id("c"),
    ];
    let s = snap("same", records);

    let rows = reconcile(&s, &s.clone()).unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows
        .iter()
        .all(|r| r.diff_status == DiffStatus::Unchanged && r.changed_fields.is_empty()));
}

// S14: Passthrough columns survive untouched
#[test]
fn test_passthrough_fields_are_preserved() {
    let current = snap(
        "cur",
        vec![event("e1", 1, 2).with_extra("questline", "img_gen=abc&x=1")],
    );
    let rows = reconcile(&current, &snap("prev", vec![])).unwrap();
    assert_eq!(
        rows[0].record.extra.get("questline").map(String::as_str),
        Some("img_gen=abc&x=1")
    );
}

// S15: A missing required column is fatal and names the column
#[test]
fn test_missing_required_column_is_error() {
    let current = snap("cur", vec![event("e1", 1, 2)]);
    let previous = Snapshot::new(
        "prev",
        vec!["diff_id".into(), "startDate".into(), "endDate".into()],
        vec![],
    );

    let err = reconcile(&current, &previous).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::MissingColumn);
    assert_eq!(err.code(), "ERR_MISSING_COLUMN");
    assert_eq!(err.op(), Some("reconcile"));
    assert_eq!(err.entity_id(), Some("prev"));
    assert_eq!(err.column(), Some("H1"));
}

// S16: No baseline means everything unchanged, in input order
#[test]
fn test_without_baseline() {
    let current = snap("cur", vec![event("b", 9, 10), event("a", 1, 2)]);
    let rows = without_baseline(&current);
    assert_eq!(ids(&rows), vec!["b", "a"]);
    assert!(changes_only(&rows).is_empty());
}

// S17: changes_only drops unchanged rows and keeps order
#[test]
fn test_changes_only() {
    let current = snap("cur", vec![event("a", 1, 2), event("b", 3, 4)]);
    let previous = snap("prev", vec![event("a", 1, 2)]);
    let rows = reconcile(&current, &previous).unwrap();
    let changed = changes_only(&rows);
    assert_eq!(ids(&changed), vec!["b"]);
}

// S18: Output is deterministic and serializes to the status vocabulary
#[test]
fn test_output_is_deterministic_and_serializable() {
    let current = snap("cur", vec![event("x", 5, 6).with_unique_id("U"), event("y", 1, 1)]);
    let previous = snap("prev", vec![event("z", 4, 6).with_unique_id("U")]);

    let a = reconcile(&current, &previous).unwrap();
    let b = reconcile(&current, &previous).unwrap();
    assert_eq!(a, b);

    let json = serde_json::to_value(&a).unwrap();
    assert_eq!(json[0]["diff_status"], "new");
    assert_eq!(json[1]["diff_status"], "shifted");
    assert_eq!(json[1]["changed_fields"][0], "dates");
    assert_eq!(json[1]["original_start_time"], 4);
}

// S19: unique_id on only one side still runs shift detection
#[test]
fn test_one_sided_unique_id_column_runs_shift_stage() {
    let current = snap("cur", vec![event("d-new", 500, 600).with_unique_id("U1")]);
    assert!(current.has_column("unique_id"));

    // Header without unique_id; ids set on records are still compared
    let with_ids = Snapshot::new(
        "prev",
        required_columns(),
        vec![event("d-old", 100, 200).with_unique_id("U1")],
    );
    assert!(!with_ids.has_column("unique_id"));

    let rows = reconcile(&current, &with_ids).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].diff_status, DiffStatus::Shifted);
    assert_eq!(rows[0].original_start_time, Some(TimeField::Instant(100)));

    let reversed = reconcile(&with_ids, &current).unwrap();
    assert_eq!(reversed.len(), 1);
    assert_eq!(reversed[0].diff_status, DiffStatus::Shifted);
    assert_eq!(reversed[0].original_start_time, Some(TimeField::Instant(500)));
}

// S20: Previous side without the column yields no shift pairs
#[test]
fn test_one_sided_unique_id_column_without_partner_ids() {
    let current = snap(
        "cur",
        vec![
            event("d-new", 500, 600).with_unique_id("U1"),
            event("e1", 50, 60).with_unique_id("U2"),
        ],
    );
    let previous = Snapshot::new(
        "prev",
        required_columns(),
        vec![event("d-old", 100, 200), event("e1", 50, 60)],
    );

    let rows = reconcile(&current, &previous).unwrap();
    let statuses: Vec<DiffStatus> = rows.iter().map(|r| r.diff_status).collect();
    assert_eq!(
        statuses,
        vec![DiffStatus::Unchanged, DiffStatus::Deleted, DiffStatus::New]
    );
    assert_eq!(ids(&rows), vec!["e1", "d-old", "d-new"]);
    assert!(rows.iter().all(|r| r.original_start_time.is_none()));
}
