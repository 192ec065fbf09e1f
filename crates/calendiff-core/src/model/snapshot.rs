//! A point-in-time calendar export.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::columns;
use super::event::{EventRecord, HERO_SLOTS};
use crate::errors::CalendiffError;

/// All rows of one calendar export plus its column header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Label used in diagnostics (usually the export folder or file name)
    pub name: String,
    /// Header in file order
    pub columns: Vec<String>,
    pub records: Vec<EventRecord>,
}

impl Snapshot {
    pub fn new(name: impl Into<String>, columns: Vec<String>, records: Vec<EventRecord>) -> Self {
        Self {
            name: name.into(),
            columns,
            records,
        }
    }

    /// Build a snapshot from records alone, deriving a header that covers
    /// every required column, `unique_id` when any record carries one, and
    /// all passthrough columns in sorted order.
    pub fn from_records(name: impl Into<String>, records: Vec<EventRecord>) -> Self {
        let mut header = required_columns();
        if records.iter().any(|r| r.unique_id.is_some()) {
            header.push(columns::UNIQUE_ID.to_string());
        }
        let extras: BTreeSet<&String> = records.iter().flat_map(|r| r.extra.keys()).collect();
        header.extend(extras.into_iter().cloned());
        Self::new(name, header, records)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Check that every column the diff engine reads is present.
    ///
    /// # Errors
    ///
    /// `MissingColumn` naming the first absent column.
    pub fn require_columns(&self) -> Result<(), CalendiffError> {
        match required_columns().into_iter().find(|c| !self.has_column(c)) {
            Some(column) => Err(CalendiffError::MissingColumn {
                snapshot: self.name.clone(),
                column,
            }),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Columns the diff engine cannot work without, in canonical order.
pub fn required_columns() -> Vec<String> {
    let mut out = vec![
        columns::DIFF_ID.to_string(),
        columns::START_DATE.to_string(),
        columns::END_DATE.to_string(),
    ];
    out.extend((0..HERO_SLOTS).map(columns::featured_slot));
    out.extend((0..HERO_SLOTS).map(columns::non_featured_slot));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_columns_cover_both_rosters() {
        let cols = required_columns();
        assert_eq!(cols.len(), 3 + 2 * HERO_SLOTS);
        assert!(cols.contains(&"H6".to_string()));
        assert!(cols.contains(&"C1".to_string()));
    }

    #[test]
    fn test_from_records_header_includes_unique_id_and_extras() {
        let snap = Snapshot::from_records(
            "cur",
            vec![EventRecord::default()
                .with_unique_id("u1")
                .with_extra("type", "gacha")],
        );
        assert!(snap.has_column("unique_id"));
        assert!(snap.has_column("type"));
        assert!(snap.require_columns().is_ok());
    }

    #[test]
    fn test_require_columns_reports_first_missing() {
        let snap = Snapshot::new(
            "prev",
            vec!["diff_id".into(), "startDate".into()],
            Vec::new(),
        );
        let err = snap.require_columns().unwrap_err();
        assert_eq!(
            err,
            CalendiffError::MissingColumn {
                snapshot: "prev".into(),
                column: "endDate".into()
            }
        );
    }
}
