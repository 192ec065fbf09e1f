//! A single calendar event row.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use super::columns;

/// Number of hero slots in each roster (`H1..H6`, `C1..C6`).
pub const HERO_SLOTS: usize = 6;

/// Value of a `startDate` / `endDate` cell.
///
/// Integral cells are origin-shifted seconds (origin 2000-01-01T00:00:00Z).
/// Anything else that is not blank is kept verbatim so that two snapshots
/// carrying the same malformed value still compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeField {
    Instant(i64),
    Unparsed(String),
}

impl TimeField {
    /// Parse a raw CSV cell. Blank and NaN-like cells are absent.
    pub fn parse(raw: &str) -> Option<TimeField> {
        let trimmed = raw.trim();
        if is_null_cell(trimmed) {
            return None;
        }
        if let Ok(v) = trimmed.parse::<i64>() {
            return Some(TimeField::Instant(v));
        }
        // Float exports ("1234.0") of integral timestamps
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                return Some(TimeField::Instant(f as i64));
            }
        }
        Some(TimeField::Unparsed(trimmed.to_string()))
    }

    /// Origin-shifted seconds, if this value is a usable instant.
    pub fn instant(&self) -> Option<i64> {
        match self {
            TimeField::Instant(v) => Some(*v),
            TimeField::Unparsed(_) => None,
        }
    }

    pub fn to_cell(&self) -> String {
        match self {
            TimeField::Instant(v) => v.to_string(),
            TimeField::Unparsed(s) => s.clone(),
        }
    }
}

impl From<i64> for TimeField {
    fn from(v: i64) -> Self {
        TimeField::Instant(v)
    }
}

fn is_null_cell(trimmed: &str) -> bool {
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("nan")
        || trimmed.eq_ignore_ascii_case("nat")
}

fn optional_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if is_null_cell(trimmed) {
        None
    } else {
        Some(raw.to_string())
    }
}

/// One row of a calendar export.
///
/// Columns the diff engine reads are typed; every other column is carried in
/// `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub diff_id: Option<String>,
    pub unique_id: Option<String>,
    pub start_time: Option<TimeField>,
    pub end_time: Option<TimeField>,
    pub featured_heroes: [Option<String>; HERO_SLOTS],
    pub non_featured_heroes: [Option<String>; HERO_SLOTS],
    pub extra: BTreeMap<String, String>,
}

impl EventRecord {
    /// Build a record from a header row and one data row.
    ///
    /// Cells beyond the header are ignored; missing trailing cells read as
    /// blank.
    pub fn from_cells(header: &[String], cells: &[String]) -> Self {
        let mut record = EventRecord::default();
        for (i, name) in header.iter().enumerate() {
            let raw = cells.get(i).map(String::as_str).unwrap_or("");
            record.set_cell(name, raw);
        }
        record
    }

    fn set_cell(&mut self, name: &str, raw: &str) {
        match name {
            columns::DIFF_ID => self.diff_id = optional_text(raw),
            columns::UNIQUE_ID => self.unique_id = optional_text(raw),
            columns::START_DATE => self.start_time = TimeField::parse(raw),
            columns::END_DATE => self.end_time = TimeField::parse(raw),
            _ => {
                if let Some(slot) = hero_slot(name, columns::FEATURED_PREFIX) {
                    self.featured_heroes[slot] = optional_text(raw);
                } else if let Some(slot) = hero_slot(name, columns::NON_FEATURED_PREFIX) {
                    self.non_featured_heroes[slot] = optional_text(raw);
                } else {
                    self.extra.insert(name.to_string(), raw.to_string());
                }
            }
        }
    }

    /// Uniform read access to any column. Blank cells read as `None`.
    pub fn cell(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            columns::DIFF_ID => self.diff_id.as_deref().map(Cow::Borrowed),
            columns::UNIQUE_ID => self.unique_id.as_deref().map(Cow::Borrowed),
            columns::START_DATE => self.start_time.as_ref().map(|t| Cow::Owned(t.to_cell())),
            columns::END_DATE => self.end_time.as_ref().map(|t| Cow::Owned(t.to_cell())),
            _ => {
                if let Some(slot) = hero_slot(name, columns::FEATURED_PREFIX) {
                    self.featured_heroes[slot].as_deref().map(Cow::Borrowed)
                } else if let Some(slot) = hero_slot(name, columns::NON_FEATURED_PREFIX) {
                    self.non_featured_heroes[slot].as_deref().map(Cow::Borrowed)
                } else {
                    self.extra
                        .get(name)
                        .filter(|v| !is_null_cell(v.trim()))
                        .map(|v| Cow::Borrowed(v.as_str()))
                }
            }
        }
    }

    /// Render the record back into cells in `header` order.
    pub fn to_cells(&self, header: &[String]) -> Vec<String> {
        header
            .iter()
            .map(|name| match name.as_str() {
                columns::DIFF_ID | columns::UNIQUE_ID | columns::START_DATE | columns::END_DATE => {
                    self.cell(name).map(Cow::into_owned).unwrap_or_default()
                }
                other => {
                    if hero_slot(other, columns::FEATURED_PREFIX).is_some()
                        || hero_slot(other, columns::NON_FEATURED_PREFIX).is_some()
                    {
                        self.cell(other).map(Cow::into_owned).unwrap_or_default()
                    } else {
                        self.extra.get(other).cloned().unwrap_or_default()
                    }
                }
            })
            .collect()
    }

    /// Set of non-empty featured hero ids (order and duplicates ignored).
    pub fn featured_roster(&self) -> BTreeSet<&str> {
        roster(&self.featured_heroes)
    }

    /// Set of non-empty non-featured hero ids.
    pub fn non_featured_roster(&self) -> BTreeSet<&str> {
        roster(&self.non_featured_heroes)
    }

    /// Origin-shifted start seconds, if parseable.
    pub fn start_instant(&self) -> Option<i64> {
        self.start_time.as_ref().and_then(TimeField::instant)
    }

    /// `unique_id` with surrounding whitespace removed; blank ids are absent.
    pub fn normalized_unique_id(&self) -> Option<&str> {
        self.unique_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Whether a passthrough flag column (e.g. `H1_new`) holds a true value.
    pub fn flag(&self, name: &str) -> bool {
        self.extra
            .get(name)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false)
    }

    // Builder helpers

    pub fn with_diff_id(mut self, id: impl Into<String>) -> Self {
        self.diff_id = Some(id.into());
        self
    }

    pub fn with_unique_id(mut self, id: impl Into<String>) -> Self {
        self.unique_id = Some(id.into());
        self
    }

    pub fn with_times(mut self, start: i64, end: i64) -> Self {
        self.start_time = Some(TimeField::Instant(start));
        self.end_time = Some(TimeField::Instant(end));
        self
    }

    pub fn with_start_time(mut self, start: Option<TimeField>) -> Self {
        self.start_time = start;
        self
    }

    pub fn with_featured(mut self, heroes: &[&str]) -> Self {
        self.featured_heroes = slots(heroes);
        self
    }

    pub fn with_non_featured(mut self, heroes: &[&str]) -> Self {
        self.non_featured_heroes = slots(heroes);
        self
    }

    pub fn with_extra(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(column.into(), value.into());
        self
    }
}

/// Map `H3` → Some(2) for prefix `H`. `H0`, `H01` and `H7` are ordinary columns.
fn hero_slot(name: &str, prefix: &str) -> Option<usize> {
    let digits = name.strip_prefix(prefix)?;
    if digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: usize = digits.parse().ok()?;
    n.checked_sub(1).filter(|i| *i < HERO_SLOTS)
}

fn roster(slots: &[Option<String>; HERO_SLOTS]) -> BTreeSet<&str> {
    slots.iter().flatten().map(String::as_str).collect()
}

fn slots(heroes: &[&str]) -> [Option<String>; HERO_SLOTS] {
    let mut out: [Option<String>; HERO_SLOTS] = Default::default();
    for (slot, hero) in out.iter_mut().zip(heroes) {
        *slot = optional_text(hero);
    }
    out
}
