//! Display rows built from reconciled events.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};

use super::rules::RuleSet;
use super::time::{format_duration, to_datetime, Zone};
use crate::diff::model::{ChangedField, DiffStatus, ReconciledEvent};
use crate::model::{columns, EventRecord, TimeField, HERO_SLOTS};
use crate::translation::{HeroTranslator, Lang};

/// Appended to a hero name whose `{slot}_new` flag is set.
pub const NEW_HERO_MARKER: &str = " 🆕";

pub const EN_LIST_SEPARATOR: &str = ", ";
pub const JA_LIST_SEPARATOR: &str = "、";

/// Template variable and table column names.
pub mod keys {
    pub const DISPLAY_TYPE: &str = "Display Type";
    pub const ICON: &str = "Icon";
    pub const POST_NAME: &str = "Post Name";
    pub const EVENT_NAME: &str = "Event Name";
    pub const EVENT_TITLE_EN: &str = "event_title_en";
    pub const EVENT_TITLE_JA: &str = "event_title_ja";
    pub const START_TIME: &str = "Start Time";
    pub const END_TIME: &str = "End Time";
    pub const DURATION: &str = "Duration";
    pub const FEATURED_EN: &str = "Featured Heroes (EN)";
    pub const NON_FEATURED_EN: &str = "Non-Featured Heroes (EN)";
    pub const FEATURED_JA: &str = "Featured Heroes (JA)";
    pub const NON_FEATURED_JA: &str = "Non-Featured Heroes (JA)";
    pub const DIFF_STATUS: &str = "_diff_status";
    pub const CHANGED_COLUMNS: &str = "_changed_columns";
}

const TABLE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One event ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRow {
    pub record: EventRecord,
    pub diff_status: DiffStatus,
    pub changed_fields: BTreeSet<ChangedField>,

    pub display_type: String,
    pub icon_url: Option<String>,
    pub post_name: String,
    pub event_title_en: String,
    pub event_title_ja: String,

    pub start: Option<DateTime<FixedOffset>>,
    pub end: Option<DateTime<FixedOffset>>,
    /// Previous start of a shifted event
    pub original_start: Option<DateTime<FixedOffset>>,
    pub duration: String,

    pub featured_heroes_en: Vec<String>,
    pub non_featured_heroes_en: Vec<String>,
    pub featured_heroes_ja: Vec<String>,
    pub non_featured_heroes_ja: Vec<String>,
}

impl DisplayRow {
    /// `Post Name` doubles as the event's name in posts and selectors.
    pub fn event_name(&self) -> &str {
        &self.post_name
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start.map(|dt| dt.date_naive())
    }

    /// Text for a table or template column; `None` for unknown names.
    ///
    /// Hero lists come back joined with their language separator.
    pub fn column_text(&self, name: &str) -> Option<String> {
        let text = match name {
            keys::DISPLAY_TYPE => self.display_type.clone(),
            keys::ICON => self.icon_url.clone().unwrap_or_default(),
            keys::POST_NAME | keys::EVENT_NAME => self.post_name.clone(),
            keys::EVENT_TITLE_EN => self.event_title_en.clone(),
            keys::EVENT_TITLE_JA => self.event_title_ja.clone(),
            keys::START_TIME => table_datetime(self.start.as_ref()),
            keys::END_TIME => table_datetime(self.end.as_ref()),
            keys::DURATION => self.duration.clone(),
            keys::FEATURED_EN => self.featured_heroes_en.join(EN_LIST_SEPARATOR),
            keys::NON_FEATURED_EN => self.non_featured_heroes_en.join(EN_LIST_SEPARATOR),
            keys::FEATURED_JA => self.featured_heroes_ja.join(JA_LIST_SEPARATOR),
            keys::NON_FEATURED_JA => self.non_featured_heroes_ja.join(JA_LIST_SEPARATOR),
            keys::DIFF_STATUS => self.diff_status.to_string(),
            keys::CHANGED_COLUMNS => self
                .changed_fields
                .iter()
                .map(ChangedField::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            other => return self.record.cell(other).map(|c| c.into_owned()),
        };
        Some(text)
    }

    /// Hero list behind a column, for renderers that join their own way.
    pub fn hero_list(&self, name: &str) -> Option<&[String]> {
        match name {
            keys::FEATURED_EN => Some(&self.featured_heroes_en),
            keys::NON_FEATURED_EN => Some(&self.non_featured_heroes_en),
            keys::FEATURED_JA => Some(&self.featured_heroes_ja),
            keys::NON_FEATURED_JA => Some(&self.non_featured_heroes_ja),
            _ => None,
        }
    }

    /// Every variable a post template can reference.
    ///
    /// Source columns come first so that display values win on a name clash.
    /// Blank source cells map to empty strings.
    pub fn template_vars(&self) -> BTreeMap<String, String> {
        let mut vars = BTreeMap::new();

        for (name, value) in &self.record.extra {
            vars.insert(name.clone(), value.clone());
        }
        let mut core = vec![
            columns::DIFF_ID.to_string(),
            columns::UNIQUE_ID.to_string(),
            columns::START_DATE.to_string(),
            columns::END_DATE.to_string(),
        ];
        core.extend((0..HERO_SLOTS).map(columns::featured_slot));
        core.extend((0..HERO_SLOTS).map(columns::non_featured_slot));
        for name in core {
            let value = self
                .record
                .cell(&name)
                .map(|c| c.into_owned())
                .unwrap_or_default();
            vars.insert(name, value);
        }

        for key in [
            keys::DISPLAY_TYPE,
            keys::ICON,
            keys::POST_NAME,
            keys::EVENT_NAME,
            keys::EVENT_TITLE_EN,
            keys::EVENT_TITLE_JA,
            keys::START_TIME,
            keys::END_TIME,
            keys::DURATION,
            keys::FEATURED_EN,
            keys::NON_FEATURED_EN,
            keys::FEATURED_JA,
            keys::NON_FEATURED_JA,
            keys::DIFF_STATUS,
            keys::CHANGED_COLUMNS,
        ] {
            let value = self.column_text(key).unwrap_or_default();
            if self.hero_list(key).is_some() {
                vars.insert(format!("{} Template", key), value.clone());
            }
            vars.insert(key.to_string(), value);
        }
        vars.insert("diff_status".to_string(), self.diff_status.to_string());

        vars.insert("start_date_iso".into(), fmt_opt(self.start.as_ref(), "%Y-%m-%d"));
        vars.insert("start_time_iso".into(), fmt_opt(self.start.as_ref(), "%H:%M:%S"));
        vars.insert("end_date_iso".into(), fmt_opt(self.end.as_ref(), "%Y-%m-%d"));
        vars.insert("end_time_iso".into(), fmt_opt(self.end.as_ref(), "%H:%M:%S"));
        vars.insert("start_date_md".into(), month_day(self.start.as_ref()));
        vars.insert("end_date_md".into(), month_day(self.end.as_ref()));

        vars.insert(
            "original_start_date_iso".into(),
            fmt_opt(self.original_start.as_ref(), "%Y-%m-%d"),
        );
        vars.insert(
            "original_start_date_iso_md".into(),
            month_day(self.original_start.as_ref()),
        );
        vars.insert(
            "original_start_date_iso_en".into(),
            self.original_start
                .map(|dt| format!("{} {}", dt.format("%b"), dt.day()))
                .unwrap_or_default(),
        );

        vars
    }
}

fn fmt_opt(dt: Option<&DateTime<FixedOffset>>, pattern: &str) -> String {
    dt.map(|dt| dt.format(pattern).to_string()).unwrap_or_default()
}

fn table_datetime(dt: Option<&DateTime<FixedOffset>>) -> String {
    fmt_opt(dt, TABLE_DATETIME_FORMAT)
}

fn month_day(dt: Option<&DateTime<FixedOffset>>) -> String {
    dt.map(|dt| format!("{}/{}", dt.month(), dt.day()))
        .unwrap_or_default()
}

/// Build display rows for a reconciled event list, keeping its order.
pub fn format_events(
    events: &[ReconciledEvent],
    rules: &RuleSet,
    translator: &HeroTranslator,
    zone: Zone,
) -> Vec<DisplayRow> {
    events
        .iter()
        .map(|event| format_event(event, rules, translator, zone))
        .collect()
}

fn format_event(
    event: &ReconciledEvent,
    rules: &RuleSet,
    translator: &HeroTranslator,
    zone: Zone,
) -> DisplayRow {
    let record = &event.record;
    let info = rules.resolve(record);
    let convert = |t: Option<&TimeField>| t.and_then(|t| to_datetime(t, zone));

    let start = convert(record.start_time.as_ref());
    let end = convert(record.end_time.as_ref());
    let original_start = convert(event.original_start_time.as_ref());
    let duration = format_duration(start.as_ref(), end.as_ref());

    DisplayRow {
        record: record.clone(),
        diff_status: event.diff_status,
        changed_fields: event.changed_fields.clone(),
        display_type: info.display_type,
        icon_url: info.icon_url,
        post_name: info.post_name,
        event_title_en: info.event_title_en,
        event_title_ja: info.event_title_ja,
        start,
        end,
        original_start,
        duration,
        featured_heroes_en: hero_names(
            record,
            &record.featured_heroes,
            columns::FEATURED_PREFIX,
            translator,
            Lang::En,
        ),
        non_featured_heroes_en: hero_names(
            record,
            &record.non_featured_heroes,
            columns::NON_FEATURED_PREFIX,
            translator,
            Lang::En,
        ),
        featured_heroes_ja: hero_names(
            record,
            &record.featured_heroes,
            columns::FEATURED_PREFIX,
            translator,
            Lang::Ja,
        ),
        non_featured_heroes_ja: hero_names(
            record,
            &record.non_featured_heroes,
            columns::NON_FEATURED_PREFIX,
            translator,
            Lang::Ja,
        ),
    }
}

fn hero_names(
    record: &EventRecord,
    slots: &[Option<String>; HERO_SLOTS],
    prefix: &str,
    translator: &HeroTranslator,
    lang: Lang,
) -> Vec<String> {
    slots
        .iter()
        .enumerate()
        .filter_map(|(i, hero)| {
            let hero = hero.as_deref()?;
            let mut name = translator.translate(hero, lang).to_string();
            if record.flag(&format!("{}{}_new", prefix, i + 1)) {
                name.push_str(NEW_HERO_MARKER);
            }
            Some(name)
        })
        .collect()
}

/// Keep rows whose zoned start date lies in `[from, to]`.
///
/// A missing bound is open. Rows without a start are dropped.
pub fn filter_by_date_range(
    rows: &[DisplayRow],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<DisplayRow> {
    rows.iter()
        .filter(|row| match row.start_date() {
            Some(date) => from.map_or(true, |f| date >= f) && to.map_or(true, |t| date <= t),
            None => false,
        })
        .cloned()
        .collect()
}

/// Earliest and latest start date among the rows.
pub fn date_bounds(rows: &[DisplayRow]) -> Option<(NaiveDate, NaiveDate)> {
    let dates = rows.iter().filter_map(DisplayRow::start_date);
    dates.fold(None, |acc, d| match acc {
        None => Some((d, d)),
        Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 86_400;

    fn event(record: EventRecord, status: DiffStatus) -> ReconciledEvent {
        ReconciledEvent::new(record, status)
    }

    fn translator() -> HeroTranslator {
        HeroTranslator::new()
            .with_hero("h_a", "Alpha", "アルファ")
            .with_hero("h_b", "Beta", "ベータ")
    }

    #[test]
    fn test_heroes_translate_and_mark_new() {
        let record = EventRecord::default()
            .with_diff_id("e1")
            .with_featured(&["h_a", "", "h_b"])
            .with_extra("H3_new", "True");
        let rows = format_events(
            &[event(record, DiffStatus::New)],
            &RuleSet::default(),
            &translator(),
            Zone::Utc,
        );
        assert_eq!(rows[0].featured_heroes_en, vec!["Alpha", "Beta 🆕"]);
        assert_eq!(rows[0].featured_heroes_ja, vec!["アルファ", "ベータ 🆕"]);
        assert_eq!(
            rows[0].column_text(keys::FEATURED_JA).as_deref(),
            Some("アルファ、ベータ 🆕")
        );
    }

    #[test]
    fn test_dates_and_duration_in_zone() {
        let record = EventRecord::default()
            .with_diff_id("e1")
            .with_times(15 * 3600, 15 * 3600 + 7 * DAY);
        let rows = format_events(
            &[event(record, DiffStatus::Unchanged)],
            &RuleSet::default(),
            &HeroTranslator::default(),
            Zone::Jst,
        );
        let vars = rows[0].template_vars();
        assert_eq!(vars["start_date_iso"], "2000-01-02");
        assert_eq!(vars["start_time_iso"], "00:00:00");
        assert_eq!(vars["start_date_md"], "1/2");
        assert_eq!(vars["end_date_md"], "1/9");
        assert_eq!(vars["Duration"], "7d");
        assert_eq!(vars["Start Time"], "2000-01-02 00:00");
    }

    #[test]
    fn test_original_start_strings_for_shifted() {
        let mut shifted = event(
            EventRecord::default().with_diff_id("e2").with_times(40 * DAY, 41 * DAY),
            DiffStatus::Shifted,
        );
        shifted.changed_fields.insert(ChangedField::Dates);
        shifted.original_start_time = Some(TimeField::Instant(35 * DAY));

        let rows = format_events(
            &[shifted],
            &RuleSet::default(),
            &HeroTranslator::default(),
            Zone::Utc,
        );
        let vars = rows[0].template_vars();
        assert_eq!(vars["original_start_date_iso"], "2000-02-05");
        assert_eq!(vars["original_start_date_iso_md"], "2/5");
        assert_eq!(vars["original_start_date_iso_en"], "Feb 5");
        assert_eq!(vars["_changed_columns"], "dates");
    }

    #[test]
    fn test_template_vars_expose_source_columns() {
        let record = EventRecord::default()
            .with_diff_id("e3")
            .with_extra("type", "gacha")
            .with_extra("banner", "https://example.com/b.png");
        let rows = format_events(
            &[event(record, DiffStatus::New)],
            &RuleSet::default(),
            &HeroTranslator::default(),
            Zone::Utc,
        );
        let vars = rows[0].template_vars();
        assert_eq!(vars["banner"], "https://example.com/b.png");
        assert_eq!(vars["diff_id"], "e3");
        assert_eq!(vars["startDate"], "");
        assert_eq!(vars["Display Type"], "gacha");
        assert_eq!(vars["Event Name"], "gacha");
        assert_eq!(vars["_diff_status"], "new");
    }

    #[test]
    fn test_filter_by_date_range_is_inclusive_and_drops_undated() {
        let events: Vec<ReconciledEvent> = [0, DAY, 2 * DAY, 3 * DAY]
            .into_iter()
            .map(|s| event(EventRecord::default().with_times(s, s + 10), DiffStatus::New))
            .chain(std::iter::once(event(EventRecord::default(), DiffStatus::New)))
            .collect();
        let rows = format_events(
            &events,
            &RuleSet::default(),
            &HeroTranslator::default(),
            Zone::Utc,
        );
        let from = NaiveDate::from_ymd_opt(2000, 1, 2);
        let to = NaiveDate::from_ymd_opt(2000, 1, 3);
        assert_eq!(filter_by_date_range(&rows, from, to).len(), 2);
        assert_eq!(filter_by_date_range(&rows, None, None).len(), 4);
        assert_eq!(
            date_bounds(&rows),
            Some((
                NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2000, 1, 4).unwrap()
            ))
        );
    }
}
