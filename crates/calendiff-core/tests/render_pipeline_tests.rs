//! Reconcile -> format -> render, as the dashboard runs it.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use calendiff_core::diff::engine::reconcile;
use calendiff_core::diff::human_summary::render_human_summary;
use calendiff_core::diff::model::DiffStatus;
use calendiff_core::display::{
    date_bounds, default_labels, filter_by_date_range, format_events, keys, to_html_table,
    DisplayRow, RuleSet, Zone, STANDARD_COLUMNS,
};
use calendiff_core::model::{EventRecord, Snapshot};
use calendiff_core::posts::{discord_post, find_template, forum_posts, DiscordTemplate};
use calendiff_core::template::{parse_forum_templates, render_template};
use calendiff_core::translation::HeroTranslator;
use chrono::NaiveDate;
use serde_json::json;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const DAY: i64 = 86_400;
/// 2025-09-20T00:00:00Z in origin-shifted seconds
const SEP_20: i64 = 1_758_326_400 - 946_684_800;

const RULES: &str = r#"[
  {"priority": 2, "conditions": [{"column": "type", "operator": "equals", "value": "gacha"}],
   "output": "Summon", "post_name": "Summon Gala", "icon": "summon.png",
   "event_title_en": "Gala Summon", "event_title_ja": "ガラ召喚"},
  {"priority": 1, "conditions": [{"column": "type", "operator": "equals", "value": "gacha"},
                                 {"column": "banner", "operator": "contains", "value": "limited"}],
   "output": "Limited Summon"},
  {"conditions": [{"column": "type", "operator": "matches", "value": "^login"}],
   "output": "Login Bonus"}
]"#;

const FORUM: &str = "\
[new_en]
New: {Display Type} from {start_date_md} ({Duration}) {Featured Heroes (EN)}
[new_ja]
新規: {Display Type} {start_date_md}
[shifted_en]
Moved: {Display Type} was {original_start_date_iso_en}, now {start_date_md}
[shifted_ja]
変更: {Display Type}
";

fn translator() -> HeroTranslator {
    HeroTranslator::new()
        .with_hero("h_a", "Alpha", "アルファ")
        .with_hero("h_b", "Beta", "ベータ")
}

fn pipeline() -> Vec<DisplayRow> {
    let previous = Snapshot::from_records(
        "prev",
        vec![
            EventRecord::default()
                .with_diff_id("gala-old")
                .with_unique_id("gala")
                .with_times(SEP_20 - 2 * DAY, SEP_20 + 5 * DAY)
                .with_featured(&["h_a"])
                .with_extra("type", "gacha")
                .with_extra("banner", "")
                .with_extra("H1_new", ""),
            EventRecord::default()
                .with_diff_id("login")
                .with_unique_id("login")
                .with_times(SEP_20, SEP_20 + DAY)
                .with_extra("type", "login7")
                .with_extra("banner", "")
                .with_extra("H1_new", ""),
        ],
    );
    let current = Snapshot::from_records(
        "cur",
        vec![
            EventRecord::default()
                .with_diff_id("gala-new")
                .with_unique_id("gala")
                .with_times(SEP_20, SEP_20 + 7 * DAY + 3 * 3600)
                .with_featured(&["h_a", "h_b"])
                .with_extra("type", "gacha")
                .with_extra("banner", "")
                .with_extra("H1_new", "")
                .with_extra("H2_new", "True"),
            EventRecord::default()
                .with_diff_id("login")
                .with_unique_id("login")
                .with_times(SEP_20, SEP_20 + DAY)
                .with_extra("type", "login7")
                .with_extra("banner", "")
                .with_extra("H1_new", ""),
            EventRecord::default()
                .with_diff_id("limited")
                .with_unique_id("limited")
                .with_times(SEP_20 + 10 * DAY, SEP_20 + 12 * DAY)
                .with_extra("type", "gacha")
                .with_extra("banner", "limited_2025.png")
                .with_extra("H1_new", ""),
        ],
    );

    let events = reconcile(&current, &previous).unwrap();
    let rules = RuleSet::from_json(RULES).unwrap();
    format_events(&events, &rules, &translator(), Zone::Jst)
}

fn find<'a>(rows: &'a [DisplayRow], diff_id: &str) -> &'a DisplayRow {
    rows.iter()
        .find(|r| r.record.diff_id.as_deref() == Some(diff_id))
        .unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// S1: Rules resolve by priority and feed every display field
#[test]
fn test_rules_and_translation_apply() {
    let rows = pipeline();
    assert_eq!(rows.len(), 3);

    let gala = find(&rows, "gala-new");
    assert_eq!(gala.diff_status, DiffStatus::Shifted);
    assert_eq!(gala.display_type, "Summon");
    assert_eq!(gala.post_name, "Summon Gala");
    assert_eq!(gala.event_title_ja, "ガラ召喚");
    assert!(gala.icon_url.as_deref().unwrap().ends_with("summon.png"));
    assert_eq!(gala.featured_heroes_en, vec!["Alpha", "Beta 🆕"]);
    assert_eq!(gala.featured_heroes_ja, vec!["アルファ", "ベータ 🆕"]);
    assert_eq!(gala.duration, "7d 3h");

    let limited = find(&rows, "limited");
    assert_eq!(limited.display_type, "Limited Summon");
    assert_eq!(limited.post_name, "Limited Summon");
    assert_eq!(limited.icon_url, None);

    let login = find(&rows, "login");
    assert_eq!(login.display_type, "Login Bonus");
    assert_eq!(login.diff_status, DiffStatus::Unchanged);
    assert_eq!(login.duration, "1d");
}

// S2: JST conversion shows local wall-clock times
#[test]
fn test_times_render_in_zone() {
    let rows = pipeline();
    let login = find(&rows, "login");
    assert_eq!(
        login.column_text(keys::START_TIME).as_deref(),
        Some("2025-09-20 09:00")
    );
    let gala = find(&rows, "gala-new");
    let vars = gala.template_vars();
    assert_eq!(vars["original_start_date_iso"], "2025-09-18");
    assert_eq!(vars["original_start_date_iso_en"], "Sep 18");
    assert_eq!(vars["start_date_md"], "9/20");
}

// S3: Date filtering and bounds work on zoned start dates
#[test]
fn test_date_filter() {
    let rows = pipeline();
    let (lo, hi) = date_bounds(&rows).unwrap();
    assert_eq!(lo, NaiveDate::from_ymd_opt(2025, 9, 20).unwrap());
    assert_eq!(hi, NaiveDate::from_ymd_opt(2025, 9, 30).unwrap());

    let first_week = filter_by_date_range(
        &rows,
        Some(lo),
        NaiveDate::from_ymd_opt(2025, 9, 27),
    );
    assert_eq!(first_week.len(), 2);
    assert!(first_week.iter().all(|r| r.record.diff_id.as_deref() != Some("limited")));
    assert_eq!(filter_by_date_range(&rows, None, None).len(), 3);
}

// S4: HTML table marks row status and highlights changed cells
#[test]
fn test_html_table() {
    let rows = pipeline();
    let html = to_html_table(&rows, &STANDARD_COLUMNS, &default_labels());

    assert!(html.starts_with("<table class=\"styled-table\">"));
    assert!(html.contains("<th class=\"col-feat-en\">Feat.(EN)</th>"));
    assert!(html.contains("<tr class=\"diff-shifted\">"));
    assert!(html.contains("<tr class=\"diff-new\">"));
    assert!(html.contains("<tr class=\"diff-unchanged\">"));
    assert!(html.contains("diff-cell-highlight-date"));
    assert!(html.contains("diff-cell-highlight-hero"));
    assert!(html.contains("Alpha<br>Beta 🆕"));
    assert!(html.contains("class=\"icon-image\""));
    assert!(!html.contains("diff-cell-highlight-hero-nonfeat"));
}

// S5: Forum posts render per status with language-specific titles
#[test]
fn test_forum_posts() {
    let rows = pipeline();
    let templates = parse_forum_templates(FORUM);
    let posts = forum_posts(&rows, &templates);

    assert_eq!(posts.posts.len(), 3);
    let shifted = posts.posts.iter().find(|p| p.status == "shifted").unwrap();
    assert_eq!(shifted.event_name, "Summon Gala");
    assert_eq!(shifted.en, "Moved: Gala Summon was Sep 18, now 9/20");
    assert_eq!(shifted.ja, "変更: ガラ召喚");

    let new = posts.posts.iter().find(|p| p.status == "new").unwrap();
    // No featured heroes: the list renders empty
    assert_eq!(new.en, "New: Limited Summon from 9/30 (2d) ");

    let unchanged = posts.posts.iter().find(|p| p.status == "unchanged").unwrap();
    assert_eq!(unchanged.en, "**English template for 'unchanged' not found.**");
}

// S6: Discord payloads fill nested strings
#[test]
fn test_discord_post() {
    let rows = pipeline();
    let templates: Vec<DiscordTemplate> = serde_json::from_value(json!([
        {
            "name": "tomorrow",
            "template": {
                "content": "明日 {start_time_12h} から {event_name}",
                "embeds": [{"title": "{featured_hero_1_ja} / {featured_hero_2_ja}",
                            "footer": {"text": "{start_date_full} ～ {end_date_full}"}}]
            }
        }
    ]))
    .unwrap();

    let template = find_template(&templates, "tomorrow").unwrap();
    let payload = discord_post(find(&rows, "gala-new"), template);
    assert_eq!(payload["content"], "明日 9AM から Summon Gala");
    assert_eq!(payload["embeds"][0]["title"], "アルファ / ベータ 🆕");
    assert_eq!(
        payload["embeds"][0]["footer"]["text"],
        "2025/9/20 (土) ～ 2025/9/27 (土)"
    );
    assert!(find_template(&templates, "missing").is_err());
}

// S7: Markdown summary lists changes by status
#[test]
fn test_human_summary() {
    let previous = Snapshot::from_records(
        "prev",
        vec![EventRecord::default().with_diff_id("a").with_times(1, 2)],
    );
    let current = Snapshot::from_records(
        "cur",
        vec![
            EventRecord::default().with_diff_id("a").with_times(1, 3),
            EventRecord::default().with_diff_id("b").with_times(5, 6),
        ],
    );
    let text = render_human_summary(&reconcile(&current, &previous).unwrap());

    assert!(text.starts_with("## Calendar Diff"));
    assert!(text.contains("| modified | 1 |"));
    assert!(text.contains("| **total** | 2 |"));
    assert!(text.contains("### New (1)"));
    assert!(text.contains("- `a` start 1 end 3 [dates]"));
}

// S8: Template variables feed the plain renderer too
#[test]
fn test_template_vars_cover_source_columns() {
    let rows = pipeline();
    let vars: BTreeMap<String, String> = find(&rows, "limited").template_vars();
    assert_eq!(vars["banner"], "limited_2025.png");
    assert_eq!(vars["H1"], "");
    assert_eq!(
        render_template("{Display Type}: {diff_status} \\{literal}", &vars),
        "Limited Summon: new {literal}"
    );
}
