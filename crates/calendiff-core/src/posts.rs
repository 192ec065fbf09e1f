//! Forum and Discord post generation.
//!
//! Both generators read [`DisplayRow::template_vars`] and never touch the
//! diff itself.

use chrono::{Datelike, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::display::format::{keys, DisplayRow};
use crate::errors::CalendiffError;
use crate::template::{render_json_template, render_template};

// ========== Forum ==========

/// Rendered forum text for one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForumPost {
    pub event_name: String,
    pub status: String,
    pub en: String,
    pub ja: String,
}

/// Forum posts for a set of rows, in row order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ForumPosts {
    pub posts: Vec<ForumPost>,
}

impl ForumPosts {
    /// All English posts joined for pasting (CRLF between posts).
    pub fn summary_en(&self) -> String {
        self.posts
            .iter()
            .map(|p| p.en.as_str())
            .collect::<Vec<_>>()
            .join("\r\n")
    }

    pub fn summary_ja(&self) -> String {
        self.posts
            .iter()
            .map(|p| p.ja.as_str())
            .collect::<Vec<_>>()
            .join("\r\n")
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

/// Render `{status}_en` / `{status}_ja` forum templates for every row.
///
/// `Display Type` is replaced by the row's event title in the matching
/// language. A missing template renders a bold placeholder line instead.
pub fn forum_posts(rows: &[DisplayRow], templates: &BTreeMap<String, String>) -> ForumPosts {
    let posts = rows
        .iter()
        .map(|row| {
            let status = row.diff_status.as_str();
            let mut vars = row.template_vars();

            vars.insert(keys::DISPLAY_TYPE.to_string(), row.event_title_en.clone());
            let en = match templates.get(&format!("{}_en", status)) {
                Some(t) => render_template(t, &vars),
                None => format!("**English template for '{}' not found.**", status),
            };

            vars.insert(keys::DISPLAY_TYPE.to_string(), row.event_title_ja.clone());
            let ja = match templates.get(&format!("{}_ja", status)) {
                Some(t) => render_template(t, &vars),
                None => format!("**Japanese template for '{}' not found.**", status),
            };

            ForumPost {
                event_name: row.event_name().to_string(),
                status: status.to_string(),
                en,
                ja,
            }
        })
        .collect();
    ForumPosts { posts }
}

// ========== Discord ==========

/// One entry of the Discord template file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscordTemplate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Variable name to human description, for display only
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,
    /// Webhook payload with `{var}` placeholders in its strings
    pub template: Value,
}

/// Find a template by name.
///
/// # Errors
///
/// `TemplateNotFound` when no template has that name.
pub fn find_template<'a>(
    templates: &'a [DiscordTemplate],
    name: &str,
) -> Result<&'a DiscordTemplate, CalendiffError> {
    templates
        .iter()
        .find(|t| t.name == name)
        .ok_or_else(|| CalendiffError::TemplateNotFound {
            name: name.to_string(),
        })
}

const JA_WEEKDAYS: [&str; 7] = ["月", "火", "水", "木", "金", "土", "日"];

pub fn ja_weekday(day: Weekday) -> &'static str {
    JA_WEEKDAYS[day.num_days_from_monday() as usize]
}

/// Template variables for a Discord post: everything from
/// [`DisplayRow::template_vars`] plus the Discord-specific names.
pub fn discord_vars(row: &DisplayRow) -> BTreeMap<String, String> {
    let mut vars = row.template_vars();

    let aliases = [
        (keys::EVENT_NAME, "event_name"),
        (keys::FEATURED_EN, "featured_heroes_en"),
        (keys::NON_FEATURED_EN, "non_featured_heroes_en"),
        ("banner", "banner_url"),
        ("url", "event_url"),
    ];
    for (from, to) in aliases {
        if let Some(value) = vars.get(from).cloned() {
            vars.insert(to.to_string(), value);
        }
    }

    // "7d 3h" -> "7"; spans under a day keep the full text
    let duration_days = match row.duration.split_once('d') {
        Some((days, _)) => days.to_string(),
        None => row.duration.clone(),
    };
    vars.insert("duration_days".to_string(), duration_days);

    for (i, hero) in row.featured_heroes_en.iter().take(2).enumerate() {
        vars.insert(format!("featured_hero_{}_en", i + 1), hero.clone());
    }
    for (i, hero) in row.featured_heroes_ja.iter().take(2).enumerate() {
        vars.insert(format!("featured_hero_{}_ja", i + 1), hero.clone());
    }

    if let Some(start) = row.start {
        let weekday = ja_weekday(start.weekday());
        vars.insert("start_date_weekday".to_string(), weekday.to_string());
        vars.insert(
            "start_date_full".to_string(),
            format!("{}/{}/{} ({})", start.year(), start.month(), start.day(), weekday),
        );
        let (pm, hour) = start.hour12();
        vars.insert(
            "start_time_12h".to_string(),
            format!("{}{}", hour, if pm { "PM" } else { "AM" }),
        );
    }
    if let Some(end) = row.end {
        vars.insert(
            "end_date_full".to_string(),
            format!(
                "{}/{}/{} ({})",
                end.year(),
                end.month(),
                end.day(),
                ja_weekday(end.weekday())
            ),
        );
    }

    vars
}

/// Render a Discord payload for one row.
pub fn discord_post(row: &DisplayRow, template: &DiscordTemplate) -> Value {
    render_json_template(&template.template, &discord_vars(row))
}
