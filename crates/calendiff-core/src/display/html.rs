//! HTML table rendering.

use std::collections::BTreeMap;

use super::format::{keys, DisplayRow};
use super::rules::BASE_ICON_URL;
use crate::diff::model::{ChangedField, DiffStatus};

/// Columns of the standard review table, in order.
pub const STANDARD_COLUMNS: [&str; 10] = [
    keys::ICON,
    keys::DISPLAY_TYPE,
    keys::START_TIME,
    keys::END_TIME,
    keys::DURATION,
    keys::FEATURED_EN,
    keys::NON_FEATURED_EN,
    keys::FEATURED_JA,
    keys::NON_FEATURED_JA,
    keys::DIFF_STATUS,
];

/// Short header labels for the standard columns.
pub fn default_labels() -> BTreeMap<String, String> {
    [
        (keys::ICON, "Icon"),
        (keys::DISPLAY_TYPE, "Type"),
        (keys::EVENT_NAME, "Event ID"),
        (keys::START_TIME, "Start"),
        (keys::END_TIME, "End"),
        (keys::DURATION, "Days"),
        (keys::FEATURED_EN, "Feat.(EN)"),
        (keys::NON_FEATURED_EN, "Non-Feat.(EN)"),
        (keys::FEATURED_JA, "Feat.(JA)"),
        (keys::NON_FEATURED_JA, "Non-Feat.(JA)"),
        (keys::DIFF_STATUS, "Diff Status"),
        (keys::CHANGED_COLUMNS, "Changed Parts"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Render rows as a `styled-table`.
///
/// Each row carries a `diff-{status}` class. On modified and shifted rows the
/// cells behind a changed field get a highlight class.
pub fn to_html_table(
    rows: &[DisplayRow],
    columns: &[&str],
    labels: &BTreeMap<String, String>,
) -> String {
    let class_names: Vec<String> = columns
        .iter()
        .map(|c| class_name(&label_for(labels, c)))
        .collect();

    let mut out = String::from("<table class=\"styled-table\">");

    out.push_str("<thead><tr>");
    for (col, class) in columns.iter().zip(&class_names) {
        out.push_str(&format!(
            "<th class=\"{}\">{}</th>",
            class,
            escape(&label_for(labels, col))
        ));
    }
    out.push_str("</tr></thead>");

    out.push_str("<tbody>");
    for row in rows {
        out.push_str(&format!("<tr class=\"diff-{}\">", row.diff_status));
        for (col, class) in columns.iter().zip(&class_names) {
            let mut classes = vec![class.as_str()];
            if let Some(highlight) = highlight_class(row, col) {
                classes.push(highlight);
            }
            out.push_str(&format!(
                "<td class=\"{}\">{}</td>",
                classes.join(" "),
                cell_html(row, col)
            ));
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");

    out
}

fn label_for(labels: &BTreeMap<String, String>, col: &str) -> String {
    labels
        .get(col)
        .cloned()
        .unwrap_or_else(|| col.to_string())
}

fn highlight_class(row: &DisplayRow, col: &str) -> Option<&'static str> {
    if !matches!(row.diff_status, DiffStatus::Modified | DiffStatus::Shifted) {
        return None;
    }
    match col {
        keys::START_TIME | keys::END_TIME if row.changed_fields.contains(&ChangedField::Dates) => {
            Some("diff-cell-highlight-date")
        }
        keys::FEATURED_EN | keys::FEATURED_JA
            if row.changed_fields.contains(&ChangedField::FeaturedHeroes) =>
        {
            Some("diff-cell-highlight-hero")
        }
        keys::NON_FEATURED_EN | keys::NON_FEATURED_JA
            if row.changed_fields.contains(&ChangedField::NonFeaturedHeroes) =>
        {
            Some("diff-cell-highlight-hero-nonfeat")
        }
        _ => None,
    }
}

fn cell_html(row: &DisplayRow, col: &str) -> String {
    if let Some(heroes) = row.hero_list(col) {
        return heroes
            .iter()
            .map(|h| escape(h))
            .collect::<Vec<_>>()
            .join("<br>");
    }
    let text = row.column_text(col).unwrap_or_default();
    if text.starts_with(BASE_ICON_URL) {
        format!("<img src=\"{}\" class=\"icon-image\">", escape(&text))
    } else {
        escape(&text).replace('\n', "<br>")
    }
}

/// `col-` plus the label lowercased, with runs of whitespace, parentheses
/// and dots turned into one dash and anything else non-alphanumeric dropped.
pub fn class_name(label: &str) -> String {
    let mut out = String::new();
    let mut pending_dash = false;
    for c in label.to_lowercase().chars() {
        if c.is_whitespace() || matches!(c, '(' | ')' | '.') {
            pending_dash = true;
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            if pending_dash {
                out.push('-');
                pending_dash = false;
            }
            out.push(c);
        }
    }
    format!("col-{}", out.trim_matches('-'))
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
