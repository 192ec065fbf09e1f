//! Template processing for post text.
//!
//! Templates use `{name}` placeholders. A backslash emits the next character
//! literally, so `\{name}` renders as `{name}`. Placeholders with no matching
//! variable are left in place, which keeps typos visible in the output.

use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

/// Variables every Discord template can use whether or not the JSON names them.
pub const DATE_VARIABLES: [&str; 5] = [
    "duration_days",
    "end_date_full",
    "start_date_full",
    "start_date_md",
    "start_date_weekday",
];

/// Substitute `{key}` placeholders in `template`.
pub fn render_template(template: &str, vars: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(c) = rest.chars().next() {
        match c {
            '\\' => {
                let mut chars = rest.chars();
                chars.next();
                match chars.next() {
                    Some(escaped) => {
                        out.push(escaped);
                        rest = &rest[1 + escaped.len_utf8()..];
                    }
                    None => {
                        out.push('\\');
                        rest = &rest[1..];
                    }
                }
            }
            '{' => match rest.find('}') {
                Some(close) => {
                    let key = &rest[1..close];
                    match vars.get(key) {
                        Some(value) => out.push_str(value),
                        None => out.push_str(&rest[..=close]),
                    }
                    rest = &rest[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = &rest[1..];
                }
            },
            _ => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }

    out
}

/// Apply [`render_template`] to every string inside a JSON value.
///
/// Object keys and non-string scalars are left alone.
pub fn render_json_template(value: &Value, vars: &BTreeMap<String, String>) -> Value {
    match value {
        Value::String(s) => Value::String(render_template(s, vars)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| render_json_template(item, vars))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), render_json_template(v, vars)))
                .collect(),
        ),
        other => other.clone(),
    }
}

static SECTION_HEADER: OnceLock<Option<Regex>> = OnceLock::new();
static PLACEHOLDER: OnceLock<Option<Regex>> = OnceLock::new();
static FULL_DATE: OnceLock<Option<Regex>> = OnceLock::new();
static CLOCK_12H: OnceLock<Option<Regex>> = OnceLock::new();

fn cached(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

/// Split a forum template file into its `[key]` sections.
///
/// A header must start a line. Keys and bodies are trimmed; text before the
/// first header is ignored and a repeated key keeps its last body.
pub fn parse_forum_templates(text: &str) -> BTreeMap<String, String> {
    let Some(header) = cached(&SECTION_HEADER, r"(?m)^[ \t]*\[([^\]\n]*)\]") else {
        return BTreeMap::new();
    };
    let headers: Vec<(String, usize, usize)> = header
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let key = caps.get(1)?.as_str().trim().to_string();
            Some((key, whole.start(), whole.end()))
        })
        .collect();

    let mut sections = BTreeMap::new();
    for (i, (key, _, body_start)) in headers.iter().enumerate() {
        let body_end = headers
            .get(i + 1)
            .map(|(_, next_start, _)| *next_start)
            .unwrap_or(text.len());
        sections.insert(key.clone(), text[*body_start..body_end].trim().to_string());
    }
    sections
}

/// Sorted placeholder names used anywhere in a JSON template, plus
/// [`DATE_VARIABLES`].
pub fn extract_variables(value: &Value) -> Vec<String> {
    let mut names: BTreeSet<String> = DATE_VARIABLES.iter().map(|s| s.to_string()).collect();
    collect_placeholders(value, &mut names);
    names.into_iter().collect()
}

fn collect_placeholders(value: &Value, names: &mut BTreeSet<String>) {
    match value {
        Value::String(s) => {
            let Some(re) = cached(&PLACEHOLDER, r"\{([^}]+)\}") else {
                return;
            };
            for caps in re.captures_iter(s) {
                if let Some(name) = caps.get(1) {
                    names.insert(name.as_str().to_string());
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|v| collect_placeholders(v, names)),
        Value::Object(map) => map.values().for_each(|v| collect_placeholders(v, names)),
        _ => {}
    }
}

/// Turn a finished Discord payload back into a template by replacing
/// concrete dates (`2025/9/20 (土)`) with `{start_date_full}` and 12-hour
/// times (`4PM`) with `{start_time_12h}`.
pub fn templatize_json(value: &Value) -> Value {
    match value {
        Value::String(s) => {
            let mut text = s.clone();
            if let Some(re) = cached(&FULL_DATE, r"\d{4}/\d{1,2}/\d{1,2} \(\S+\)") {
                text = re.replace_all(&text, "{start_date_full}").into_owned();
            }
            if let Some(re) = cached(&CLOCK_12H, r"\d{1,2}(?:AM|PM)") {
                text = re.replace_all(&text, "{start_time_12h}").into_owned();
            }
            Value::String(text)
        }
        Value::Array(items) => Value::Array(items.iter().map(templatize_json).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), templatize_json(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}
