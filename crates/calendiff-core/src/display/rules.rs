//! Type-mapping rules.
//!
//! A rule file is a JSON array of objects:
//!
//! ```json
//! [
//!   {
//!     "priority": 10,
//!     "conditions": [{ "column": "type", "operator": "equals", "value": "gacha" }],
//!     "output": "Summon",
//!     "post_name": "Summon Event",
//!     "icon": "summon.png",
//!     "event_title_en": "Summon Event",
//!     "event_title_ja": "召喚イベント"
//!   }
//! ]
//! ```
//!
//! Rules are tried in ascending priority (rules without a priority go last,
//! ties keep file order). The first rule whose conditions all hold decides
//! the row's display info; a rule with no conditions always holds.

use regex::Regex;
use serde::Deserialize;

use crate::errors::CalendiffError;
use crate::model::columns;
use crate::model::EventRecord;

/// Prefix joined with a rule's `icon` file name.
pub const BASE_ICON_URL: &str =
    "https://bbcamp.info/wp-content/uploads/camp-img/calendar_type_icon/";

/// A compiled test against one cell value.
#[derive(Debug, Clone)]
pub enum ConditionTest {
    Equals(String),
    Contains(String),
    StartsWith(String),
    EndsWith(String),
    /// Unanchored regex search
    Matches(Regex),
}

impl ConditionTest {
    pub fn operator(&self) -> &'static str {
        match self {
            ConditionTest::Equals(_) => "equals",
            ConditionTest::Contains(_) => "contains",
            ConditionTest::StartsWith(_) => "starts_with",
            ConditionTest::EndsWith(_) => "ends_with",
            ConditionTest::Matches(_) => "matches",
        }
    }

    pub fn test(&self, cell: &str) -> bool {
        match self {
            ConditionTest::Equals(v) => cell == v,
            ConditionTest::Contains(v) => cell.contains(v.as_str()),
            ConditionTest::StartsWith(v) => cell.starts_with(v.as_str()),
            ConditionTest::EndsWith(v) => cell.ends_with(v.as_str()),
            ConditionTest::Matches(re) => re.is_match(cell),
        }
    }
}

/// One predicate of a rule.
#[derive(Debug, Clone)]
pub struct Condition {
    pub column: String,
    pub test: ConditionTest,
}

impl Condition {
    /// A blank or absent cell never satisfies a condition.
    pub fn holds(&self, record: &EventRecord) -> bool {
        record
            .cell(&self.column)
            .map(|cell| self.test.test(&cell))
            .unwrap_or(false)
    }
}

/// A compiled type-mapping rule.
#[derive(Debug, Clone)]
pub struct TypeRule {
    pub priority: Option<f64>,
    pub conditions: Vec<Condition>,
    pub output: Option<String>,
    pub post_name: Option<String>,
    pub icon: Option<String>,
    pub event_title_en: Option<String>,
    pub event_title_ja: Option<String>,
}

impl TypeRule {
    pub fn matches(&self, record: &EventRecord) -> bool {
        self.conditions.iter().all(|c| c.holds(record))
    }

    /// Display info for a record this rule matched.
    pub fn apply(&self, record: &EventRecord) -> DisplayInfo {
        let display_type = self
            .output
            .clone()
            .unwrap_or_else(|| type_column(record));
        let post_name = self
            .post_name
            .clone()
            .unwrap_or_else(|| display_type.clone());
        let icon_url = self
            .icon
            .as_deref()
            .filter(|icon| !icon.is_empty())
            .map(|icon| format!("{}{}", BASE_ICON_URL, icon));
        DisplayInfo {
            event_title_en: self
                .event_title_en
                .clone()
                .unwrap_or_else(|| post_name.clone()),
            event_title_ja: self
                .event_title_ja
                .clone()
                .unwrap_or_else(|| post_name.clone()),
            display_type,
            icon_url,
            post_name,
        }
    }
}

/// What the rules decided for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayInfo {
    pub display_type: String,
    pub icon_url: Option<String>,
    pub post_name: String,
    pub event_title_en: String,
    pub event_title_ja: String,
}

impl DisplayInfo {
    /// Info for a record no rule matched: everything is the `type` cell.
    pub fn fallback(record: &EventRecord) -> Self {
        let ty = type_column(record);
        DisplayInfo {
            display_type: ty.clone(),
            icon_url: None,
            post_name: ty.clone(),
            event_title_en: ty.clone(),
            event_title_ja: ty,
        }
    }
}

fn type_column(record: &EventRecord) -> String {
    record
        .cell(columns::TYPE)
        .map(|c| c.into_owned())
        .unwrap_or_default()
}

/// Rules sorted into evaluation order.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<TypeRule>,
}

impl RuleSet {
    pub fn new(mut rules: Vec<TypeRule>) -> Self {
        // sort_by is stable, so equal priorities keep file order
        rules.sort_by(|a, b| match (a.priority, b.priority) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        Self { rules }
    }

    /// Parse and compile a JSON rule file.
    ///
    /// # Errors
    ///
    /// - `Serialization`: not a JSON array of rule objects
    /// - `UnknownOperator`: a condition names an unsupported operator
    /// - `InvalidPattern`: a `matches` value is not a valid regex
    pub fn from_json(text: &str) -> Result<Self, CalendiffError> {
        let raw: Vec<RawRule> = serde_json::from_str(text).map_err(|e| {
            CalendiffError::Serialization {
                message: format!("type mapping rules: {}", e),
            }
        })?;
        let rules = raw
            .into_iter()
            .enumerate()
            .map(|(index, rule)| rule.compile(index))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules))
    }

    pub fn rules(&self) -> &[TypeRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First matching rule's display info, or the `type`-column fallback.
    pub fn resolve(&self, record: &EventRecord) -> DisplayInfo {
        self.rules
            .iter()
            .find(|rule| rule.matches(record))
            .map(|rule| rule.apply(record))
            .unwrap_or_else(|| DisplayInfo::fallback(record))
    }
}

#[derive(Debug, Deserialize)]
struct RawRule {
    #[serde(default)]
    priority: Option<f64>,
    #[serde(default)]
    conditions: Vec<RawCondition>,
    #[serde(default)]
    output: Option<String>,
    #[serde(default)]
    post_name: Option<String>,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    event_title_en: Option<String>,
    #[serde(default)]
    event_title_ja: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCondition {
    column: String,
    operator: String,
    #[serde(default)]
    value: serde_json::Value,
}

impl RawRule {
    fn compile(self, rule_index: usize) -> Result<TypeRule, CalendiffError> {
        let conditions = self
            .conditions
            .into_iter()
            .map(|c| c.compile(rule_index))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TypeRule {
            priority: self.priority,
            conditions,
            output: self.output,
            post_name: self.post_name,
            icon: self.icon,
            event_title_en: self.event_title_en,
            event_title_ja: self.event_title_ja,
        })
    }
}

impl RawCondition {
    fn compile(self, rule_index: usize) -> Result<Condition, CalendiffError> {
        let value = stringify(&self.value);
        let test = match self.operator.as_str() {
            "equals" => ConditionTest::Equals(value),
            "contains" => ConditionTest::Contains(value),
            "starts_with" => ConditionTest::StartsWith(value),
            "ends_with" => ConditionTest::EndsWith(value),
            "matches" => {
                let re = Regex::new(&value).map_err(|e| CalendiffError::InvalidPattern {
                    rule_index,
                    pattern: value.clone(),
                    reason: e.to_string(),
                })?;
                ConditionTest::Matches(re)
            }
            other => {
                return Err(CalendiffError::UnknownOperator {
                    rule_index,
                    operator: other.to_string(),
                })
            }
        };
        Ok(Condition {
            column: self.column,
            test,
        })
    }
}

fn stringify(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gacha() -> EventRecord {
        EventRecord::default()
            .with_diff_id("e1")
            .with_extra("type", "gacha_limited")
    }

    #[test]
    fn test_priority_order_first_match_wins() {
        let rules = RuleSet::from_json(
            r#"[
                {"conditions": [], "output": "Catch-all"},
                {"priority": 5, "conditions": [{"column": "type", "operator": "starts_with", "value": "gacha"}], "output": "Summon"},
                {"priority": 1, "conditions": [{"column": "type", "operator": "equals", "value": "gacha_limited"}], "output": "Limited"}
            ]"#,
        )
        .unwrap();
        assert_eq!(rules.resolve(&gacha()).display_type, "Limited");

        let other = EventRecord::default().with_extra("type", "gacha_normal");
        assert_eq!(rules.resolve(&other).display_type, "Summon");

        let unrelated = EventRecord::default().with_extra("type", "pvp");
        assert_eq!(rules.resolve(&unrelated).display_type, "Catch-all");
    }

    #[test]
    fn test_fallback_to_type_column() {
        let info = RuleSet::default().resolve(&gacha());
        assert_eq!(info.display_type, "gacha_limited");
        assert_eq!(info.post_name, "gacha_limited");
        assert_eq!(info.icon_url, None);
    }

    #[test]
    fn test_apply_defaults_chain() {
        let rules = RuleSet::from_json(
            r#"[{"conditions": [{"column": "type", "operator": "contains", "value": "limited"}],
                 "output": "Limited", "icon": "lim.png"}]"#,
        )
        .unwrap();
        let info = rules.resolve(&gacha());
        assert_eq!(info.post_name, "Limited");
        assert_eq!(info.event_title_en, "Limited");
        assert_eq!(info.event_title_ja, "Limited");
        assert_eq!(info.icon_url.as_deref(), Some(&*format!("{}lim.png", BASE_ICON_URL)));
    }

    #[test]
    fn test_blank_cell_never_matches() {
        let rules = RuleSet::from_json(
            r#"[{"conditions": [{"column": "questline", "operator": "matches", "value": ".*"}], "output": "Quest"}]"#,
        )
        .unwrap();
        let blank = gacha().with_extra("questline", "");
        assert_eq!(rules.resolve(&blank).display_type, "gacha_limited");
    }

    #[test]
    fn test_numeric_values_are_stringified() {
        let rules = RuleSet::from_json(
            r#"[{"conditions": [{"column": "startDate", "operator": "equals", "value": 100}], "output": "At100"}]"#,
        )
        .unwrap();
        let rec = EventRecord::default().with_times(100, 200);
        assert_eq!(rules.resolve(&rec).display_type, "At100");
    }

    #[test]
    fn test_regex_is_a_search() {
        let rules = RuleSet::from_json(
            r#"[{"conditions": [{"column": "type", "operator": "matches", "value": "lim"}], "output": "L"}]"#,
        )
        .unwrap();
        assert_eq!(rules.resolve(&gacha()).display_type, "L");
    }

    #[test]
    fn test_unknown_operator_is_rejected() {
        let err = RuleSet::from_json(
            r#"[{}, {"conditions": [{"column": "type", "operator": "like", "value": "x"}]}]"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            CalendiffError::UnknownOperator {
                rule_index: 1,
                operator: "like".into()
            }
        );
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        let err = RuleSet::from_json(
            r#"[{"conditions": [{"column": "type", "operator": "matches", "value": "("}]}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, CalendiffError::InvalidPattern { rule_index: 0, .. }));
    }
}
