//! Element settings as stored by the page builder.

use crate::error::{ConditionError, Result};
use crate::types::{CompareType, ElementIdentity, Operator, Visibility};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// A media/attachment reference.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MediaRef {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
}

/// The dynamic value of an element before resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DynamicValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<DynamicValue>),
    Media(MediaRef),
}

impl DynamicValue {
    /// The values to iterate over; a single value is a one-element list.
    pub fn items(&self) -> Vec<&DynamicValue> {
        match self {
            DynamicValue::List(items) => items.iter().collect(),
            other => vec![other],
        }
    }

    /// Returns true if the value can act as a static source on its own.
    ///
    /// Empty text, `false`, an empty list and a media reference without id
    /// or url carry nothing to compare.
    pub fn is_static_source(&self) -> bool {
        match self {
            DynamicValue::Bool(flag) => *flag,
            DynamicValue::Int(_) | DynamicValue::Float(_) => true,
            DynamicValue::Text(text) => !text.is_empty(),
            DynamicValue::List(items) => items.iter().any(DynamicValue::is_static_source),
            DynamicValue::Media(media) => {
                media.id.is_some() || media.url.as_deref().is_some_and(|url| !url.is_empty())
            }
        }
    }
}

impl From<&str> for DynamicValue {
    fn from(s: &str) -> Self {
        DynamicValue::Text(s.to_string())
    }
}

impl From<i64> for DynamicValue {
    fn from(n: i64) -> Self {
        DynamicValue::Int(n)
    }
}

/// Configuration of one element instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSettings {
    /// The element these settings belong to.
    pub element: ElementIdentity,

    /// Raw dynamic-tag binding markup, e.g. `[elementor-tag id=".." name="post-date" settings=".."]`.
    #[serde(default)]
    pub dynamic_tag: Option<String>,

    /// Value produced by the bound tag, or a static value.
    #[serde(default)]
    pub dynamic_value: Option<DynamicValue>,

    /// Display form of the dynamic value, for diagnostics.
    #[serde(default)]
    pub dynamic_value_raw: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub condition: Option<Operator>,

    #[serde(default, deserialize_with = "lenient")]
    pub compare_type: Option<CompareType>,

    #[serde(default)]
    pub check_value: Option<String>,
    #[serde(default)]
    pub check_value2: Option<String>,

    #[serde(default)]
    pub date_value: Option<String>,
    #[serde(default)]
    pub date_value2: Option<String>,

    #[serde(default)]
    pub day_value: Option<String>,
    #[serde(default)]
    pub day_value2: Option<String>,
    #[serde(default)]
    pub day_array_value: Vec<String>,

    #[serde(default)]
    pub month_value: Option<String>,
    #[serde(default)]
    pub month_value2: Option<String>,
    #[serde(default)]
    pub month_array_value: Vec<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub visibility: Option<Visibility>,

    #[serde(default, deserialize_with = "switch")]
    pub hide_content_only: bool,
    #[serde(default, deserialize_with = "switch")]
    pub resize_other_columns: bool,
    #[serde(default)]
    pub hide_wrapper_selector: Option<String>,
    #[serde(default)]
    pub hide_others_selector: Option<String>,
    #[serde(default, deserialize_with = "switch")]
    pub parse_shortcodes: bool,
    #[serde(default, deserialize_with = "switch")]
    pub prevent_date_parsing: bool,
    #[serde(default, deserialize_with = "switch")]
    pub debug: bool,

    /// Width of a column in percent.
    #[serde(default, deserialize_with = "lenient_number")]
    pub column_size: Option<f64>,
}

/// Reads an enum from text; empty or unknown text becomes `None`.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

/// Reads a switch control, which is stored as `"yes"`/`""` or as a bool.
fn switch<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Switch {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    Ok(match Option::<Switch>::deserialize(deserializer)? {
        Some(Switch::Bool(b)) => b,
        Some(Switch::Int(n)) => n != 0,
        Some(Switch::Text(s)) => matches!(s.trim(), "yes" | "true" | "1" | "on"),
        None => false,
    })
}

fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Float(f64),
        Text(String),
    }

    Ok(match Option::<Number>::deserialize(deserializer)? {
        Some(Number::Float(n)) => Some(n),
        Some(Number::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ElementSettings {
    /// Creates settings with no condition configured.
    pub fn new(element: ElementIdentity) -> Self {
        Self {
            element,
            dynamic_tag: None,
            dynamic_value: None,
            dynamic_value_raw: None,
            condition: None,
            compare_type: None,
            check_value: None,
            check_value2: None,
            date_value: None,
            date_value2: None,
            day_value: None,
            day_value2: None,
            day_array_value: Vec::new(),
            month_value: None,
            month_value2: None,
            month_array_value: Vec::new(),
            visibility: None,
            hide_content_only: false,
            resize_other_columns: false,
            hide_wrapper_selector: None,
            hide_others_selector: None,
            parse_shortcodes: false,
            prevent_date_parsing: false,
            debug: false,
            column_size: None,
        }
    }

    /// Sets the dynamic value.
    pub fn with_dynamic_value(mut self, value: impl Into<DynamicValue>) -> Self {
        self.dynamic_value = Some(value.into());
        self
    }

    /// Sets the dynamic-tag binding markup.
    pub fn with_dynamic_tag(mut self, tag: impl Into<String>) -> Self {
        self.dynamic_tag = Some(tag.into());
        self
    }

    /// Sets the operator.
    pub fn with_condition(mut self, operator: Operator) -> Self {
        self.condition = Some(operator);
        self
    }

    /// Sets the compare type.
    pub fn with_compare_type(mut self, compare_type: CompareType) -> Self {
        self.compare_type = Some(compare_type);
        self
    }

    /// Sets the text reference values.
    pub fn with_check_value(mut self, value: impl Into<String>) -> Self {
        self.check_value = Some(value.into());
        self
    }

    /// Sets the second text reference value.
    pub fn with_check_value2(mut self, value: impl Into<String>) -> Self {
        self.check_value2 = Some(value.into());
        self
    }

    /// Sets the polarity.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Turns on debug output.
    pub fn with_debug(mut self) -> Self {
        self.debug = true;
        self
    }

    /// Parses settings from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let settings: ElementSettings = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parses settings from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: ElementSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serializes the settings to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| ConditionError::SerializationError(e.to_string()))
    }

    /// Serializes the settings to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ConditionError::SerializationError(e.to_string()))
    }

    /// Validates the settings.
    pub fn validate(&self) -> Result<()> {
        if self.element.id.is_empty() {
            return Err(ConditionError::ValidationError("Element ID is required".to_string()));
        }

        if self.element.element_type.is_empty() {
            return Err(ConditionError::ValidationError(format!(
                "Element type is required for '{}'",
                self.element.id
            )));
        }

        if let Some(size) = self.column_size {
            if !(0.0..=100.0).contains(&size) {
                return Err(ConditionError::ValidationError(format!(
                    "Column size {} of '{}' is not a percentage",
                    size, self.element.id
                )));
            }
        }

        Ok(())
    }

    /// The configured compare type, `default` when unset.
    pub fn compare_type(&self) -> CompareType {
        self.compare_type.unwrap_or_default()
    }

    /// The configured polarity, `hide` when unset.
    pub fn visibility(&self) -> Visibility {
        self.visibility.unwrap_or_default()
    }

    /// CSS selector of an ancestor to hide along with the element.
    pub fn hide_wrapper_selector(&self) -> Option<&str> {
        non_empty(&self.hide_wrapper_selector)
    }

    /// CSS selector of other elements to hide along with the element.
    pub fn hide_others_selector(&self) -> Option<&str> {
        non_empty(&self.hide_others_selector)
    }

    /// Builds the reference-value configuration for the compare type.
    pub fn comparison_config(&self) -> ComparisonConfig {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        let in_array = self.condition == Some(Operator::InArray);

        match self.compare_type() {
            CompareType::Default => ComparisonConfig::Text {
                check: text(&self.check_value),
                check2: text(&self.check_value2),
            },
            CompareType::Strtotime => ComparisonConfig::FreeText {
                check: text(&self.check_value),
                check2: text(&self.check_value2),
            },
            CompareType::Date => ComparisonConfig::Date {
                check: text(&self.date_value),
                check2: text(&self.date_value2),
            },
            CompareType::Days => ComparisonConfig::Days {
                check: if in_array {
                    OrdinalSelection::Many(self.day_array_value.clone())
                } else {
                    OrdinalSelection::Single(text(&self.day_value))
                },
                check2: text(&self.day_value2),
            },
            CompareType::Months => ComparisonConfig::Months {
                check: if in_array {
                    OrdinalSelection::Many(self.month_array_value.clone())
                } else {
                    OrdinalSelection::Single(text(&self.month_value))
                },
                check2: text(&self.month_value2),
            },
        }
    }
}

/// Reference value(s) for weekday or month comparisons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrdinalSelection {
    /// One selected entry (an index, or free text naming a day/month).
    Single(String),
    /// Several selected entries, used by `in_array`.
    Many(Vec<String>),
}

/// Reference values of a rule, one variant per compare type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComparisonConfig {
    /// Plain text comparison.
    Text { check: String, check2: String },
    /// Date-picker values.
    Date { check: String, check2: String },
    /// Weekday indices 1..=7.
    Days { check: OrdinalSelection, check2: String },
    /// Month indices 1..=12.
    Months { check: OrdinalSelection, check2: String },
    /// Free-text date expressions.
    FreeText { check: String, check2: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_yaml() {
        let yaml = r#"
element:
  id: 4f2a
  type: widget
  name: heading
dynamicValue: "5"
condition: equal
checkValue: "5"
visibility: show
hideContentOnly: "yes"
parseShortcodes: ""
"#;

        let settings = ElementSettings::from_yaml(yaml).unwrap();
        assert_eq!(settings.element.id, "4f2a");
        assert_eq!(settings.condition, Some(Operator::Equal));
        assert_eq!(settings.visibility(), Visibility::Show);
        assert_eq!(settings.compare_type(), CompareType::Default);
        assert!(settings.hide_content_only);
        assert!(!settings.parse_shortcodes);
        assert_eq!(settings.dynamic_value, Some(DynamicValue::Text("5".to_string())));
    }

    #[test]
    fn test_unknown_condition_is_none() {
        let json = r#"{"element": {"id": "a", "type": "widget"}, "condition": "matches", "visibility": ""}"#;
        let settings = ElementSettings::from_json(json).unwrap();
        assert_eq!(settings.condition, None);
        assert_eq!(settings.visibility(), Visibility::Hide);
    }

    #[test]
    fn test_dynamic_value_shapes() {
        let json = r#"{"element": {"id": "a", "type": "widget"},
            "dynamicValue": [1, "two", {"id": 7, "url": "https://x/7.png"}, true]}"#;
        let settings = ElementSettings::from_json(json).unwrap();
        let value = settings.dynamic_value.unwrap();
        let items = value.items();
        assert_eq!(items.len(), 4);
        assert_eq!(items[0], &DynamicValue::Int(1));
        assert_eq!(
            items[2],
            &DynamicValue::Media(MediaRef { id: Some(7), url: Some("https://x/7.png".to_string()) })
        );
        assert_eq!(items[3], &DynamicValue::Bool(true));
    }

    #[test]
    fn test_static_source() {
        assert!(DynamicValue::from("x").is_static_source());
        assert!(!DynamicValue::Media(MediaRef::default()).is_static_source());
        assert!(DynamicValue::Media(MediaRef { id: Some(3), url: None }).is_static_source());
        assert!(DynamicValue::Int(0).is_static_source());

        assert!(!DynamicValue::from("").is_static_source());
        assert!(!DynamicValue::Bool(false).is_static_source());
        assert!(!DynamicValue::List(vec![]).is_static_source());
        assert!(!DynamicValue::List(vec!["".into()]).is_static_source());
        assert!(DynamicValue::List(vec!["".into(), "a".into()]).is_static_source());
    }

    #[test]
    fn test_validate_column_size() {
        let json = r#"{"element": {"id": "c", "type": "column"}, "columnSize": "150"}"#;
        assert!(ElementSettings::from_json(json).is_err());

        let json = r#"{"element": {"id": "c", "type": "column"}, "columnSize": 33.3}"#;
        let settings = ElementSettings::from_json(json).unwrap();
        assert_eq!(settings.column_size, Some(33.3));
    }

    #[test]
    fn test_days_config_uses_array_for_in_array() {
        let mut settings = ElementSettings::new(ElementIdentity::new("a", "widget", "text"))
            .with_condition(Operator::InArray)
            .with_compare_type(CompareType::Days);
        settings.day_array_value = vec!["1".to_string(), "3".to_string()];

        assert_eq!(
            settings.comparison_config(),
            ComparisonConfig::Days {
                check: OrdinalSelection::Many(vec!["1".to_string(), "3".to_string()]),
                check2: String::new(),
            }
        );
    }

    #[test]
    fn test_round_trip_yaml() {
        let settings = ElementSettings::new(ElementIdentity::new("a", "section", "section"))
            .with_dynamic_value("hello")
            .with_condition(Operator::Contains)
            .with_check_value("ell");
        let yaml = settings.to_yaml().unwrap();
        assert_eq!(ElementSettings::from_yaml(&yaml).unwrap(), settings);
    }
}
