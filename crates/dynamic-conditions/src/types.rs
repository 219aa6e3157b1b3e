//! Core types for the condition engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity of the layout element being rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementIdentity {
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: String,
    #[serde(default)]
    pub name: String,
}

impl ElementIdentity {
    /// Creates a new element identity.
    pub fn new(
        id: impl Into<String>,
        element_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            element_type: element_type.into(),
            name: name.into(),
        }
    }

    /// Returns true if the element is a layout column.
    pub fn is_column(&self) -> bool {
        self.element_type == "column"
    }
}

impl fmt::Display for ElementIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} ({})", self.name, self.id, self.element_type)
    }
}

/// Comparison operator configured on an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equal,
    NotEqual,
    Contains,
    NotContains,
    Empty,
    NotEmpty,
    Less,
    Greater,
    Between,
    InArray,
    InArrayContains,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "equal",
            Operator::NotEqual => "not_equal",
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
            Operator::Empty => "empty",
            Operator::NotEmpty => "not_empty",
            Operator::Less => "less",
            Operator::Greater => "greater",
            Operator::Between => "between",
            Operator::InArray => "in_array",
            Operator::InArrayContains => "in_array_contains",
        }
    }

    /// Loop policy as `(stop_on_true, stop_on_false)`.
    pub fn short_circuit(&self) -> (bool, bool) {
        match self {
            Operator::NotEqual | Operator::NotContains | Operator::Empty => (false, true),
            _ => (true, false),
        }
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "equal" => Ok(Operator::Equal),
            "not_equal" => Ok(Operator::NotEqual),
            "contains" => Ok(Operator::Contains),
            "not_contains" => Ok(Operator::NotContains),
            "empty" => Ok(Operator::Empty),
            "not_empty" => Ok(Operator::NotEmpty),
            "less" => Ok(Operator::Less),
            "greater" => Ok(Operator::Greater),
            "between" => Ok(Operator::Between),
            "in_array" => Ok(Operator::InArray),
            "in_array_contains" => Ok(Operator::InArrayContains),
            other => Err(format!("unknown operator '{}'", other)),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic domain the values are normalized into before comparing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareType {
    /// Plain text.
    #[default]
    Default,
    /// Date/time picker values.
    Date,
    /// ISO weekday numbers (1 = Monday).
    Days,
    /// Month numbers (1 = January).
    Months,
    /// Free-text date expressions.
    Strtotime,
}

impl CompareType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareType::Default => "default",
            CompareType::Date => "date",
            CompareType::Days => "days",
            CompareType::Months => "months",
            CompareType::Strtotime => "strtotime",
        }
    }
}

impl FromStr for CompareType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "default" => Ok(CompareType::Default),
            "date" => Ok(CompareType::Date),
            "days" => Ok(CompareType::Days),
            "months" => Ok(CompareType::Months),
            "strtotime" => Ok(CompareType::Strtotime),
            other => Err(format!("unknown compare type '{}'", other)),
        }
    }
}

/// Polarity of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Show the element only when the condition is met.
    Show,
    /// Hide the element when the condition is met.
    #[default]
    Hide,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Show => "show",
            Visibility::Hide => "hide",
        }
    }

    /// Turns a condition result into a hide decision.
    pub fn hides(&self, condition_met: bool) -> bool {
        match self {
            Visibility::Show => !condition_met,
            Visibility::Hide => condition_met,
        }
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "show" => Ok(Visibility::Show),
            "hide" => Ok(Visibility::Hide),
            other => Err(format!("unknown visibility '{}'", other)),
        }
    }
}

/// Which surface the host is rendering for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Design-time editor; conditions never hide anything.
    Edit,
    /// Editor preview frame.
    Preview,
    /// Live site.
    #[default]
    Website,
}

/// A date field exposed by a custom-field tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    /// Field type, e.g. `date_picker` or `date_time_picker`.
    #[serde(rename = "type")]
    pub field_type: String,
    /// Formatted value as stored by the field.
    pub value: String,
    /// PHP-style date format the value is stored in.
    pub return_format: String,
}

impl CustomField {
    /// Returns true if the field only carries a day (no time of day).
    pub fn is_date_only(&self) -> bool {
        self.field_type.trim() == "date_picker"
    }

    /// Returns true if the field holds a date the engine can convert.
    pub fn is_date_field(&self) -> bool {
        matches!(self.field_type.trim(), "date_picker" | "date_time_picker")
    }
}
