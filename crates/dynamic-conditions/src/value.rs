//! Comparable values with loose (PHP 8 style) comparison semantics.
//!
//! Numeric-looking text compares numerically against numbers and other
//! numeric text; everything else falls back to byte-wise string comparison.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

/// A resolved value ready for comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
}

fn numeric_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?\s*$").expect("numeric pattern is valid")
    })
}

/// Returns true if the text is numeric in the PHP `is_numeric` sense.
pub fn is_numeric_str(text: &str) -> bool {
    numeric_pattern().is_match(text)
}

impl Value {
    /// Empty text.
    pub fn empty() -> Self {
        Value::Text(String::new())
    }

    /// Numeric interpretation, if the value is numeric or numeric-looking.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            Value::Text(s) if is_numeric_str(s) => s.trim().parse::<f64>().ok(),
            Value::Text(_) => None,
        }
    }

    /// Returns true if the value is numeric or numeric-looking.
    pub fn is_numeric(&self) -> bool {
        self.as_number().is_some()
    }

    /// String form used for substring and length comparisons.
    pub fn to_text(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// PHP `empty()`: `""`, `"0"`, `0` and `0.0` are empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Int(n) => *n == 0,
            Value::Float(f) => *f == 0.0,
            Value::Text(s) => s.is_empty() || s == "0",
        }
    }

    /// Loose equality (`==`).
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) => a == b,
            _ => self.to_text() == other.to_text(),
        }
    }

    /// Loose ordering (`<`, `>`, `<=`, `>=`).
    ///
    /// Returns `None` only for NaN operands.
    pub fn loose_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => Some(self.to_text().as_bytes().cmp(other.to_text().as_bytes())),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::empty()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}
