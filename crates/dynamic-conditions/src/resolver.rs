//! Value resolution: settings to comparable values.

use crate::binding::TagBinding;
use crate::context::{EvaluationContext, Host};
use crate::date;
use crate::error::{ConditionError, Result};
use crate::settings::{ComparisonConfig, DynamicValue, ElementSettings, OrdinalSelection};
use crate::types::CompareType;
use crate::value::Value;
use tracing::{debug, warn};

/// Selected tag name used for values that are not bound to a tag.
pub const STATIC_TAG: &str = "static";

/// Where an element's dynamic value comes from.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueSource {
    /// Tag name, or [`STATIC_TAG`].
    pub selected_tag: String,
    /// The parsed binding, when the value is bound to a tag.
    pub binding: Option<TagBinding>,
}

impl ValueSource {
    /// Finds the value source of an element.
    ///
    /// A binding wins over a static value. A binding whose tag name cannot
    /// be read makes the element inert.
    pub fn of(settings: &ElementSettings) -> Result<Self> {
        if let Some(markup) = settings.dynamic_tag.as_deref().filter(|m| !m.trim().is_empty()) {
            return TagBinding::parse(markup)
                .map(|binding| Self {
                    selected_tag: binding.name.clone(),
                    binding: Some(binding),
                })
                .ok_or_else(|| {
                    ConditionError::UnresolvableValue(format!(
                        "binding of {} has no tag name",
                        settings.element
                    ))
                });
        }

        match &settings.dynamic_value {
            Some(value) if value.is_static_source() => Ok(Self {
                selected_tag: STATIC_TAG.to_string(),
                binding: None,
            }),
            _ => Err(ConditionError::UnresolvableValue(format!(
                "{} has neither a binding nor a static value",
                settings.element
            ))),
        }
    }

    /// The custom-field key of the binding, if any.
    pub fn tag_key(&self) -> Option<&str> {
        self.binding.as_ref().and_then(TagBinding::key)
    }
}

/// Values ready for the comparator.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedValues {
    pub selected_tag: String,
    pub tag_key: Option<String>,
    /// One entry per dynamic value, normalized for the compare type.
    pub actual: Vec<Value>,
    pub check: Value,
    pub check2: Value,
}

/// Turns element settings into comparable values.
pub struct ValueResolver<'a> {
    ctx: &'a EvaluationContext,
    host: &'a dyn Host,
}

impl<'a> ValueResolver<'a> {
    pub fn new(ctx: &'a EvaluationContext, host: &'a dyn Host) -> Self {
        Self { ctx, host }
    }

    /// Resolves the dynamic and reference values of an element.
    pub fn resolve(&self, settings: &ElementSettings) -> Result<ResolvedValues> {
        let source = ValueSource::of(settings)?;
        let compare_type = settings.compare_type();

        let raw = match self.custom_field_epoch(settings, &source) {
            Some(timestamp) => vec![Value::Int(timestamp)],
            None => self.raw_values(settings),
        };

        let actual = raw
            .into_iter()
            .map(|value| self.expand_value(settings, value))
            .map(|value| self.normalize_actual(settings, value, compare_type))
            .collect();

        let (check, check2) = self.reference_values(settings);

        debug!(
            element = %settings.element,
            tag = %source.selected_tag,
            compare_type = compare_type.as_str(),
            check = %check,
            "resolved condition values"
        );

        Ok(ResolvedValues {
            tag_key: source.tag_key().map(String::from),
            selected_tag: source.selected_tag,
            actual,
            check,
            check2,
        })
    }

    /// Flattens the dynamic value, dereferencing media items.
    fn raw_values(&self, settings: &ElementSettings) -> Vec<Value> {
        // a bound tag that rendered nothing compares as empty text
        let Some(dynamic) = &settings.dynamic_value else {
            return vec![Value::empty()];
        };

        dynamic
            .items()
            .into_iter()
            .filter_map(|item| match item {
                DynamicValue::Bool(true) => Some(Value::from("1")),
                DynamicValue::Bool(false) => Some(Value::empty()),
                DynamicValue::Int(n) => Some(Value::Int(*n)),
                DynamicValue::Float(f) => Some(Value::Float(*f)),
                DynamicValue::Text(s) => Some(Value::from(s.as_str())),
                DynamicValue::Media(media) => media
                    .id
                    .and_then(|id| self.host.attachment_url(id))
                    .or_else(|| media.url.clone().filter(|url| !url.is_empty()))
                    .map(Value::from),
                DynamicValue::List(_) => None,
            })
            .collect()
    }

    fn expand(&self, settings: &ElementSettings, text: &str) -> String {
        if settings.parse_shortcodes {
            self.host.expand_shortcodes(text)
        } else {
            text.to_string()
        }
    }

    fn expand_value(&self, settings: &ElementSettings, value: Value) -> Value {
        match value {
            Value::Text(text) if settings.parse_shortcodes => Value::Text(self.expand(settings, &text)),
            other => other,
        }
    }

    fn translate(&self, settings: &ElementSettings, text: &str) -> String {
        if settings.prevent_date_parsing {
            text.to_string()
        } else {
            date::translated_names_to_english(text, &self.ctx.locale)
        }
    }

    /// Epoch of a dynamic value; integers pass through.
    fn actual_epoch(&self, settings: &ElementSettings, value: &Value) -> Result<i64> {
        match value {
            Value::Int(n) => Ok(*n),
            other => {
                let text = self.translate(settings, &other.to_text());
                date::try_epoch(&text, self.ctx.now).ok_or(ConditionError::UnparseableDate(text))
            }
        }
    }

    fn normalize_actual(&self, settings: &ElementSettings, value: Value, compare_type: CompareType) -> Value {
        let offset = self.ctx.offset();
        let out_of_range = |ts: i64| ConditionError::UnparseableDate(format!("timestamp {} out of range", ts));
        let normalized = match compare_type {
            CompareType::Default => return value,
            CompareType::Date | CompareType::Strtotime => self.actual_epoch(settings, &value),
            CompareType::Days => self.actual_epoch(settings, &value).and_then(|ts| {
                date::weekday_number(ts, offset)
                    .map(i64::from)
                    .ok_or_else(|| out_of_range(ts))
            }),
            CompareType::Months => self.actual_epoch(settings, &value).and_then(|ts| {
                date::month_number(ts, offset)
                    .map(i64::from)
                    .ok_or_else(|| out_of_range(ts))
            }),
        };

        match normalized {
            Ok(normalized) => Value::Int(normalized),
            Err(err) => {
                debug!(error = %err, "dynamic value is not a date, comparing as text");
                value
            }
        }
    }

    /// Builds `(check, check2)` for the compare type.
    fn reference_values(&self, settings: &ElementSettings) -> (Value, Value) {
        match settings.comparison_config() {
            ComparisonConfig::Text { check, check2 } => (
                Value::Text(self.expand(settings, &check)),
                Value::Text(self.expand(settings, &check2)),
            ),
            ComparisonConfig::FreeText { check, check2 } => (
                self.free_text_reference(settings, &check),
                self.free_text_reference(settings, &check2),
            ),
            ComparisonConfig::Date { check, check2 } => (
                self.date_reference(settings, &check),
                self.date_reference(settings, &check2),
            ),
            ComparisonConfig::Days { check, check2 } => (
                self.ordinal_selection(settings, &check, date::weekday_index),
                self.ordinal_reference(settings, &check2, date::weekday_index),
            ),
            ComparisonConfig::Months { check, check2 } => (
                self.ordinal_selection(settings, &check, date::month_index),
                self.ordinal_reference(settings, &check2, date::month_index),
            ),
        }
    }

    fn free_text_reference(&self, settings: &ElementSettings, raw: &str) -> Value {
        let text = self.translate(settings, &self.expand(settings, raw));
        if text.trim().is_empty() {
            return Value::Text(text);
        }
        date::try_epoch(&text, self.ctx.now)
            .map(Value::Int)
            .unwrap_or(Value::Text(text))
    }

    fn date_reference(&self, settings: &ElementSettings, raw: &str) -> Value {
        let text = self.expand(settings, raw);
        date::parse_timestamp(&text)
            .or_else(|| date::parse_picker_date(&text, &self.ctx.date_picker_formats, self.ctx.offset()))
            .map(Value::Int)
            .unwrap_or(Value::Text(text))
    }

    fn ordinal_selection(
        &self,
        settings: &ElementSettings,
        selection: &OrdinalSelection,
        index_of: fn(&str) -> Option<u32>,
    ) -> Value {
        match selection {
            OrdinalSelection::Single(raw) => self.ordinal_reference(settings, raw, index_of),
            OrdinalSelection::Many(entries) => {
                let joined = entries
                    .iter()
                    .map(|entry| self.ordinal_reference(settings, entry, index_of).to_text())
                    .collect::<Vec<_>>()
                    .join(",");
                Value::Text(joined)
            }
        }
    }

    /// A weekday or month reference: an index, or a name mapped to its index.
    fn ordinal_reference(
        &self,
        settings: &ElementSettings,
        raw: &str,
        index_of: fn(&str) -> Option<u32>,
    ) -> Value {
        let text = self.expand(settings, raw);
        let trimmed = text.trim();
        if let Ok(index) = trimmed.parse::<i64>() {
            return Value::Int(index);
        }

        let english = self.translate(settings, trimmed);
        index_of(english.trim())
            .map(|index| Value::Int(i64::from(index)))
            .unwrap_or(Value::Text(english))
    }

    /// Epoch of a custom-field date the binding points at.
    fn custom_field_epoch(&self, settings: &ElementSettings, source: &ValueSource) -> Option<i64> {
        if settings.prevent_date_parsing {
            return None;
        }

        let key = source.binding.as_ref()?.field_key()?;
        let field = match self.host.custom_field(key) {
            Ok(Some(field)) => field,
            Ok(None) => return None,
            Err(err) => {
                warn!(element = %settings.element, key, error = %err, "custom field lookup failed, skipping date conversion");
                return None;
            }
        };

        if !field.is_date_field() || field.value.trim().is_empty() || field.return_format.trim().is_empty() {
            return None;
        }

        let value = date::translated_names_to_english(&field.value, &self.ctx.locale);
        let timestamp =
            date::parse_with_php_format(&value, &field.return_format, self.ctx.offset(), field.is_date_only());
        if timestamp.is_none() {
            debug!(key, value = %field.value, format = %field.return_format, "custom field date did not match its format");
        }
        timestamp
    }
}
