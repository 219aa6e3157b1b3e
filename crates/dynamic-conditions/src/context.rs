//! Evaluation context and host callbacks.

use crate::error::{ConditionError, Result};
use crate::locale::Locale;
use crate::tags::ItemQuery;
use crate::types::{CustomField, RenderMode};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Date-picker formats tried when none are configured.
pub const DEFAULT_DATE_PICKER_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d"];

fn default_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&Utc.fix())
}

fn default_date_picker_formats() -> Vec<String> {
    DEFAULT_DATE_PICKER_FORMATS.iter().map(|f| f.to_string()).collect()
}

/// Everything the engine needs to know about the current render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationContext {
    /// Surface being rendered.
    #[serde(default)]
    pub mode: RenderMode,

    /// Whether the current user may edit posts or pages.
    #[serde(default)]
    pub can_edit: bool,

    /// Site locale used to translate date names.
    #[serde(default)]
    pub locale: Locale,

    /// Reference clock for relative date expressions.
    #[serde(default = "default_now")]
    pub now: DateTime<FixedOffset>,

    /// strftime formats accepted for `date` compare values.
    #[serde(default = "default_date_picker_formats")]
    pub date_picker_formats: Vec<String>,
}

impl EvaluationContext {
    /// Creates a website context at the current time in UTC.
    pub fn new(mode: RenderMode) -> Self {
        Self {
            mode,
            can_edit: false,
            locale: Locale::english(),
            now: default_now(),
            date_picker_formats: default_date_picker_formats(),
        }
    }

    /// Grants or revokes edit privileges.
    pub fn with_can_edit(mut self, can_edit: bool) -> Self {
        self.can_edit = can_edit;
        self
    }

    /// Sets the site locale.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Pins the reference clock.
    pub fn with_now(mut self, now: DateTime<FixedOffset>) -> Self {
        self.now = now;
        self
    }

    /// Replaces the accepted date-picker formats.
    pub fn with_date_picker_formats(mut self, formats: Vec<String>) -> Self {
        self.date_picker_formats = formats;
        self
    }

    /// The UTC offset of the reference clock.
    pub fn offset(&self) -> FixedOffset {
        *self.now.offset()
    }

    /// Returns true when rendering inside the editor.
    pub fn is_edit(&self) -> bool {
        self.mode == RenderMode::Edit
    }

    /// Validates the context.
    pub fn validate(&self) -> Result<()> {
        if self.date_picker_formats.iter().all(|f| f.trim().is_empty()) {
            return Err(ConditionError::ConfigError(
                "at least one date picker format is required".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for EvaluationContext {
    fn default() -> Self {
        Self::new(RenderMode::Website)
    }
}

/// Callbacks into the page-builder host.
pub trait Host {
    /// Expands shortcodes in `text`.
    fn expand_shortcodes(&self, text: &str) -> String {
        text.to_string()
    }

    /// URL of an attachment, if it exists.
    fn attachment_url(&self, id: u64) -> Option<String>;

    /// Looks up a custom field by key.
    fn custom_field(&self, key: &str) -> Result<Option<CustomField>>;

    /// Counts content items matching a query.
    fn count_items(&self, query: &ItemQuery) -> usize;
}

/// A host backed by in-memory tables.
#[derive(Debug, Clone, Default)]
pub struct StaticHost {
    shortcodes: HashMap<String, String>,
    attachments: HashMap<u64, String>,
    fields: HashMap<String, CustomField>,
    broken_fields: HashSet<String>,
    item_count: usize,
}

impl StaticHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a shortcode; `[name]` expands to `replacement`.
    pub fn with_shortcode(mut self, name: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.shortcodes.insert(name.into(), replacement.into());
        self
    }

    pub fn with_attachment(mut self, id: u64, url: impl Into<String>) -> Self {
        self.attachments.insert(id, url.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, field: CustomField) -> Self {
        self.fields.insert(key.into(), field);
        self
    }

    /// Makes lookups of `key` fail with a host error.
    pub fn with_broken_field(mut self, key: impl Into<String>) -> Self {
        self.broken_fields.insert(key.into());
        self
    }

    pub fn with_item_count(mut self, count: usize) -> Self {
        self.item_count = count;
        self
    }
}

impl Host for StaticHost {
    fn expand_shortcodes(&self, text: &str) -> String {
        self.shortcodes
            .iter()
            .fold(text.to_string(), |text, (name, replacement)| {
                text.replace(&format!("[{}]", name), replacement)
            })
    }

    fn attachment_url(&self, id: u64) -> Option<String> {
        self.attachments.get(&id).cloned()
    }

    fn custom_field(&self, key: &str) -> Result<Option<CustomField>> {
        if self.broken_fields.contains(key) {
            return Err(ConditionError::HostError(format!("field lookup for '{}' failed", key)));
        }
        Ok(self.fields.get(key).cloned())
    }

    fn count_items(&self, _query: &ItemQuery) -> usize {
        self.item_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_defaults_from_json() {
        let ctx: EvaluationContext = serde_json::from_str(r#"{"mode": "preview", "locale": "de_DE"}"#).unwrap();
        assert_eq!(ctx.mode, RenderMode::Preview);
        assert!(!ctx.can_edit);
        assert_eq!(ctx.locale.code(), "de_DE");
        assert_eq!(ctx.date_picker_formats.len(), 3);
        assert!(ctx.validate().is_ok());
    }

    #[test]
    fn test_context_builders() {
        let now = DateTime::parse_from_rfc3339("2024-03-13T10:30:00+02:00").unwrap();
        let ctx = EvaluationContext::new(RenderMode::Edit).with_can_edit(true).with_now(now);
        assert!(ctx.is_edit());
        assert_eq!(ctx.offset().local_minus_utc(), 7200);
    }

    #[test]
    fn test_empty_formats_invalid() {
        let ctx = EvaluationContext::default().with_date_picker_formats(vec![String::new()]);
        assert!(ctx.validate().is_err());
    }

    #[test]
    fn test_static_host() {
        let host = StaticHost::new()
            .with_shortcode("year", "2024")
            .with_attachment(7, "https://example.com/7.png")
            .with_broken_field("field_x");

        assert_eq!(host.expand_shortcodes("in [year]!"), "in 2024!");
        assert_eq!(host.attachment_url(7).as_deref(), Some("https://example.com/7.png"));
        assert_eq!(host.attachment_url(8), None);
        assert!(host.custom_field("field_x").is_err());
        assert_eq!(host.custom_field("field_y").unwrap(), None);
    }
}
