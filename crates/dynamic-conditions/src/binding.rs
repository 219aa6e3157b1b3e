//! Dynamic-tag binding markup.
//!
//! A bound control stores markup such as
//! `[elementor-tag id="3a1" name="acf-date" settings="%7B%22key%22%3A%22field_1%3Adate%22%7D"]`.

use regex::Regex;
use std::sync::OnceLock;

/// Tag names with this prefix read custom fields.
pub const CUSTOM_FIELD_TAG_PREFIX: &str = "acf-";

/// A parsed binding.
#[derive(Debug, Clone, PartialEq)]
pub struct TagBinding {
    /// Name of the selected tag, e.g. `post-date`.
    pub name: String,
    /// Decoded tag settings, if any were readable.
    pub settings: Option<serde_json::Value>,
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"\sname="([^"]*)""#).expect("name pattern is valid"))
}

fn settings_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"\ssettings="([^"]*)""#).expect("settings pattern is valid"))
}

impl TagBinding {
    /// Parses binding markup. Returns `None` when no tag name can be read.
    pub fn parse(markup: &str) -> Option<Self> {
        let name = name_pattern()
            .captures(markup)
            .map(|caps| caps[1].trim().to_string())
            .filter(|name| !name.is_empty())?;

        let settings = settings_pattern()
            .captures(markup)
            .and_then(|caps| decode_settings(&caps[1]));

        Some(Self { name, settings })
    }

    /// Returns true if the tag reads a custom field.
    pub fn is_custom_field(&self) -> bool {
        self.name.starts_with(CUSTOM_FIELD_TAG_PREFIX)
    }

    /// The `key` setting of a custom-field tag, e.g. `field_5f1:date`.
    pub fn key(&self) -> Option<&str> {
        if !self.is_custom_field() {
            return None;
        }
        self.settings
            .as_ref()?
            .get("key")?
            .as_str()
            .filter(|key| !key.is_empty())
    }

    /// The field name the host looks up: the key up to the first `:`.
    pub fn field_key(&self) -> Option<&str> {
        self.key().and_then(|key| key.split(':').next())
    }
}

fn decode_settings(encoded: &str) -> Option<serde_json::Value> {
    let decoded = match urlencoding::decode(encoded) {
        Ok(decoded) => decoded,
        Err(err) => {
            tracing::debug!(error = %err, "binding settings are not valid url-encoding");
            return None;
        }
    };

    match serde_json::from_str(&decoded) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::debug!(error = %err, "binding settings are not valid json");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name() {
        let binding = TagBinding::parse(r#"[elementor-tag id="3a1" name="post-date" settings="%7B%7D"]"#).unwrap();
        assert_eq!(binding.name, "post-date");
        assert_eq!(binding.settings, Some(serde_json::json!({})));
        assert!(!binding.is_custom_field());
        assert_eq!(binding.key(), None);
    }

    #[test]
    fn test_parse_custom_field_key() {
        let markup = r#"[elementor-tag id="3a1" name="acf-date" settings="%7B%22key%22%3A%22field_5f1%3Aevent_date%22%7D"]"#;
        let binding = TagBinding::parse(markup).unwrap();
        assert!(binding.is_custom_field());
        assert_eq!(binding.key(), Some("field_5f1:event_date"));
        assert_eq!(binding.field_key(), Some("field_5f1"));
    }

    #[test]
    fn test_parse_without_name() {
        assert_eq!(TagBinding::parse(r#"[elementor-tag id="3a1"]"#), None);
        assert_eq!(TagBinding::parse(r#"[elementor-tag id="3a1" name=""]"#), None);
        assert_eq!(TagBinding::parse("plain text"), None);
    }

    #[test]
    fn test_unreadable_settings() {
        let binding = TagBinding::parse(r#"[elementor-tag name="acf-date" settings="not-json"]"#).unwrap();
        assert_eq!(binding.settings, None);
        assert_eq!(binding.field_key(), None);
    }
}
