//! Settings document parser.

use crate::error::{ConditionError, Result};
use crate::settings::ElementSettings;
use serde::{Deserialize, Serialize};

/// Supported settings document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    Yaml,
    Json,
}

impl SettingsFormat {
    /// Detects format from file extension.
    pub fn from_extension(path: &str) -> Option<Self> {
        if path.ends_with(".yaml") || path.ends_with(".yml") {
            Some(SettingsFormat::Yaml)
        } else if path.ends_with(".json") {
            Some(SettingsFormat::Json)
        } else {
            None
        }
    }

    /// Detects format from content.
    pub fn detect(content: &str) -> Self {
        let trimmed = content.trim();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            SettingsFormat::Json
        } else {
            SettingsFormat::Yaml
        }
    }
}

/// Parses element settings from a string, auto-detecting format.
pub fn parse_settings(content: &str) -> Result<ElementSettings> {
    let format = SettingsFormat::detect(content);
    parse_settings_with_format(content, format)
}

/// Parses element settings from a string with specified format.
pub fn parse_settings_with_format(content: &str, format: SettingsFormat) -> Result<ElementSettings> {
    match format {
        SettingsFormat::Yaml => ElementSettings::from_yaml(content),
        SettingsFormat::Json => ElementSettings::from_json(content),
    }
}

/// Parses every document of a multi-document YAML stream.
pub fn parse_settings_documents(content: &str) -> Result<Vec<ElementSettings>> {
    let mut elements = Vec::new();

    for document in serde_yaml::Deserializer::from_str(content) {
        let value = serde_yaml::Value::deserialize(document)?;
        if value.is_null() {
            continue;
        }

        let settings: ElementSettings = serde_yaml::from_value(value)?;
        settings.validate()?;
        elements.push(settings);
    }

    Ok(elements)
}

/// Settings of every conditioned element on a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsPack {
    /// Page or template identifier.
    pub id: String,

    #[serde(default)]
    pub name: String,

    pub elements: Vec<ElementSettings>,
}

impl SettingsPack {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            elements: Vec::new(),
        }
    }

    pub fn add_element(&mut self, settings: ElementSettings) {
        self.elements.push(settings);
    }

    /// Settings of the element with the given id.
    pub fn element(&self, id: &str) -> Option<&ElementSettings> {
        self.elements.iter().find(|settings| settings.element.id == id)
    }

    /// Parses a pack, detecting JSON or YAML.
    pub fn parse(content: &str) -> Result<Self> {
        let pack: SettingsPack = match SettingsFormat::detect(content) {
            SettingsFormat::Json => serde_json::from_str(content)?,
            SettingsFormat::Yaml => serde_yaml::from_str(content)?,
        };
        pack.validate()?;
        Ok(pack)
    }

    /// Validates every element and rejects duplicate ids.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for settings in &self.elements {
            settings.validate()?;
            if !seen.insert(settings.element.id.as_str()) {
                return Err(ConditionError::ValidationError(format!(
                    "Duplicate element ID '{}' in pack '{}'",
                    settings.element.id, self.id
                )));
            }
        }
        Ok(())
    }

    /// Serializes the pack to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| ConditionError::SerializationError(e.to_string()))
    }
}
