//! Engine configuration documents.

use crate::context::{EvaluationContext, DEFAULT_DATE_PICKER_FORMATS};
use crate::error::{ConditionError, Result};
use crate::locale::{Locale, DEFAULT_LOCALE};
use crate::parser::SettingsFormat;
use crate::types::RenderMode;
use chrono::{FixedOffset, Utc};
use serde::{Deserialize, Serialize};

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

fn default_formats() -> Vec<String> {
    DEFAULT_DATE_PICKER_FORMATS.iter().map(|f| f.to_string()).collect()
}

/// Site-wide settings shared by every evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Site locale, e.g. `de_DE`.
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Site timezone as minutes east of UTC.
    #[serde(default)]
    pub utc_offset_minutes: i32,

    /// strftime formats accepted for `date` compare values.
    #[serde(default = "default_formats")]
    pub date_picker_formats: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            utc_offset_minutes: 0,
            date_picker_formats: default_formats(),
        }
    }
}

impl EngineConfig {
    /// Parses a configuration document, detecting JSON or YAML.
    pub fn parse(content: &str) -> Result<Self> {
        match SettingsFormat::detect(content) {
            SettingsFormat::Json => Self::from_json(content),
            SettingsFormat::Yaml => Self::from_yaml(content),
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: EngineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        self.offset()?;

        if self.locale.trim().is_empty() {
            return Err(ConditionError::ConfigError("locale must not be empty".to_string()));
        }

        if self.date_picker_formats.iter().all(|f| f.trim().is_empty()) {
            return Err(ConditionError::ConfigError(
                "at least one date picker format is required".to_string(),
            ));
        }

        Ok(())
    }

    /// The site timezone.
    pub fn offset(&self) -> Result<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ConditionError::ConfigError(format!(
                    "UTC offset of {} minutes is out of range",
                    self.utc_offset_minutes
                ))
            })
    }

    /// Builds a context for one render, clocked at the current time.
    pub fn context(&self, mode: RenderMode) -> Result<EvaluationContext> {
        let offset = self.offset()?;
        Ok(EvaluationContext::new(mode)
            .with_locale(Locale::new(self.locale.clone()))
            .with_now(Utc::now().with_timezone(&offset))
            .with_date_picker_formats(self.date_picker_formats.clone()))
    }
}
