use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Host color values arrive wrapped in an object whose effective value is
/// a hex/RGB string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorSetting {
    pub color: String,
}

/// One configuration property value as supplied by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Number(f64),
    Color(ColorSetting),
    Text(String),
}

impl SettingValue {
    #[must_use]
    pub fn color(value: impl Into<String>) -> Self {
        Self::Color(ColorSetting {
            color: value.into(),
        })
    }
}

/// The host configuration bag: named objects (`chart`, `xAxis`, `yAxis`,
/// `statistics`, `subgroups`, `rules`), each mapping property names to
/// values. Lookup is pure and falls back to defaults; nothing here errors.
///
/// Object and property order is preserved so the host's settings UI can be
/// enumerated stably.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsBag {
    #[serde(flatten)]
    objects: IndexMap<String, IndexMap<String, SettingValue>>,
}

impl SettingsBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, object: &str, property: &str, value: SettingValue) -> Self {
        self.set(object, property, value);
        self
    }

    pub fn set(&mut self, object: &str, property: &str, value: SettingValue) {
        self.objects
            .entry(object.to_owned())
            .or_default()
            .insert(property.to_owned(), value);
    }

    #[must_use]
    pub fn object(&self, name: &str) -> Option<&IndexMap<String, SettingValue>> {
        self.objects.get(name)
    }

    fn value(&self, object: &str, property: &str) -> Option<&SettingValue> {
        self.objects.get(object)?.get(property)
    }

    /// Numeric property, or `default` when absent, non-numeric, or not finite.
    #[must_use]
    pub fn number_or(&self, object: &str, property: &str, default: f64) -> f64 {
        match self.value(object, property) {
            Some(SettingValue::Number(value)) if value.is_finite() => *value,
            _ => default,
        }
    }

    /// Integer property truncated from its numeric value and clamped into
    /// `min..=max`; `default` when absent or non-numeric.
    #[must_use]
    pub fn integer_in_range(
        &self,
        object: &str,
        property: &str,
        default: i64,
        min: i64,
        max: i64,
    ) -> i64 {
        let raw = match self.value(object, property) {
            Some(SettingValue::Number(value)) if value.is_finite() => *value as i64,
            _ => default,
        };
        raw.clamp(min, max)
    }

    /// Text property, or `default` when absent or not text.
    #[must_use]
    pub fn text_or(&self, object: &str, property: &str, default: &str) -> String {
        match self.value(object, property) {
            Some(SettingValue::Text(value)) => value.clone(),
            _ => default.to_owned(),
        }
    }

    /// Boolean property, or `default` when absent or not boolean.
    #[must_use]
    pub fn bool_or(&self, object: &str, property: &str, default: bool) -> bool {
        match self.value(object, property) {
            Some(SettingValue::Bool(value)) => *value,
            _ => default,
        }
    }

    /// Color property as its hex/RGB string. Accepts the host's wrapper
    /// object or a bare string; anything else yields `default`.
    #[must_use]
    pub fn color_or(&self, object: &str, property: &str, default: &str) -> String {
        match self.value(object, property) {
            Some(SettingValue::Color(wrapper)) => wrapper.color.clone(),
            Some(SettingValue::Text(value)) => value.clone(),
            _ => default.to_owned(),
        }
    }

    /// Serializes the bag to pretty JSON for debug/config files.
    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidSettings(format!("failed to serialize settings: {e}")))
    }

    /// Deserializes a bag from JSON.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidSettings(format!("failed to parse settings: {e}")))
    }
}
