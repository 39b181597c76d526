//! Theme domain model.

use serde::{Deserialize, Serialize};

use crate::error::{OpsdeckError, Result};

/// Display preferences for the dashboard.
///
/// No validation beyond shape: colors are opaque strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeConfig {
    pub primary_color: String,
    pub accent_color: String,
    pub background_color: String,
    pub dark_mode: bool,
    pub compact_mode: bool,
    pub animations_enabled: bool,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            primary_color: "#6366f1".to_string(),
            accent_color: "#22d3ee".to_string(),
            background_color: "#0f172a".to_string(),
            dark_mode: true,
            compact_mode: false,
            animations_enabled: true,
        }
    }
}

impl ThemeConfig {
    /// Shallow-merges `patch` into `self`. Unset fields are preserved.
    ///
    /// Returns true if any field actually changed.
    pub fn apply(&mut self, patch: ThemePatch) -> bool {
        let before = self.clone();
        if let Some(v) = patch.primary_color {
            self.primary_color = v;
        }
        if let Some(v) = patch.accent_color {
            self.accent_color = v;
        }
        if let Some(v) = patch.background_color {
            self.background_color = v;
        }
        if let Some(v) = patch.dark_mode {
            self.dark_mode = v;
        }
        if let Some(v) = patch.compact_mode {
            self.compact_mode = v;
        }
        if let Some(v) = patch.animations_enabled {
            self.animations_enabled = v;
        }
        *self != before
    }
}

/// Partial theme update; every field is an optional override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compact_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animations_enabled: Option<bool>,
}

impl ThemePatch {
    pub fn is_empty(&self) -> bool {
        *self == ThemePatch::default()
    }

    /// Sets one field from a `key`/`value` pair as typed on a command line.
    ///
    /// Keys accept both `snake_case` and `camelCase` spellings.
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<()> {
        let key = key.trim().replace('_', "").to_ascii_lowercase();
        match key.as_str() {
            "primarycolor" | "primary" => self.primary_color = Some(value.to_string()),
            "accentcolor" | "accent" => self.accent_color = Some(value.to_string()),
            "backgroundcolor" | "background" => self.background_color = Some(value.to_string()),
            "darkmode" | "dark" => self.dark_mode = Some(parse_flag(value)?),
            "compactmode" | "compact" => self.compact_mode = Some(parse_flag(value)?),
            "animationsenabled" | "animations" => {
                self.animations_enabled = Some(parse_flag(value)?)
            }
            _ => {
                return Err(OpsdeckError::invalid_input(format!(
                    "unknown theme field '{}'",
                    key
                )));
            }
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        other => Err(OpsdeckError::invalid_input(format!(
            "expected a boolean, got '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_preserves_unset_fields() {
        let mut theme = ThemeConfig::default();
        let changed = theme.apply(ThemePatch {
            accent_color: Some("#ff0000".to_string()),
            ..Default::default()
        });

        assert!(changed);
        assert_eq!(theme.accent_color, "#ff0000");
        assert_eq!(theme.primary_color, ThemeConfig::default().primary_color);
        assert!(theme.dark_mode);
    }

    #[test]
    fn test_apply_same_values_reports_unchanged() {
        let mut theme = ThemeConfig::default();
        let changed = theme.apply(ThemePatch {
            dark_mode: Some(true),
            ..Default::default()
        });
        assert!(!changed);
    }

    #[test]
    fn test_set_field_spellings() {
        let mut patch = ThemePatch::default();
        patch.set_field("dark_mode", "off").unwrap();
        patch.set_field("primaryColor", "#000").unwrap();
        assert_eq!(patch.dark_mode, Some(false));
        assert_eq!(patch.primary_color.as_deref(), Some("#000"));

        assert!(patch.set_field("font", "serif").is_err());
        assert!(patch.set_field("compact", "maybe").is_err());
    }

    #[test]
    fn test_partial_json_patch() {
        let patch: ThemePatch = serde_json::from_str(r#"{"compactMode": true}"#).unwrap();
        assert_eq!(patch.compact_mode, Some(true));
        assert!(patch.primary_color.is_none());
    }
}
