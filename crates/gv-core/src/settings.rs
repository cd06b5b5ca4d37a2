//! Global style settings read by the view adapters

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use egui::Color32;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::SettingsError;

/// How a selected map shape is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Replace the fill with the highlight color
    Fill,
    /// Keep the fill, thicken and recolor the border
    #[default]
    Outline,
}

/// What clicking a histogram bar does to the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinClickMode {
    /// Deselect the bin if it is fully selected, otherwise add it
    #[default]
    Toggle,
    /// Always add the bin to the selection
    Additive,
    /// Select exactly the bin
    Replace,
}

macro_rules! impl_keyword {
    ($t:ty, $field:literal, { $($kw:literal => $v:expr),* $(,)? }) => {
        impl FromStr for $t {
            type Err = SettingsError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($kw => Ok($v),)*
                    _ => Err(SettingsError::UnknownKeyword {
                        field: $field,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                $(if *self == $v { return f.write_str($kw); })*
                Ok(())
            }
        }
    };
}

impl_keyword!(SelectionMode, "map_selection_style", {
    "fill" => SelectionMode::Fill,
    "outline" => SelectionMode::Outline,
});

impl_keyword!(BinClickMode, "bin_click_mode", {
    "toggle" => BinClickMode::Toggle,
    "additive" => BinClickMode::Additive,
    "replace" => BinClickMode::Replace,
});

/// Style preferences shared by all workspaces
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSettings {
    /// Background of highlighted table rows
    pub row_highlight_color: Color32,
    /// Fill (fill mode) or border (outline mode) of selected shapes
    pub map_highlight_color: Color32,
    /// Border weight of selected shapes in outline mode
    pub map_highlight_weight: f32,
    pub selection_mode: SelectionMode,
    /// Fill opacity of the data layer, in `[0, 1]`
    pub data_opacity: f32,
    /// Number of histogram bins
    pub bin_count: usize,
    pub bin_click: BinClickMode,
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            row_highlight_color: Color32::from_rgb(0xe6, 0xe6, 0xfa),
            map_highlight_color: Color32::from_rgb(0x93, 0x70, 0xdb),
            map_highlight_weight: 2.0,
            selection_mode: SelectionMode::Outline,
            data_opacity: 0.7,
            bin_count: 10,
            bin_click: BinClickMode::Toggle,
        }
    }
}

/// Parse a `#rrggbb` color
pub fn parse_hex_color(s: &str) -> Option<Color32> {
    let hex = s.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
}

/// Format a color as `#rrggbb`
pub fn to_hex_color(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}

/// Settings as raw key/value form state, as entered by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsForm {
    pub highlight_color: String,
    pub map_highlight_color: String,
    pub map_highlight_weight: String,
    pub map_selection_style: String,
    pub data_opacity: String,
    pub bin_count: String,
    pub bin_click_mode: String,
}

impl From<&StyleSettings> for SettingsForm {
    fn from(s: &StyleSettings) -> Self {
        Self {
            highlight_color: to_hex_color(s.row_highlight_color),
            map_highlight_color: to_hex_color(s.map_highlight_color),
            map_highlight_weight: s.map_highlight_weight.to_string(),
            map_selection_style: s.selection_mode.to_string(),
            data_opacity: s.data_opacity.to_string(),
            bin_count: s.bin_count.to_string(),
            bin_click_mode: s.bin_click.to_string(),
        }
    }
}

/// Largest histogram bin count a user may enter
pub const MAX_BIN_COUNT: usize = 1000;

/// Parse a bin count entered by the user; must be an integer in `1..=MAX_BIN_COUNT`
pub fn parse_bin_count(raw: &str) -> Result<usize, SettingsError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if (1..=MAX_BIN_COUNT).contains(&n) => Ok(n),
        Ok(_) => Err(SettingsError::OutOfRange {
            field: "bin_count",
            value: raw.to_string(),
            min: 1.0,
            max: MAX_BIN_COUNT as f32,
        }),
        Err(_) => Err(SettingsError::InvalidNumber {
            field: "bin_count",
            value: raw.to_string(),
        }),
    }
}

impl TryFrom<&SettingsForm> for StyleSettings {
    type Error = SettingsError;

    fn try_from(form: &SettingsForm) -> Result<Self, Self::Error> {
        let color = |field: &'static str, value: &str| {
            parse_hex_color(value).ok_or_else(|| SettingsError::InvalidColor {
                field,
                value: value.to_string(),
            })
        };
        let number =
            |field: &'static str, value: &str, min: f32, max: f32| -> Result<f32, SettingsError> {
                let parsed: f32 = value
                    .trim()
                    .parse()
                    .map_err(|_| SettingsError::InvalidNumber {
                        field,
                        value: value.to_string(),
                    })?;
                if parsed.is_finite() && (min..=max).contains(&parsed) {
                    Ok(parsed)
                } else {
                    Err(SettingsError::OutOfRange {
                        field,
                        value: value.to_string(),
                        min,
                        max,
                    })
                }
            };

        Ok(Self {
            row_highlight_color: color("highlight_color", &form.highlight_color)?,
            map_highlight_color: color("map_highlight_color", &form.map_highlight_color)?,
            map_highlight_weight: number(
                "map_highlight_weight",
                &form.map_highlight_weight,
                0.0,
                50.0,
            )?,
            selection_mode: form.map_selection_style.parse()?,
            data_opacity: number("data_opacity", &form.data_opacity, 0.0, 1.0)?,
            bin_count: parse_bin_count(&form.bin_count)?,
            bin_click: form.bin_click_mode.parse()?,
        })
    }
}

/// Which groups of settings a save changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsDelta {
    pub highlight_color_changed: bool,
    pub style_changed: bool,
    pub opacity_changed: bool,
    pub row_color_changed: bool,
    pub bin_count_changed: bool,
    pub bin_click_changed: bool,
}

impl SettingsDelta {
    pub fn between(old: &StyleSettings, new: &StyleSettings) -> Self {
        Self {
            highlight_color_changed: old.map_highlight_color != new.map_highlight_color,
            style_changed: old.selection_mode != new.selection_mode
                || old.map_highlight_weight != new.map_highlight_weight,
            opacity_changed: old.data_opacity != new.data_opacity,
            row_color_changed: old.row_highlight_color != new.row_highlight_color,
            bin_count_changed: old.bin_count != new.bin_count,
            bin_click_changed: old.bin_click != new.bin_click,
        }
    }

    /// Whether selected map shapes need restyling
    pub fn affects_map(&self) -> bool {
        self.highlight_color_changed || self.style_changed || self.opacity_changed
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Process-wide settings, changed only through [`SettingsStore::save`]
#[derive(Clone, Default)]
pub struct SettingsStore {
    settings: Arc<RwLock<StyleSettings>>,
}

impl SettingsStore {
    pub fn new(settings: StyleSettings) -> Self {
        Self {
            settings: Arc::new(RwLock::new(settings)),
        }
    }

    /// Snapshot of the current settings
    pub fn get(&self) -> StyleSettings {
        self.settings.read().clone()
    }

    /// Current settings as form state for the settings dialog
    pub fn form(&self) -> SettingsForm {
        SettingsForm::from(&*self.settings.read())
    }

    /// Validate and apply a submitted form. Nothing changes on error.
    pub fn save(&self, form: &SettingsForm) -> Result<SettingsDelta, SettingsError> {
        let new = StyleSettings::try_from(form)?;
        let mut settings = self.settings.write();
        let delta = SettingsDelta::between(&settings, &new);
        *settings = new;
        drop(settings);

        info!(?delta, "Style settings saved");
        Ok(delta)
    }

    /// Change only the bin count
    pub fn set_bin_count(&self, raw: &str) -> Result<usize, SettingsError> {
        let bins = parse_bin_count(raw)?;
        self.settings.write().bin_count = bins;
        Ok(bins)
    }

    /// Export the settings form as JSON
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self.form()).unwrap_or(serde_json::Value::Null)
    }

    /// Apply a JSON settings form
    pub fn load_json(&self, value: serde_json::Value) -> Result<SettingsDelta, SettingsError> {
        let form: SettingsForm =
            serde_json::from_value(value).map_err(|e| SettingsError::Malformed(e.to_string()))?;
        self.save(&form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let color = parse_hex_color("#9370DB").unwrap();
        assert_eq!(color, Color32::from_rgb(0x93, 0x70, 0xdb));
        assert_eq!(to_hex_color(color), "#9370db");
        assert!(parse_hex_color("9370db").is_none());
        assert!(parse_hex_color("#93").is_none());
    }

    #[test]
    fn test_form_defaults() {
        let store = SettingsStore::default();
        let form = store.form();
        assert_eq!(form.highlight_color, "#e6e6fa");
        assert_eq!(form.map_selection_style, "outline");
        assert_eq!(form.bin_count, "10");
        assert_eq!(form.bin_click_mode, "toggle");
    }

    #[test]
    fn test_save_reports_changes() {
        let store = SettingsStore::default();
        let mut form = store.form();
        form.map_selection_style = "fill".to_string();
        form.data_opacity = "0.5".to_string();

        let delta = store.save(&form).unwrap();
        assert!(delta.style_changed);
        assert!(delta.opacity_changed);
        assert!(!delta.highlight_color_changed);
        assert_eq!(store.get().selection_mode, SelectionMode::Fill);
        assert_eq!(store.get().data_opacity, 0.5);
    }

    #[test]
    fn test_invalid_form_keeps_settings() {
        let store = SettingsStore::default();
        let mut form = store.form();
        form.data_opacity = "0.2".to_string();
        form.bin_count = "ten".to_string();

        assert!(matches!(
            store.save(&form),
            Err(SettingsError::InvalidNumber { field: "bin_count", .. })
        ));
        assert_eq!(store.get(), StyleSettings::default());
    }

    #[test]
    fn test_opacity_out_of_range() {
        let store = SettingsStore::default();
        let mut form = store.form();
        form.data_opacity = "1.5".to_string();
        assert!(matches!(store.save(&form), Err(SettingsError::OutOfRange { .. })));
    }

    #[test]
    fn test_bin_count_rejects_zero() {
        let store = SettingsStore::default();
        assert!(store.set_bin_count("0").is_err());
        assert_eq!(store.set_bin_count(" 4 ").unwrap(), 4);
        assert_eq!(store.get().bin_count, 4);
    }

    #[test]
    fn test_bin_count_upper_bound() {
        let store = SettingsStore::default();
        assert!(matches!(
            store.set_bin_count("100000000000"),
            Err(SettingsError::OutOfRange { field: "bin_count", .. })
        ));
        assert_eq!(store.get().bin_count, 10);
        assert_eq!(parse_bin_count("1000").unwrap(), MAX_BIN_COUNT);
        assert!(parse_bin_count("1001").is_err());
    }

    #[test]
    fn test_json_form() {
        let store = SettingsStore::default();
        let mut json = store.to_json();
        json["bin_click_mode"] = serde_json::json!("replace");
        let delta = store.load_json(json).unwrap();
        assert!(delta.bin_click_changed);
        assert_eq!(store.get().bin_click, BinClickMode::Replace);
    }
}
