use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::EngineError;

const FALLBACK_COLOR: &str = "#64748b";

const WEEKDAY_COLORS: &[(&str, &str)] = &[
    ("monday", "#2563eb"),
    ("tuesday", "#7c3aed"),
    ("wednesday", "#0d9488"),
    ("thursday", "#d97706"),
    ("friday", "#dc2626"),
    ("saturday", "#db2777"),
    ("sunday", "#059669"),
];

const DARK_TEXT: &str = "#1f2937";
const LIGHT_TEXT: &str = "#ffffff";

/// Display colors for group outlines and badges.
///
/// Colors are keyed by the coarse category label (weekday name). The
/// category is cosmetic only: two distinct dates sharing a weekday share a
/// color but never an outline.
#[derive(Debug, Clone, Deserialize)]
pub struct Palette {
    #[serde(default = "default_fallback")]
    pub fallback: String,
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

fn default_fallback() -> String {
    FALLBACK_COLOR.to_string()
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            fallback: default_fallback(),
            colors: WEEKDAY_COLORS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl Palette {
    pub fn from_toml(content: &str) -> Result<Self, EngineError> {
        let mut palette: Palette = toml::from_str(content)?;
        // A partial palette file keeps the built-in weekday colors for the
        // categories it does not mention.
        for (key, value) in WEEKDAY_COLORS {
            palette
                .colors
                .entry(key.to_string())
                .or_insert_with(|| value.to_string());
        }
        Ok(palette)
    }

    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Color for a group, selected by its category label. Lookup is
    /// case-insensitive; unknown or missing categories take the fallback.
    pub fn color_for(&self, category: Option<&str>) -> &str {
        category
            .map(|c| c.trim().to_ascii_lowercase())
            .and_then(|c| self.colors.get(&c))
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }

    /// Badge text color with the higher WCAG contrast against `background`.
    pub fn text_color_on(&self, background: &str) -> &'static str {
        let Some(rgb) = parse_hex_rgb(background) else {
            return LIGHT_TEXT;
        };
        if relative_luminance(rgb) > 0.45 {
            DARK_TEXT
        } else {
            LIGHT_TEXT
        }
    }
}

fn parse_hex_rgb(value: &str) -> Option<(f32, f32, f32)> {
    let hex = value.trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()? as f32 / 255.0;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()? as f32 / 255.0;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()? as f32 / 255.0;
    Some((r, g, b))
}

fn relative_luminance(color: (f32, f32, f32)) -> f32 {
    let linear = |v: f32| {
        if v <= 0.03928 {
            v / 12.92
        } else {
            ((v + 0.055) / 1.055).powf(2.4)
        }
    };

    let (r, g, b) = color;
    0.2126 * linear(r) + 0.7152 * linear(g) + 0.0722 * linear(b)
}
