//! Rendering configuration passed to layout engines

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Colour theme requested from the layout engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Class tag the engine puts on the root canvas
    pub fn class_tag(&self) -> &'static str {
        match self {
            Theme::Light => "light-theme",
            Theme::Dark => "dark-theme",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(format!("Unknown theme: {}", s)),
        }
    }
}

/// Configuration for a layout run
///
/// Every field has a default, so partial JSON documents are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    pub theme: Theme,
    /// Font size in canvas units; text metrics scale with it
    pub font_size: f64,
    /// Inner padding of element boxes
    pub padding: f64,
    /// Gap between neighbouring boxes
    pub spacing: f64,
    /// Boxes per row before wrapping
    pub columns: usize,
}

impl RenderConfig {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            ..Self::default()
        }
    }

    /// Load a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Height of one text line in canvas units
    pub fn line_height(&self) -> f64 {
        self.font_size * 1.4
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            font_size: 14.0,
            padding: 8.0,
            spacing: 40.0,
            columns: 3,
        }
    }
}
