//! The light/dark theme as seen by the chart.
//!
//! Only reading is handled here, the toggle that writes the preference lives
//! with the page chrome.

use std::fmt::Display;

/// The key under which the page persists the theme preference.
pub const THEME_STORAGE_KEY: &str = "theme";

/// The page colour theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    /// Dark text on a light background.
    #[default]
    Light,
    /// Light text on a dark background.
    Dark,
}

impl Theme {
    /// Interpret a persisted theme value.
    ///
    /// Only `"dark"` selects [Theme::Dark]. A missing or unrecognised value
    /// falls back to [Theme::Light].
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        }
    }

    /// The colour used for legend text.
    pub fn legend_text_color(self) -> &'static str {
        match self {
            Theme::Light => "#3a4763",
            Theme::Dark => "#9eaece",
        }
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}
