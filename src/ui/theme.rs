//! Color schemes and ANSI escape sequence generation.
//!
//! Two schemes are built in, `campus-dark` (default) and `campus-light`.
//! Custom schemes are read from TOML:
//!
//! ```toml
//! name = "my-theme"
//!
//! [colors]
//! heading = "#cdd6f4"
//! text = "#cdd6f4"
//! dim = "#6c7086"
//! accent = "#89b4fa"
//! match_fg = "#1e1e2e"
//! match_bg = "#f9e2af"
//! success = "#a6e3a1"
//! error = "#f38ba8"
//! ```

use crate::domain::{PortalError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Named color scheme.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

/// Hex colors (`"#rrggbb"`) for each kind of output.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ThemeColors {
    /// Screen titles and section headings.
    pub heading: String,
    pub text: String,
    /// Secondary details: subtitles, dates, the search line.
    pub dim: String,
    /// Current page in the pagination bar.
    pub accent: String,
    /// Search term matches.
    pub match_fg: String,
    pub match_bg: String,
    pub success: String,
    pub error: String,
}

impl Theme {
    /// Looks up a built-in scheme.
    ///
    /// ```rust
    /// use campus_portal::ui::Theme;
    ///
    /// assert_eq!(Theme::from_name("campus-light").map(|t| t.name), Some("campus-light".into()));
    /// assert!(Theme::from_name("solarized").is_none());
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let colors = match name {
            "campus-dark" => dark_colors(),
            "campus-light" => light_colors(),
            _ => return None,
        };
        Some(Self {
            name: name.to_string(),
            colors,
        })
    }

    /// # Errors
    ///
    /// Returns [`PortalError::Config`] if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| PortalError::Config(format!("failed to read theme file: {e}")))?;
        toml::from_str(&contents)
            .map_err(|e| PortalError::Config(format!("failed to parse theme: {e}")))
    }

    /// Malformed colors come out white.
    fn hex_to_rgb(hex: &str) -> (u8, u8, u8) {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return (255, 255, 255);
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).unwrap_or(255);
        (channel(0..2), channel(2..4), channel(4..6))
    }

    /// 24-bit foreground escape for `hex`.
    #[must_use]
    pub fn fg(hex: &str) -> String {
        let (r, g, b) = Self::hex_to_rgb(hex);
        format!("\u{001b}[38;2;{r};{g};{b}m")
    }

    /// 24-bit background escape for `hex`.
    #[must_use]
    pub fn bg(hex: &str) -> String {
        let (r, g, b) = Self::hex_to_rgb(hex);
        format!("\u{001b}[48;2;{r};{g};{b}m")
    }

    #[must_use]
    pub const fn bold() -> &'static str {
        "\u{001b}[1m"
    }

    #[must_use]
    pub const fn reset() -> &'static str {
        "\u{001b}[0m"
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "campus-dark".to_string(),
            colors: dark_colors(),
        }
    }
}

fn dark_colors() -> ThemeColors {
    ThemeColors {
        heading: "#cdd6f4".into(),
        text: "#cdd6f4".into(),
        dim: "#6c7086".into(),
        accent: "#89b4fa".into(),
        match_fg: "#1e1e2e".into(),
        match_bg: "#f9e2af".into(),
        success: "#a6e3a1".into(),
        error: "#f38ba8".into(),
    }
}

fn light_colors() -> ThemeColors {
    ThemeColors {
        heading: "#4c4f69".into(),
        text: "#4c4f69".into(),
        dim: "#8c8fa1".into(),
        accent: "#1e66f5".into(),
        match_fg: "#eff1f5".into(),
        match_bg: "#df8e1d".into(),
        success: "#40a02b".into(),
        error: "#d20f39".into(),
    }
}
