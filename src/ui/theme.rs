//! Theme color definitions for the UI
//!
//! Dark and light palettes selected from the configured [`Theme`].

use crate::config::Theme;
use crate::tools::ResultStatus;
use ratatui::style::Color;

/// Complete color palette for the UI
#[derive(Debug, Clone, Copy)]
pub struct ThemeColors {
    /// Primary foreground text
    pub fg: Color,
    /// Dimmed/secondary text, borders
    pub dim: Color,
    /// Bars and tab strip background
    pub bar: Color,
    /// Accent color (headings, active tab, chart line)
    pub accent: Color,
    pub green: Color,
    pub yellow: Color,
    pub red: Color,
    /// Key idle background
    pub key_off: Color,
    /// Key held background
    pub key_on: Color,
    pub key_text: Color,
    pub key_text_on: Color,
}

impl ThemeColors {
    /// Create a color palette for the given theme variant
    pub fn from_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::dark(),
            Theme::Light => Self::light(),
        }
    }

    pub fn dark() -> Self {
        Self {
            fg: Color::Rgb(200, 200, 210),
            dim: Color::Rgb(90, 90, 110),
            bar: Color::Rgb(45, 45, 58),
            accent: Color::Rgb(80, 200, 220),
            green: Color::Rgb(80, 200, 120),
            yellow: Color::Rgb(240, 180, 80),
            red: Color::Rgb(240, 90, 100),
            key_off: Color::Rgb(40, 40, 50),
            key_on: Color::Rgb(80, 200, 120),
            key_text: Color::Rgb(180, 180, 190),
            key_text_on: Color::Rgb(20, 20, 25),
        }
    }

    /// High contrast for bright terminals
    pub fn light() -> Self {
        Self {
            fg: Color::Rgb(30, 30, 40),
            dim: Color::Rgb(130, 130, 150),
            bar: Color::Rgb(210, 210, 220),
            accent: Color::Rgb(0, 130, 160),
            green: Color::Rgb(30, 150, 70),
            yellow: Color::Rgb(180, 120, 0),
            red: Color::Rgb(200, 50, 60),
            key_off: Color::Rgb(220, 220, 228),
            key_on: Color::Rgb(30, 150, 70),
            key_text: Color::Rgb(50, 50, 60),
            key_text_on: Color::Rgb(255, 255, 255),
        }
    }

    /// Color used for a result row of the given status
    pub fn status(&self, status: ResultStatus) -> Color {
        match status {
            ResultStatus::Ok => self.green,
            ResultStatus::Warning => self.yellow,
            ResultStatus::Error => self.red,
            ResultStatus::Info => self.accent,
        }
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self::dark()
    }
}
