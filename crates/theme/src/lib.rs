pub mod colors;

pub use colors::Color;

use tele_config::ThemeConfig;

/// Compiled theme derived from [`ThemeConfig`].
///
/// All colors are pre-parsed from hex strings into normalised `[0, 1]` RGBA.
/// Calling [`Theme::from_config`] is infallible; invalid color strings fall
/// back to safe defaults.
#[derive(Debug, Clone)]
pub struct Theme {
    pub background:  Color,
    pub foreground:  Color,
    pub accent:      Color,
    /// Temperature trace (left axis).
    pub temperature: Color,
    /// Frequency trace (right axis).
    pub frequency:   Color,
    /// Grid lines and axis frame.
    pub grid:        Color,
    pub font_size:   f32,
}

impl Theme {
    /// Build a [`Theme`] from the config file's `[theme]` section.
    pub fn from_config(cfg: &ThemeConfig) -> Self {
        Self {
            background:  Color::from_hex(&cfg.background).unwrap_or(Color::DARK),
            foreground:  Color::from_hex(&cfg.foreground).unwrap_or(Color::WHITE),
            accent:      Color::from_hex(&cfg.accent).unwrap_or(Color::PURPLE),
            temperature: Color::from_hex(&cfg.temperature).unwrap_or(Color::FIREBRICK),
            frequency:   Color::from_hex(&cfg.frequency).unwrap_or(Color::ROYALBLUE),
            grid:        Color::from_hex(&cfg.grid).unwrap_or(Color::SURFACE),
            font_size:   cfg.font_size,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default())
    }
}
