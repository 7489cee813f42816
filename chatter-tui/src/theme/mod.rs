mod colors;
mod loader;
mod palettes;

pub use colors::{hex_to_color, ColorPalette};
pub use loader::{ThemeLoader, ThemePreference};
pub use palettes::PaletteTheme;

use ratatui::style::Color;

pub trait Theme: Send + Sync {
    fn name(&self) -> &'static str;

    fn background(&self) -> Color;
    fn foreground(&self) -> Color;
    fn foreground_dim(&self) -> Color;

    fn surface(&self) -> Color;
    fn border(&self) -> Color;
    fn selection(&self) -> Color;

    fn accent(&self) -> Color;
    fn accent_secondary(&self) -> Color;

    fn success(&self) -> Color;
    fn warning(&self) -> Color;
    fn error(&self) -> Color;
    fn info(&self) -> Color;

    /// Bubble behind the local user's messages.
    fn own_bubble(&self) -> Color {
        self.selection()
    }

    /// Bubble behind everyone else's messages.
    fn other_bubble(&self) -> Color {
        self.surface()
    }
}

pub struct ThemeManager {
    themes: Vec<Box<dyn Theme>>,
    current_index: usize,
}

impl ThemeManager {
    pub fn new() -> Self {
        let themes: Vec<Box<dyn Theme>> = vec![
            Box::new(PaletteTheme::tokyo_night()),
            Box::new(PaletteTheme::nord()),
            Box::new(PaletteTheme::gruvbox_dark()),
            Box::new(PaletteTheme::catppuccin_latte()),
        ];

        Self {
            themes,
            current_index: 0,
        }
    }

    pub fn current_theme(&self) -> &dyn Theme {
        self.themes[self.current_index].as_ref()
    }

    pub fn cycle_theme(&mut self) {
        self.current_index = (self.current_index + 1) % self.themes.len();
    }

    /// Case-insensitive lookup. Returns false and keeps the current theme
    /// when nothing matches.
    pub fn set_theme_by_name(&mut self, name: &str) -> bool {
        let wanted = name.trim();
        if let Some(index) = self
            .themes
            .iter()
            .position(|t| t.name().eq_ignore_ascii_case(wanted))
        {
            self.current_index = index;
            true
        } else {
            false
        }
    }

    pub fn available_themes(&self) -> Vec<&'static str> {
        self.themes.iter().map(|t| t.name()).collect()
    }

    pub fn current_theme_name(&self) -> &'static str {
        self.current_theme().name()
    }
}

impl Default for ThemeManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme() {
        let manager = ThemeManager::new();
        assert_eq!(manager.current_theme_name(), "Tokyo Night");
    }

    #[test]
    fn test_cycle_wraps() {
        let mut manager = ThemeManager::new();
        let count = manager.available_themes().len();

        for _ in 0..count {
            manager.cycle_theme();
        }
        assert_eq!(manager.current_theme_name(), "Tokyo Night");

        manager.cycle_theme();
        assert_eq!(manager.current_theme_name(), "Nord");
    }

    #[test]
    fn test_set_theme_by_name() {
        let mut manager = ThemeManager::new();

        assert!(manager.set_theme_by_name("gruvbox dark"));
        assert_eq!(manager.current_theme_name(), "Gruvbox Dark");

        assert!(!manager.set_theme_by_name("Solarized"));
        assert_eq!(manager.current_theme_name(), "Gruvbox Dark");
    }

    #[test]
    fn test_bubble_defaults() {
        let theme = PaletteTheme::nord();
        assert_eq!(theme.own_bubble(), theme.selection());
        assert_eq!(theme.other_bubble(), theme.surface());
    }
}
