use ratatui::style::Color;

use super::colors::ColorPalette;
use super::Theme;

/// A theme defined entirely by its colors.
pub struct PaletteTheme {
    name: &'static str,
    colors: ColorPalette,
}

impl PaletteTheme {
    pub const fn new(name: &'static str, colors: ColorPalette) -> Self {
        Self { name, colors }
    }

    pub const fn tokyo_night() -> Self {
        Self::new(
            "Tokyo Night",
            ColorPalette::from_hex([
                0x1a1b26, 0xc0caf5, 0x565f89, 0x24283b, 0x414868, 0x364a82, 0x7aa2f7, 0xbb9af7,
                0x9ece6a, 0xe0af68, 0xf7768e, 0x7dcfff,
            ]),
        )
    }

    pub const fn nord() -> Self {
        Self::new(
            "Nord",
            ColorPalette::from_hex([
                0x2e3440, 0xeceff4, 0x4c566a, 0x3b4252, 0x4c566a, 0x434c5e, 0x88c0d0, 0x81a1c1,
                0xa3be8c, 0xebcb8b, 0xbf616a, 0x5e81ac,
            ]),
        )
    }

    pub const fn gruvbox_dark() -> Self {
        Self::new(
            "Gruvbox Dark",
            ColorPalette::from_hex([
                0x282828, 0xebdbb2, 0x928374, 0x3c3836, 0x504945, 0x504945, 0xfe8019, 0xd3869b,
                0xb8bb26, 0xfabd2f, 0xfb4934, 0x83a598,
            ]),
        )
    }

    pub const fn catppuccin_latte() -> Self {
        Self::new(
            "Catppuccin Latte",
            ColorPalette::from_hex([
                0xeff1f5, 0x4c4f69, 0x9ca0b0, 0xe6e9ef, 0xbcc0cc, 0xdce0e8, 0x8839ef, 0xea76cb,
                0x40a02b, 0xdf8e1d, 0xd20f39, 0x1e66f5,
            ]),
        )
    }

    pub fn colors(&self) -> &ColorPalette {
        &self.colors
    }
}

impl Theme for PaletteTheme {
    fn name(&self) -> &'static str {
        self.name
    }

    fn background(&self) -> Color {
        self.colors.background
    }

    fn foreground(&self) -> Color {
        self.colors.foreground
    }

    fn foreground_dim(&self) -> Color {
        self.colors.foreground_dim
    }

    fn surface(&self) -> Color {
        self.colors.surface
    }

    fn border(&self) -> Color {
        self.colors.border
    }

    fn selection(&self) -> Color {
        self.colors.selection
    }

    fn accent(&self) -> Color {
        self.colors.accent
    }

    fn accent_secondary(&self) -> Color {
        self.colors.accent_secondary
    }

    fn success(&self) -> Color {
        self.colors.success
    }

    fn warning(&self) -> Color {
        self.colors.warning
    }

    fn error(&self) -> Color {
        self.colors.error
    }

    fn info(&self) -> Color {
        self.colors.info
    }
}
