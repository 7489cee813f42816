use ratatui::style::Color;

/// The twelve slots every theme fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPalette {
    pub background: Color,
    pub foreground: Color,
    pub foreground_dim: Color,
    pub surface: Color,
    pub border: Color,
    pub selection: Color,
    pub accent: Color,
    pub accent_secondary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
}

impl ColorPalette {
    /// Slots in declaration order: background, foreground, foreground_dim,
    /// surface, border, selection, accent, accent_secondary, success, warning,
    /// error, info.
    pub const fn from_hex(hex: [u32; 12]) -> Self {
        Self {
            background: hex_to_color(hex[0]),
            foreground: hex_to_color(hex[1]),
            foreground_dim: hex_to_color(hex[2]),
            surface: hex_to_color(hex[3]),
            border: hex_to_color(hex[4]),
            selection: hex_to_color(hex[5]),
            accent: hex_to_color(hex[6]),
            accent_secondary: hex_to_color(hex[7]),
            success: hex_to_color(hex[8]),
            warning: hex_to_color(hex[9]),
            error: hex_to_color(hex[10]),
            info: hex_to_color(hex[11]),
        }
    }
}

pub const fn hex_to_color(hex: u32) -> Color {
    let r = ((hex >> 16) & 0xFF) as u8;
    let g = ((hex >> 8) & 0xFF) as u8;
    let b = (hex & 0xFF) as u8;
    Color::Rgb(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_color() {
        assert_eq!(hex_to_color(0x1a1b26), Color::Rgb(0x1a, 0x1b, 0x26));
        assert_eq!(hex_to_color(0xffffff), Color::Rgb(255, 255, 255));
    }

    #[test]
    fn test_from_hex_slot_order() {
        let palette = ColorPalette::from_hex([
            0x000001, 0x000002, 0x000003, 0x000004, 0x000005, 0x000006, 0x000007, 0x000008,
            0x000009, 0x00000a, 0x00000b, 0x00000c,
        ]);
        assert_eq!(palette.background, Color::Rgb(0, 0, 1));
        assert_eq!(palette.accent, Color::Rgb(0, 0, 7));
        assert_eq!(palette.info, Color::Rgb(0, 0, 12));
    }
}
