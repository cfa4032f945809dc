use ratatui::style::Color;

use crate::model::UiConfig;

/// Parsed color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    /// Accent: checked boxes, celebration, focused borders
    pub highlight: Color,
    pub dim: Color,
    pub red: Color,
    pub selection_bg: Color,
    pub selection_border: Color,
    /// Background of the floating row while dragging
    pub drag_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x0C, 0x00, 0x1B),
            text: Color::Rgb(0xB0, 0xAA, 0xFF),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0xFB, 0x41, 0x96),
            dim: Color::Rgb(0x7D, 0x78, 0xBF),
            red: Color::Rgb(0xFF, 0x44, 0x44),
            selection_bg: Color::Rgb(0x3D, 0x14, 0x38),
            selection_border: Color::Rgb(0xFB, 0x41, 0x96),
            drag_bg: Color::Rgb(0x2A, 0x1F, 0x4F),
        }
    }
}

/// Parse a hex color string like "#FF4444" into an RGB Color
fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

impl Theme {
    /// Create a theme from the `[ui]` config, falling back to defaults
    pub fn from_config(ui: &UiConfig) -> Self {
        let mut theme = Theme::default();

        for (key, value) in &ui.colors {
            let Some(color) = parse_hex_color(value) else {
                tracing::warn!(key = %key, value = %value, "ignoring unparsable color");
                continue;
            };
            match key.as_str() {
                "background" => theme.background = color,
                "text" => theme.text = color,
                "text_bright" => theme.text_bright = color,
                "highlight" => theme.highlight = color,
                "dim" => theme.dim = color,
                "red" => theme.red = color,
                "selection_bg" => theme.selection_bg = color,
                "selection_border" => theme.selection_border = color,
                "drag_bg" => theme.drag_bg = color,
                _ => {}
            }
        }

        theme
    }

    /// Title color for a task row
    pub fn task_color(&self, completed: bool) -> Color {
        if completed { self.dim } else { self.text_bright }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(
            parse_hex_color("#FF4444"),
            Some(Color::Rgb(0xFF, 0x44, 0x44))
        );
        assert_eq!(
            parse_hex_color("#0C001B"),
            Some(Color::Rgb(0x0C, 0x00, 0x1B))
        );
        assert_eq!(parse_hex_color("FF4444"), None); // missing #
        assert_eq!(parse_hex_color("#FF44"), None); // too short
        assert_eq!(parse_hex_color("#ZZZZZZ"), None); // invalid hex
    }

    #[test]
    fn test_from_config_overrides() {
        let mut ui = UiConfig::default();
        ui.colors.insert("background".into(), "#000000".into());
        ui.colors.insert("drag_bg".into(), "#112233".into());
        ui.colors.insert("text".into(), "not-a-color".into());

        let theme = Theme::from_config(&ui);
        assert_eq!(theme.background, Color::Rgb(0, 0, 0));
        assert_eq!(theme.drag_bg, Color::Rgb(0x11, 0x22, 0x33));
        // Unparsable and unchanged values keep their defaults
        assert_eq!(theme.text, Color::Rgb(0xB0, 0xAA, 0xFF));
        assert_eq!(theme.highlight, Color::Rgb(0xFB, 0x41, 0x96));
    }

    #[test]
    fn test_task_color() {
        let theme = Theme::default();
        assert_eq!(theme.task_color(true), theme.dim);
        assert_eq!(theme.task_color(false), theme.text_bright);
    }
}
