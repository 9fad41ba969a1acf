//! Per-flow visual configuration. One `FlowTheme` per controller instance,
//! injected at construction; the server's highlight directive can override
//! the primary color once, at flow start.

use serde::{Deserialize, Serialize};

use crate::style::Color;

/// Palette and spacing defaults for one offer flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowTheme {
    /// Fill for primary buttons, the header band, and filled step indicators.
    pub primary: Color,
    /// Fill for secondary buttons and unfilled step indicators.
    pub secondary: Color,
    /// Dim layer behind the card in popup mode.
    pub backdrop: Color,
}

impl Default for FlowTheme {
    fn default() -> Self {
        FlowTheme {
            primary: Color::rgb(0x5b, 0xb8, 0x5d),
            secondary: Color::rgb(0xef, 0xef, 0xef),
            backdrop: Color::argb(0x4d, 0x00, 0x00, 0x00),
        }
    }
}

impl FlowTheme {
    /// Replace the primary color with a server-provided highlight. Invalid
    /// hex values are ignored and the existing primary stays in place.
    pub fn apply_highlight(&mut self, hex: &str) {
        match Color::parse(hex) {
            Ok(color) => self.primary = color,
            Err(err) => tracing::warn!(value = hex, %err, "ignoring highlight color"),
        }
    }
}

/// Host viewport classification. Wide surfaces get side-by-side layout and
/// larger padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewportClass {
    #[default]
    Narrow,
    Wide,
}

impl ViewportClass {
    pub fn horizontal_padding(self) -> f32 {
        match self {
            ViewportClass::Wide => 32.0,
            ViewportClass::Narrow => 16.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_highlight_overrides_primary() {
        let mut theme = FlowTheme::default();
        theme.apply_highlight("#112233");
        assert_eq!(theme.primary, Color::rgb(0x11, 0x22, 0x33));
    }

    #[test]
    fn test_apply_highlight_keeps_default_on_bad_value() {
        let mut theme = FlowTheme::default();
        let before = theme.primary;
        theme.apply_highlight("not-a-color");
        assert_eq!(theme.primary, before);
    }

    #[test]
    fn test_horizontal_padding_scales_with_viewport() {
        assert_eq!(ViewportClass::Wide.horizontal_padding(), 32.0);
        assert_eq!(ViewportClass::Narrow.horizontal_padding(), 16.0);
    }
}
