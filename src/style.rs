//! Style keyword resolution: size, emphasis, and appearance tokens from the
//! offer schema mapped to concrete values. Unknown keywords fall back
//! silently; resolution never fails.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{FlowError, FlowResult};

/// An RGBA color. Parsed from `#rrggbb` or `#aarrggbb` hex notation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };

    /// Near-black used for body copy and secondary button labels.
    pub const INK: Color = Color::rgb(0x19, 0x19, 0x19);
    /// Default disclaimer/footer gray.
    pub const GRAY: Color = Color::rgb(0x88, 0x88, 0x88);
    /// Default for sponsored lines.
    pub const LIGHT_GRAY: Color = Color::rgb(0x90, 0x90, 0x90);
    /// Muted blue for inline link text.
    pub const MUTED_BLUE: Color = Color::rgb(0x60, 0x92, 0xb4);
    /// Dark gray for the "subdued" appearance token.
    pub const SUBDUED_GRAY: Color = Color::rgb(0x58, 0x58, 0x58);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b, a: 0xff }
    }

    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b, a }
    }

    /// Parse `#rrggbb` or `#aarrggbb`. Anything else is an error; callers that
    /// tolerate bad server values ignore the error and keep their default.
    pub fn parse(value: &str) -> FlowResult<Color> {
        static HEX_COLOR_REGEX: OnceLock<Regex> = OnceLock::new();
        let hex_regex = HEX_COLOR_REGEX
            .get_or_init(|| Regex::new(r"^#(?:[0-9a-fA-F]{8}|[0-9a-fA-F]{6})$").unwrap());

        if !hex_regex.is_match(value) {
            return Err(FlowError::InvalidColor {
                value: value.to_string(),
            });
        }

        let digits = &value[1..];
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).unwrap();
        if digits.len() == 8 {
            Ok(Color::argb(byte(0), byte(2), byte(4), byte(6)))
        } else {
            Ok(Color::rgb(byte(0), byte(2), byte(4)))
        }
    }
}

/// Text weight/slant flag resolved from the `emphasis` token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emphasis {
    #[default]
    None,
    Bold,
    Italic,
}

/// Map a `size` token to a point size. Unknown or absent tokens get the body
/// default of 16.
pub fn text_size(keyword: Option<&str>) -> f32 {
    match keyword {
        Some("extraSmall") => 10.0,
        Some("small") => 12.0,
        Some("large") => 24.0,
        _ => 16.0,
    }
}

/// Map an `emphasis` token to a text style flag.
pub fn emphasis(keyword: Option<&str>) -> Emphasis {
    match keyword {
        Some("bold") => Emphasis::Bold,
        Some("italic") => Emphasis::Italic,
        _ => Emphasis::None,
    }
}

/// Map an `appearance` token to a text color. The same token vocabulary
/// resolves against a different default depending on which region is being
/// rendered, so the fallback is supplied per call site.
pub fn appearance_color(keyword: Option<&str>, context_default: Color) -> Color {
    match keyword {
        Some("accent") => Color::WHITE,
        Some("subdued") => Color::SUBDUED_GRAY,
        Some("monochrome") => Color::MUTED_BLUE,
        _ => context_default,
    }
}
