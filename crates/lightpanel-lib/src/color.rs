//! Color math — brightness scaling, hex conversion, wide-gamut output strings.
//!
//! Channels are stored as `u8`, so a [`Color`] can never leave the 0–255
//! range. Two hex parsers exist: [`from_hex`] is lenient (malformed input
//! becomes black) and feeds the color picker; [`parse_color`] is strict and
//! feeds operator input where a typo should be reported.

use serde::{Deserialize, Serialize};

/// An sRGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const RED: Color = Color::new(255, 0, 0);
    pub const BLUE: Color = Color::new(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    /// Build a color from unbounded channel values, clamping each to 0–255.
    pub fn clamped(r: i64, g: i64, b: i64) -> Self {
        let c = |v: i64| v.clamp(0, 255) as u8;
        Color::new(c(r), c(g), c(b))
    }

    pub fn is_black(&self) -> bool {
        *self == Color::BLACK
    }
}

/// One entry of the preset palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub color: Color,
}

/// Built-in palette offered alongside the custom slots.
pub const PRESETS: &[Preset] = &[
    Preset { name: "Red", color: Color::new(255, 0, 0) },
    Preset { name: "Green", color: Color::new(0, 255, 0) },
    Preset { name: "Blue", color: Color::new(0, 0, 255) },
    Preset { name: "Yellow", color: Color::new(255, 255, 0) },
    Preset { name: "Cyan", color: Color::new(0, 255, 255) },
    Preset { name: "Magenta", color: Color::new(255, 0, 255) },
    Preset { name: "White", color: Color::new(255, 255, 255) },
    Preset { name: "Orange", color: Color::new(255, 165, 0) },
    Preset { name: "Purple", color: Color::new(128, 0, 128) },
    Preset { name: "Pink", color: Color::new(255, 192, 203) },
];

/// Look up a preset by name (case-insensitive).
pub fn preset(name: &str) -> Option<Color> {
    PRESETS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .map(|p| p.color)
}

/// Scale every channel by `pct` percent, rounding half up.
///
/// `pct` above 100 is treated as 100.
pub fn scale_brightness(c: Color, pct: u8) -> Color {
    let pct = u32::from(pct.min(100));
    let scale = |ch: u8| ((u32::from(ch) * pct + 50) / 100) as u8;
    Color::new(scale(c.r), scale(c.g), scale(c.b))
}

/// Format as lowercase `#rrggbb`.
pub fn to_hex(c: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b)
}

/// Parse `#rrggbb` / `rrggbb` (any case). Anything else yields black.
pub fn from_hex(s: &str) -> Color {
    parse_hex(s).unwrap_or(Color::BLACK)
}

fn parse_hex(s: &str) -> Option<Color> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::new(channel(0)?, channel(2)?, channel(4)?))
}

/// Wide-gamut CSS color string, e.g. `color(display-p3 1 0 0.5019607843137255)`.
///
/// Channels are normalised to 0–1 so full intensity maps to the display's
/// maximum luminance on P3-capable screens.
pub fn to_color_string(c: Color) -> String {
    let n = |ch: u8| f64::from(ch) / 255.0;
    format!("color(display-p3 {} {} {})", n(c.r), n(c.g), n(c.b))
}

/// Parse operator-supplied color input.
///
/// Accepts:
/// - Hex: `"#FF0000"`, `"FF0000"`, `"#ff0000"`
/// - Preset names: `"red"`, `"orange"`, `"pink"`, ... (see [`PRESETS`]),
///   plus `"black"` / `"off"`
pub fn parse_color(s: &str) -> crate::error::Result<Color> {
    let s = s.trim();

    if s.eq_ignore_ascii_case("black") || s.eq_ignore_ascii_case("off") {
        return Ok(Color::BLACK);
    }
    if let Some(c) = preset(s) {
        return Ok(c);
    }

    parse_hex(s).ok_or_else(|| {
        crate::LightPanelError::Color(format!(
            "Invalid color: {s} (use #RRGGBB or a preset name)"
        ))
    })
}
