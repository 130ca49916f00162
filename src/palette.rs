use macroquad::prelude::Color;

use crate::error::ConfigError;

/// Default palette for the ambient particle field.
pub const FIELD_PALETTE: [&str; 5] = ["#90EE90", "#32CD32", "#FFD700", "#87CEEB", "#98FB98"];

/// Palette the tree's ambient orbs draw from.
pub const ORB_PALETTE: [&str; 4] = ["#90EE90", "#32CD32", "#FFD700", "#87CEEB"];

pub const TRUNK: Color = Color::new(0.545, 0.271, 0.075, 1.0);
pub const FOLIAGE: [Color; 3] = [
    Color::new(0.133, 0.545, 0.133, 1.0),
    Color::new(0.196, 0.804, 0.196, 1.0),
    Color::new(0.565, 0.933, 0.565, 1.0),
];
pub const GOLD: Color = Color::new(1.0, 0.843, 0.0, 1.0);
pub const TOMATO: Color = Color::new(1.0, 0.388, 0.278, 1.0);
pub const GROUND: Color = Color::new(0.561, 0.737, 0.561, 1.0);
pub const LABEL: Color = Color::new(0.133, 0.545, 0.133, 1.0);

/// Parse `#rgb` or `#rrggbb` (leading `#` optional) into an opaque color.
pub fn parse_hex(value: &str) -> Result<Color, ConfigError> {
    let invalid = || ConfigError::InvalidColor(value.to_string());
    let hex = value.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
    let (r, g, b) = match hex.len() {
        3 => {
            let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
            (expand(0)?, expand(1)?, expand(2)?)
        }
        6 => (channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?),
        _ => return Err(invalid()),
    };

    Ok(Color::from_rgba(r, g, b, 255))
}

pub fn parse_palette<S: AsRef<str>>(values: &[S]) -> Result<Vec<Color>, ConfigError> {
    values.iter().map(|v| parse_hex(v.as_ref())).collect()
}

/// Same color with a different alpha.
pub fn with_alpha(color: Color, alpha: f32) -> Color {
    Color::new(color.r, color.g, color.b, alpha)
}
