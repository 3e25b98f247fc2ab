//! Color utility functions shared across the application.
//!
//! Box colors travel as `#rrggbb` strings (that is what the service stores);
//! the renderer wants linear `[f32; 3]` triples.

/// Colors handed out to new boxes, in order.
///
/// Green is left out so a box never looks selected when it is not.
pub const BOX_PALETTE: [&str; 6] = [
    "#ff0000", // red
    "#0000ff", // blue
    "#ffff00", // yellow
    "#ff00ff", // magenta
    "#00ffff", // cyan
    "#ff8000", // orange
];

/// Outline color of the selected box.
pub const SELECTED_COLOR: &str = "#00ff00";

/// Outline color of the box being drawn.
pub const DRAW_PREVIEW_COLOR: &str = "#ffffff";

/// Hands out palette colors round-robin.
#[derive(Debug, Clone, Default)]
pub struct ColorPalette {
    next: usize,
}

impl ColorPalette {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next color in the cycle.
    pub fn next_color(&mut self) -> &'static str {
        let color = BOX_PALETTE[self.next % BOX_PALETTE.len()];
        self.next = (self.next + 1) % BOX_PALETTE.len();
        color
    }

    /// Start over from the first color.
    pub fn reset(&mut self) {
        self.next = 0;
    }
}

/// Parse `#rrggbb` (leading `#` optional) into 8-bit channels.
pub fn parse_hex_color(s: &str) -> Option<[u8; 3]> {
    let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

pub fn is_valid_hex_color(s: &str) -> bool {
    parse_hex_color(s).is_some()
}

/// Convert a hex color to renderer channels in 0.0-1.0.
///
/// Invalid input renders white.
pub fn to_rgb_f32(s: &str) -> [f32; 3] {
    match parse_hex_color(s) {
        Some([r, g, b]) => [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0],
        None => [1.0, 1.0, 1.0],
    }
}
