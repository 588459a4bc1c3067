// File: crates/overlay-render-skia/src/theme.rs
// Summary: Color themes for the overlay raster: chart backdrop, candles, shapes, selection, labels.

use skia_safe as skia;

#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub name: &'static str,
    pub background: skia::Color,
    pub grid: skia::Color,
    pub candle_up: skia::Color,
    pub candle_down: skia::Color,
    /// Stroke for shapes whose style carries no color of their own.
    pub shape_stroke: skia::Color,
    pub shape_fill: skia::Color,
    pub selection: skia::Color,
    pub label_text: skia::Color,
    pub label_background: skia::Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark",
            background: skia::Color::from_argb(255, 18, 18, 20),
            grid: skia::Color::from_argb(255, 40, 40, 45),
            candle_up: skia::Color::from_argb(255, 40, 200, 120),
            candle_down: skia::Color::from_argb(255, 220, 80, 80),
            shape_stroke: skia::Color::from_argb(255, 64, 160, 255),
            shape_fill: skia::Color::from_argb(48, 64, 160, 255),
            selection: skia::Color::from_argb(255, 255, 230, 70),
            label_text: skia::Color::from_argb(255, 235, 235, 245),
            label_background: skia::Color::from_argb(200, 30, 30, 36),
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light",
            background: skia::Color::from_argb(255, 250, 250, 252),
            grid: skia::Color::from_argb(255, 230, 230, 235),
            candle_up: skia::Color::from_argb(255, 20, 160, 90),
            candle_down: skia::Color::from_argb(255, 200, 60, 60),
            shape_stroke: skia::Color::from_argb(255, 32, 120, 200),
            shape_fill: skia::Color::from_argb(40, 32, 120, 200),
            selection: skia::Color::from_argb(255, 30, 120, 240),
            label_text: skia::Color::from_argb(255, 20, 20, 30),
            label_background: skia::Color::from_argb(220, 240, 240, 245),
        }
    }

    pub fn solarized_dark() -> Self {
        Self {
            name: "solarized-dark",
            background: skia::Color::from_argb(255, 0x00, 0x2b, 0x36),
            grid: skia::Color::from_argb(255, 0x07, 0x36, 0x42),
            candle_up: skia::Color::from_argb(255, 0x2a, 0xa1, 0x98),
            candle_down: skia::Color::from_argb(255, 0xdc, 0x32, 0x2f),
            shape_stroke: skia::Color::from_argb(255, 0x26, 0x8b, 0xd2),
            shape_fill: skia::Color::from_argb(48, 0x26, 0x8b, 0xd2),
            selection: skia::Color::from_argb(255, 0xb5, 0x89, 0x00),
            label_text: skia::Color::from_argb(255, 0xee, 0xe8, 0xd5),
            label_background: skia::Color::from_argb(200, 0x07, 0x36, 0x42),
        }
    }
}

/// Built-in theme presets.
pub fn presets() -> Vec<Theme> {
    vec![Theme::dark(), Theme::light(), Theme::solarized_dark()]
}

/// Find a theme by `name`, falling back to dark.
pub fn find(name: &str) -> Theme {
    presets().into_iter().find(|t| t.name.eq_ignore_ascii_case(name)).unwrap_or_else(Theme::dark)
}

/// Parse a CSS hex color (`#rgb`, `#rrggbb` or `#rrggbbaa`).
pub fn parse_css_color(s: &str) -> Option<skia::Color> {
    let hex = s.trim().strip_prefix('#')?;
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 => {
            let nib = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok().map(|v| v * 17);
            Some(skia::Color::from_argb(255, nib(0)?, nib(1)?, nib(2)?))
        }
        6 => Some(skia::Color::from_argb(255, byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(skia::Color::from_argb(byte(6)?, byte(0)?, byte(2)?, byte(4)?)),
        _ => None,
    }
}
