// File: crates/overlay-render-skia/src/lib.rs
// Summary: Skia raster adapter for overlay-core: candles, shapes, selection handles and labels to PNG/RGBA.

pub mod render;
pub mod text;
pub mod theme;

pub use render::{OverlayRenderer, RenderOptions, Scene};
pub use text::TextShaper;
pub use theme::{parse_css_color, Theme};
