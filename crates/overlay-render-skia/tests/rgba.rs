// File: crates/overlay-render-skia/tests/rgba.rs
// Purpose: RGBA8 readback shape and background fill for the overlay raster.

use overlay_core::shape::{Geometry, Shape, ShapeId};
use overlay_core::{CandleLike, CoordinateMapper, DomainPoint, TimeScale, ValueScale};
use overlay_render_skia::{OverlayRenderer, RenderOptions, Scene, Theme};

fn mapper(h: f64) -> CoordinateMapper {
    CoordinateMapper::from_scales(TimeScale::new(10.0, 0.0, 1.0, 20.0), ValueScale::new_linear(0.0, h, 90.0, 110.0))
}

#[test]
fn rgba_buffer_dimensions_and_background() {
    let opts = RenderOptions { width: 320, height: 200, draw_grid: false, draw_labels: false, ..Default::default() };
    let m = mapper(200.0);
    let candles = [CandleLike { time: 1.0, open: 100.0, high: 105.0, low: 95.0, close: 102.0, volume: 1.0 }];
    let shapes = [Shape::new(ShapeId(1), Geometry::Hline { points: [DomainPoint::new(0.0, 100.0)] })];
    let scene = Scene { candles: &candles, shapes: &shapes, selection: &[], mapper: &m };

    let (px, w, h, stride) = OverlayRenderer::new().render_to_rgba8(&scene, &opts).expect("render");
    assert_eq!((w, h), (320, 200));
    assert_eq!(stride, 320 * 4);
    assert_eq!(px.len(), 320 * 200 * 4);

    let bg = Theme::dark().background;
    assert_eq!(&px[0..4], &[bg.r(), bg.g(), bg.b(), 255]);
}

#[test]
fn png_bytes_have_signature() {
    let opts = RenderOptions { width: 64, height: 48, draw_labels: false, ..Default::default() };
    let m = mapper(48.0);
    let scene = Scene { candles: &[], shapes: &[], selection: &[], mapper: &m };
    let bytes = OverlayRenderer::new().render_to_png_bytes(&scene, &opts).expect("png");
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
}
