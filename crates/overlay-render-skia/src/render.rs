// File: crates/overlay-render-skia/src/render.rs
// Summary: Headless raster pipeline: candles, overlay shapes, selection handles and labels on a Skia CPU surface.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use skia_safe as skia;

use overlay_core::geometry::{channel_lines, fib_lines, reference_lines, Bounds, RefLine};
use overlay_core::grid::linspace;
use overlay_core::label::{describe_drawing, LabelConfig};
use overlay_core::shape::{DomainShape, Geometry, PixelShape, ShapeId, ShapeStyle};
use overlay_core::{CandleLike, CoordinateMapper, PxPoint, TimeInput};

use crate::text::TextShaper;
use crate::theme::{parse_css_color, Theme};

const HANDLE_PX: f32 = 3.5;
const ARROW_HEAD_PX: f32 = 10.0;
const LABEL_SIZE: f32 = 12.0;

pub struct RenderOptions {
    pub width: i32,
    pub height: i32,
    pub theme: Theme,
    pub draw_grid: bool,
    /// Label text depends on installed fonts; snapshot tests turn it off.
    pub draw_labels: bool,
    pub labels: LabelConfig,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 640,
            theme: Theme::dark(),
            draw_grid: true,
            draw_labels: true,
            labels: LabelConfig::default(),
        }
    }
}

/// What to paint: a candle series under a set of chart-space shapes.
pub struct Scene<'a> {
    pub candles: &'a [CandleLike],
    pub shapes: &'a [DomainShape],
    pub selection: &'a [ShapeId],
    pub mapper: &'a CoordinateMapper,
}

pub struct OverlayRenderer {
    shaper: TextShaper,
}

impl Default for OverlayRenderer {
    fn default() -> Self { Self::new() }
}

impl OverlayRenderer {
    pub fn new() -> Self {
        Self { shaper: TextShaper::new() }
    }

    fn render_surface(&self, scene: &Scene<'_>, opts: &RenderOptions) -> Result<skia::Surface> {
        let mut surface = skia::surfaces::raster_n32_premul((opts.width, opts.height))
            .ok_or_else(|| anyhow!("failed to create raster surface {}x{}", opts.width, opts.height))?;
        let canvas = surface.canvas();
        canvas.clear(opts.theme.background);

        if opts.draw_grid {
            draw_grid(canvas, opts);
        }
        draw_candles(canvas, scene.candles, scene.mapper, &opts.theme);

        let mut skipped = 0usize;
        for shape in scene.shapes.iter().filter(|s| !s.hidden) {
            let Some(px) = scene.mapper.project(shape) else {
                skipped += 1;
                continue;
            };
            let reach = (opts.width as f64).hypot(opts.height as f64);
            draw_shape(canvas, &px, reach, &opts.theme);
            if scene.selection.contains(&shape.id) {
                draw_handles(canvas, &px, &opts.theme);
            }
            if opts.draw_labels {
                if let Some(label) = describe_drawing(shape, scene.mapper, &opts.labels) {
                    let anchor = (label.anchor.x as f32, label.anchor.y as f32);
                    self.shaper.draw_label(
                        canvas,
                        &label.text,
                        anchor,
                        LABEL_SIZE,
                        opts.theme.label_text,
                        opts.theme.label_background,
                    );
                }
            }
        }
        if skipped > 0 {
            tracing::debug!(skipped, "shapes outside the mappable range were not painted");
        }
        Ok(surface)
    }

    /// Encoded PNG bytes of the scene.
    pub fn render_to_png_bytes(&self, scene: &Scene<'_>, opts: &RenderOptions) -> Result<Vec<u8>> {
        let mut surface = self.render_surface(scene, opts)?;
        let image = surface.image_snapshot();
        #[allow(deprecated)]
        let data = image
            .encode_to_data(skia::EncodedImageFormat::PNG)
            .ok_or_else(|| anyhow!("encode PNG failed"))?;
        Ok(data.as_bytes().to_vec())
    }

    pub fn render_to_png(&self, scene: &Scene<'_>, opts: &RenderOptions, output_png_path: impl AsRef<Path>) -> Result<()> {
        let path = output_png_path.as_ref();
        let bytes = self.render_to_png_bytes(scene, opts)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        std::fs::write(path, bytes).with_context(|| format!("write {}", path.display()))
    }

    /// Unpremultiplied RGBA8 pixels: `(pixels, width, height, row_bytes)`.
    pub fn render_to_rgba8(&self, scene: &Scene<'_>, opts: &RenderOptions) -> Result<(Vec<u8>, u32, u32, usize)> {
        let mut surface = self.render_surface(scene, opts)?;
        let (w, h) = (opts.width.max(0) as u32, opts.height.max(0) as u32);
        let row_bytes = w as usize * 4;
        let info = skia::ImageInfo::new((opts.width, opts.height), skia::ColorType::RGBA8888, skia::AlphaType::Unpremul, None);
        let mut pixels = vec![0u8; row_bytes * h as usize];
        if !surface.read_pixels(&info, &mut pixels, row_bytes, (0, 0)) {
            return Err(anyhow!("read_pixels failed"));
        }
        Ok((pixels, w, h, row_bytes))
    }
}

// ---- helpers ----------------------------------------------------------------

fn pt(p: PxPoint) -> skia::Point {
    skia::Point::new(p.x as f32, p.y as f32)
}

fn draw_grid(canvas: &skia::Canvas, opts: &RenderOptions) {
    let mut paint = skia::Paint::default();
    paint.set_color(opts.theme.grid);
    paint.set_anti_alias(true);
    paint.set_stroke_width(1.0);
    let (w, h) = (opts.width as f64, opts.height as f64);
    for x in linspace(0.0, w, 10) {
        canvas.draw_line((x as f32, 0.0), (x as f32, h as f32), &paint);
    }
    for y in linspace(0.0, h, 6) {
        canvas.draw_line((0.0, y as f32), (w as f32, y as f32), &paint);
    }
}

fn draw_candles(canvas: &skia::Canvas, candles: &[CandleLike], mapper: &CoordinateMapper, theme: &Theme) {
    if candles.is_empty() { return; }

    let mut wick = skia::Paint::default();
    wick.set_anti_alias(true);
    wick.set_style(skia::paint::Style::Stroke);
    wick.set_stroke_width(1.0);

    let mut body = skia::Paint::default();
    body.set_anti_alias(true);
    body.set_style(skia::paint::Style::Fill);

    // Body width from the spacing of the first two bars.
    let xs: Vec<Option<f64>> = candles.iter().take(2).map(|c| mapper.time_to_x(&TimeInput::Seconds(c.time))).collect();
    let spacing = match xs.as_slice() {
        [Some(a), Some(b)] => (b - a).abs() as f32,
        _ => 6.0,
    };
    let half = (spacing * 0.7).max(1.0) * 0.5;

    for c in candles {
        let x = mapper.time_to_x(&TimeInput::Seconds(c.time));
        let ys = [c.open, c.high, c.low, c.close].map(|v| mapper.price_to_y(v));
        let (Some(x), [Some(y_o), Some(y_h), Some(y_l), Some(y_c)]) = (x, ys) else { continue };
        let (x, y_o, y_h, y_l, y_c) = (x as f32, y_o as f32, y_h as f32, y_l as f32, y_c as f32);

        let color = if c.close >= c.open { theme.candle_up } else { theme.candle_down };
        wick.set_color(color);
        body.set_color(color);

        canvas.draw_line((x, y_h), (x, y_l), &wick);
        let top = y_o.min(y_c);
        let bot = y_o.max(y_c);
        canvas.draw_rect(skia::Rect::from_ltrb(x - half, top, x + half, bot.max(top + 1.0)), &body);
    }
}

fn stroke_paint(style: Option<&ShapeStyle>, theme: &Theme) -> skia::Paint {
    let mut paint = skia::Paint::default();
    paint.set_anti_alias(true);
    paint.set_style(skia::paint::Style::Stroke);
    let color = style.and_then(|s| s.stroke.as_deref()).and_then(parse_css_color).unwrap_or(theme.shape_stroke);
    paint.set_color(color);
    paint.set_stroke_width(style.and_then(|s| s.width).unwrap_or(1.5) as f32);
    if let Some(dash) = style.and_then(|s| s.dash.as_ref()).filter(|d| d.len() >= 2) {
        let intervals: Vec<f32> = dash.iter().map(|v| *v as f32).collect();
        paint.set_path_effect(skia::PathEffect::dash(&intervals, 0.0));
    }
    if let Some(opacity) = style.and_then(|s| s.opacity) {
        paint.set_alpha_f(opacity.clamp(0.0, 1.0) as f32);
    }
    paint
}

fn fill_paint(style: Option<&ShapeStyle>, theme: &Theme) -> skia::Paint {
    let mut paint = skia::Paint::default();
    paint.set_anti_alias(true);
    paint.set_style(skia::paint::Style::Fill);
    let color = style.and_then(|s| s.fill.as_deref()).and_then(parse_css_color).unwrap_or(theme.shape_fill);
    paint.set_color(color);
    paint
}

fn draw_ref_line(canvas: &skia::Canvas, line: &RefLine, reach: f64, paint: &skia::Paint) {
    let (a, b) = line.extended(reach);
    canvas.draw_line(pt(a), pt(b), paint);
}

fn draw_shape(canvas: &skia::Canvas, shape: &PixelShape, reach: f64, theme: &Theme) {
    let stroke = stroke_paint(shape.style.as_ref(), theme);
    match &shape.geometry {
        Geometry::Rect { points: [a, b], .. } | Geometry::Ellipse { points: [a, b] } => {
            let bounds = Bounds::from_corners(*a, *b);
            let rect = skia::Rect::from_ltrb(
                bounds.min_x as f32,
                bounds.min_y as f32,
                (bounds.min_x + bounds.width()) as f32,
                (bounds.min_y + bounds.height()) as f32,
            );
            let fill = fill_paint(shape.style.as_ref(), theme);
            if matches!(shape.geometry, Geometry::Rect { .. }) {
                canvas.draw_rect(rect, &fill);
                canvas.draw_rect(rect, &stroke);
            } else {
                canvas.draw_oval(rect, &fill);
                canvas.draw_oval(rect, &stroke);
            }
        }
        Geometry::Arrow { points: [a, b] } => {
            canvas.draw_line(pt(*a), pt(*b), &stroke);
            draw_arrow_head(canvas, *a, *b, &stroke);
        }
        Geometry::Fib { points, levels } => {
            for (_, line) in fib_lines(points, levels) {
                canvas.draw_line(pt(line.from), pt(line.to), &stroke);
            }
        }
        Geometry::ParallelChannel { points } => {
            let [base, parallel, mid] = channel_lines(points);
            let mut fill_path = skia::Path::new();
            fill_path.move_to(pt(base.from));
            fill_path.line_to(pt(base.to));
            fill_path.line_to(pt(parallel.to));
            fill_path.line_to(pt(parallel.from));
            fill_path.close();
            canvas.draw_path(&fill_path, &fill_paint(shape.style.as_ref(), theme));
            canvas.draw_line(pt(base.from), pt(base.to), &stroke);
            canvas.draw_line(pt(parallel.from), pt(parallel.to), &stroke);
            let mut dashed = stroke.clone();
            dashed.set_path_effect(skia::PathEffect::dash(&[4.0, 4.0], 0.0));
            canvas.draw_line(pt(mid.from), pt(mid.to), &dashed);
        }
        Geometry::Text { points: [a], text } => {
            let mut paint = skia::Paint::default();
            paint.set_anti_alias(true);
            paint.set_color(stroke.color());
            let mut font = skia::Font::default();
            font.set_size(LABEL_SIZE);
            canvas.draw_str(text, (a.x as f32, a.y as f32 + LABEL_SIZE), &font, &paint);
        }
        Geometry::Trendline { .. }
        | Geometry::Ray { .. }
        | Geometry::Hline { .. }
        | Geometry::Vline { .. }
        | Geometry::Pitchfork { .. } => {
            for line in reference_lines(&shape.geometry) {
                draw_ref_line(canvas, &line, reach, &stroke);
            }
        }
    }
}

fn draw_arrow_head(canvas: &skia::Canvas, a: PxPoint, b: PxPoint, paint: &skia::Paint) {
    let (dx, dy) = ((b.x - a.x) as f32, (b.y - a.y) as f32);
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1e-3 { return; }
    let (ux, uy) = (dx / len, dy / len);
    let tip = pt(b);
    let base = skia::Point::new(tip.x - ux * ARROW_HEAD_PX, tip.y - uy * ARROW_HEAD_PX);
    let (nx, ny) = (-uy * ARROW_HEAD_PX * 0.5, ux * ARROW_HEAD_PX * 0.5);
    let mut path = skia::Path::new();
    path.move_to((base.x + nx, base.y + ny));
    path.line_to(tip);
    path.line_to((base.x - nx, base.y - ny));
    canvas.draw_path(&path, paint);
}

fn draw_handles(canvas: &skia::Canvas, shape: &PixelShape, theme: &Theme) {
    let mut paint = skia::Paint::default();
    paint.set_anti_alias(true);
    paint.set_color(theme.selection);
    for p in shape.points() {
        let c = pt(*p);
        canvas.draw_rect(skia::Rect::from_xywh(c.x - HANDLE_PX, c.y - HANDLE_PX, HANDLE_PX * 2.0, HANDLE_PX * 2.0), &paint);
    }
}
