// File: crates/overlay-render-skia/src/text.rs
// Summary: Label text shaping and painting via Skia textlayout.

use skia::textlayout::{FontCollection, Paragraph, ParagraphBuilder, ParagraphStyle, TextAlign, TextStyle};
use skia_safe as skia;

const LABEL_PAD: f32 = 3.0;

pub struct TextShaper {
    fonts: FontCollection,
}

impl Default for TextShaper {
    fn default() -> Self { Self::new() }
}

impl TextShaper {
    pub fn new() -> Self {
        let mut fc = FontCollection::new();
        fc.set_default_font_manager(skia::FontMgr::default(), None);
        Self { fonts: fc }
    }

    fn make_style(size: f32, color: skia::Color) -> TextStyle {
        let mut ts = TextStyle::new();
        ts.set_font_size(size.max(1.0));
        ts.set_color(color);
        // Tabular digits keep price readouts aligned.
        ts.set_font_families(&["Roboto Mono", "Consolas", "Menlo", "DejaVu Sans Mono", "monospace"]);
        ts
    }

    pub fn layout(&self, text: &str, size: f32, color: skia::Color) -> Paragraph {
        let mut pstyle = ParagraphStyle::new();
        pstyle.set_text_align(TextAlign::Left);
        let mut builder = ParagraphBuilder::new(&pstyle, &self.fonts);
        builder.push_style(&Self::make_style(size, color));
        builder.add_text(text);
        let mut paragraph = builder.build();
        paragraph.layout(10_000.0);
        paragraph
    }

    pub fn measure_width(&self, text: &str, size: f32) -> f32 {
        self.layout(text, size, skia::Color::TRANSPARENT).longest_line()
    }

    /// Paint `text` on a filled box whose bottom-left corner sits at the anchor.
    pub fn draw_label(
        &self,
        canvas: &skia::Canvas,
        text: &str,
        anchor: (f32, f32),
        size: f32,
        color: skia::Color,
        background: skia::Color,
    ) {
        let p = self.layout(text, size, color);
        let (w, h) = (p.longest_line(), p.height());
        let (x, y) = (anchor.0 + LABEL_PAD, anchor.1 - h - LABEL_PAD * 2.0);

        let mut bg = skia::Paint::default();
        bg.set_anti_alias(true);
        bg.set_color(background);
        let rect = skia::Rect::from_xywh(x - LABEL_PAD, y - LABEL_PAD, w + LABEL_PAD * 2.0, h + LABEL_PAD * 2.0);
        canvas.draw_round_rect(rect, 3.0, 3.0, &bg);
        p.paint(canvas, (x, y));
    }
}
