// File: crates/overlay-core/src/svg.rs
// Summary: Standalone SVG serialization of drawable primitives and pixel-space shapes.

use std::collections::BTreeMap;

use crate::geometry::{fib_lines, reference_lines, Bounds, RefLine, MIN_EXTENT, TEXT_LINE_HEIGHT_PX};
use crate::shape::{Geometry, PixelShape, ShapeStyle};
use crate::types::PxPoint;

/// Presentation attributes, emitted in key order.
pub type Style = BTreeMap<String, String>;

const DEFAULT_STROKE: &str = "#2962ff";
const ARROW_HEAD_PX: f64 = 10.0;

#[derive(Clone, Debug, PartialEq)]
pub enum SvgNode {
    Line { x1: f64, y1: f64, x2: f64, y2: f64, style: Style },
    Polyline { points: Vec<PxPoint>, style: Style },
    Rect { x: f64, y: f64, width: f64, height: f64, style: Style },
    Circle { cx: f64, cy: f64, r: f64, style: Style },
    Path { d: String, style: Style },
    Text { x: f64, y: f64, content: String, style: Style },
    Group { children: Vec<SvgNode>, style: Style },
}

impl SvgNode {
    pub fn line(a: PxPoint, b: PxPoint, style: Style) -> Self {
        SvgNode::Line { x1: a.x, y1: a.y, x2: b.x, y2: b.y, style }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SvgDocument {
    pub width: f64,
    pub height: f64,
    pub view_box: Option<ViewBox>,
}

/// Escape text content and attribute values.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn num(v: f64) -> String {
    if !v.is_finite() { return "0".to_string(); }
    let r = (v * 1000.0).round() / 1000.0;
    if r == 0.0 { "0".to_string() } else { r.to_string() }
}

/// Sizes never print as zero: anything below the rounding precision prints
/// as `MIN_EXTENT`.
fn extent(v: f64) -> String {
    let v = if v.is_finite() { v.max(MIN_EXTENT) } else { MIN_EXTENT };
    let r = (v * 1000.0).round() / 1000.0;
    if r > 0.0 { r.to_string() } else { v.to_string() }
}

fn attrs(pairs: &[(&str, String)], style: &Style) -> String {
    let mut s = String::new();
    for (k, v) in pairs {
        s.push_str(&format!(" {k}=\"{}\"", escape_xml(v)));
    }
    for (k, v) in style {
        s.push_str(&format!(" {}=\"{}\"", escape_xml(k), escape_xml(v)));
    }
    s
}

fn write_node(out: &mut String, node: &SvgNode, depth: usize) {
    let indent = "  ".repeat(depth);
    match node {
        SvgNode::Line { x1, y1, x2, y2, style } => {
            let a = attrs(&[("x1", num(*x1)), ("y1", num(*y1)), ("x2", num(*x2)), ("y2", num(*y2))], style);
            out.push_str(&format!("{indent}<line{a}/>\n"));
        }
        SvgNode::Polyline { points, style } => {
            let pts = points.iter().map(|p| format!("{},{}", num(p.x), num(p.y))).collect::<Vec<_>>().join(" ");
            out.push_str(&format!("{indent}<polyline{}/>\n", attrs(&[("points", pts)], style)));
        }
        SvgNode::Rect { x, y, width, height, style } => {
            let a = attrs(
                &[("x", num(*x)), ("y", num(*y)), ("width", extent(*width)), ("height", extent(*height))],
                style,
            );
            out.push_str(&format!("{indent}<rect{a}/>\n"));
        }
        SvgNode::Circle { cx, cy, r, style } => {
            let a = attrs(&[("cx", num(*cx)), ("cy", num(*cy)), ("r", extent(*r))], style);
            out.push_str(&format!("{indent}<circle{a}/>\n"));
        }
        SvgNode::Path { d, style } => {
            out.push_str(&format!("{indent}<path{}/>\n", attrs(&[("d", d.clone())], style)));
        }
        SvgNode::Text { x, y, content, style } => {
            let a = attrs(&[("x", num(*x)), ("y", num(*y))], style);
            out.push_str(&format!("{indent}<text{a}>{}</text>\n", escape_xml(content)));
        }
        SvgNode::Group { children, style } => {
            out.push_str(&format!("{indent}<g{}>\n", attrs(&[], style)));
            for child in children {
                write_node(out, child, depth + 1);
            }
            out.push_str(&format!("{indent}</g>\n"));
        }
    }
}

impl SvgDocument {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height, view_box: None }
    }

    pub fn with_view_box(mut self, view_box: ViewBox) -> Self {
        self.view_box = Some(view_box);
        self
    }

    pub fn render(&self, nodes: &[SvgNode]) -> String {
        let mut out = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\"",
            num(self.width),
            num(self.height)
        );
        if let Some(vb) = self.view_box {
            out.push_str(&format!(
                " viewBox=\"{} {} {} {}\"",
                num(vb.min_x),
                num(vb.min_y),
                num(vb.width),
                num(vb.height)
            ));
        }
        out.push_str(">\n");
        for node in nodes {
            write_node(&mut out, node, 1);
        }
        out.push_str("</svg>\n");
        out
    }
}

fn stroke_style(style: Option<&ShapeStyle>) -> Style {
    let mut s = Style::new();
    let stroke = style.and_then(|st| st.stroke.clone()).unwrap_or_else(|| DEFAULT_STROKE.to_string());
    s.insert("stroke".into(), stroke);
    s.insert("stroke-width".into(), num(style.and_then(|st| st.width).unwrap_or(1.0)));
    s.insert("fill".into(), style.and_then(|st| st.fill.clone()).unwrap_or_else(|| "none".to_string()));
    if let Some(dash) = style.and_then(|st| st.dash.as_ref()).filter(|d| !d.is_empty()) {
        s.insert("stroke-dasharray".into(), dash.iter().map(|v| num(*v)).collect::<Vec<_>>().join(","));
    }
    if let Some(op) = style.and_then(|st| st.opacity) {
        s.insert("opacity".into(), num(op));
    }
    s
}

fn text_style(style: &Style) -> Style {
    let mut s = Style::new();
    if let Some(stroke) = style.get("stroke") { s.insert("fill".into(), stroke.clone()); }
    s.insert("font-size".into(), "12".into());
    s
}

fn ref_line_node(line: &RefLine, reach: f64) -> SvgNode {
    let (a, b) = line.extended(reach);
    SvgNode::line(a, b, Style::new())
}

fn arrow_head(a: PxPoint, b: PxPoint) -> Option<String> {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len = dx.hypot(dy);
    if len < MIN_EXTENT { return None; }
    let (ux, uy) = (dx / len, dy / len);
    let base = b.offset(-ux * ARROW_HEAD_PX, -uy * ARROW_HEAD_PX);
    let (nx, ny) = (-uy * ARROW_HEAD_PX * 0.5, ux * ARROW_HEAD_PX * 0.5);
    let (l, r) = (base.offset(nx, ny), base.offset(-nx, -ny));
    Some(format!("M {} {} L {} {} L {} {}", num(l.x), num(l.y), num(b.x), num(b.y), num(r.x), num(r.y)))
}

fn ellipse_path(bounds: &Bounds) -> String {
    let (rx, ry) = (bounds.width() * 0.5, bounds.height() * 0.5);
    let cy = bounds.min_y + ry;
    let (left, right) = (bounds.min_x, bounds.min_x + 2.0 * rx);
    format!(
        "M {l} {cy} A {rx} {ry} 0 1 0 {r} {cy} A {rx} {ry} 0 1 0 {l} {cy} Z",
        l = num(left),
        r = num(right),
        cy = num(cy),
        rx = num(rx),
        ry = num(ry)
    )
}

fn shape_node(shape: &PixelShape, width: f64, height: f64) -> SvgNode {
    let style = stroke_style(shape.style.as_ref());
    let reach = width.hypot(height).max(1.0);
    let group = |children: Vec<SvgNode>, style: Style| SvgNode::Group { children, style };

    match &shape.geometry {
        Geometry::Trendline { points: [a, b] } => SvgNode::line(*a, *b, style),
        Geometry::Arrow { points: [a, b] } => {
            let mut children = vec![SvgNode::line(*a, *b, Style::new())];
            if let Some(d) = arrow_head(*a, *b) { children.push(SvgNode::Path { d, style: Style::new() }); }
            group(children, style)
        }
        Geometry::Hline { points: [p] } => SvgNode::line(PxPoint::new(0.0, p.y), PxPoint::new(width, p.y), style),
        Geometry::Vline { points: [p] } => SvgNode::line(PxPoint::new(p.x, 0.0), PxPoint::new(p.x, height), style),
        Geometry::Rect { points: [a, b], .. } => {
            let bounds = Bounds::from_corners(*a, *b);
            SvgNode::Rect { x: bounds.min_x, y: bounds.min_y, width: bounds.width(), height: bounds.height(), style }
        }
        Geometry::Ellipse { points: [a, b] } => SvgNode::Path { d: ellipse_path(&Bounds::from_corners(*a, *b)), style },
        Geometry::Fib { points, levels } => {
            let ts = text_style(&style);
            let children = fib_lines(points, levels)
                .into_iter()
                .flat_map(|(level, line)| {
                    [
                        SvgNode::line(line.from, line.to, Style::new()),
                        SvgNode::Text { x: line.from.x, y: line.from.y - 2.0, content: format!("{level}"), style: ts.clone() },
                    ]
                })
                .collect();
            group(children, style)
        }
        Geometry::Ray { .. } | Geometry::ParallelChannel { .. } | Geometry::Pitchfork { .. } => {
            let children = reference_lines(&shape.geometry).iter().map(|l| ref_line_node(l, reach)).collect();
            group(children, style)
        }
        Geometry::Text { points: [p], text } => SvgNode::Text {
            x: p.x,
            y: p.y + TEXT_LINE_HEIGHT_PX,
            content: text.clone(),
            style: text_style(&style),
        },
    }
}

/// Primitives for the visible shapes, in z-order. Unbounded lines are
/// extended past the `width` x `height` viewport.
pub fn shapes_to_nodes(shapes: &[PixelShape], width: f64, height: f64) -> Vec<SvgNode> {
    shapes.iter().filter(|s| !s.hidden).map(|s| shape_node(s, width, height)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_all_five_entities() {
        assert_eq!(escape_xml(r#"<a & 'b' "c">"#), "&lt;a &amp; &apos;b&apos; &quot;c&quot;&gt;");
    }

    #[test]
    fn numbers_are_compact() {
        assert_eq!(num(10.0), "10");
        assert_eq!(num(0.12345), "0.123");
        assert_eq!(num(-0.0001), "0");
        assert_eq!(num(f64::NAN), "0");
    }
}
