// File: crates/overlay-core/src/geometry.rs
// Summary: Pure pixel-space geometry: distances, containment, hit-testing, align and distribute.

use std::collections::HashSet;

use crate::shape::{Geometry, PixelShape, ShapeId};
use crate::types::PxPoint;

/// Smallest extent used for degenerate segments, rectangles and ellipses.
pub const MIN_EXTENT: f64 = 1e-6;
/// Distance reported for a query point outside a filled shape.
pub const MISS_DISTANCE: f64 = 1e9;
/// Approximate glyph box used to hit-test text shapes.
pub const TEXT_CHAR_WIDTH_PX: f64 = 7.0;
pub const TEXT_LINE_HEIGHT_PX: f64 = 14.0;

/// Axis-aligned bounds of a set of points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn of(points: &[PxPoint]) -> Option<Self> {
        let first = points.first()?;
        let init = Bounds { min_x: first.x, min_y: first.y, max_x: first.x, max_y: first.y };
        Some(points[1..].iter().fold(init, |b, p| Bounds {
            min_x: b.min_x.min(p.x),
            min_y: b.min_y.min(p.y),
            max_x: b.max_x.max(p.x),
            max_y: b.max_y.max(p.y),
        }))
    }

    pub fn from_corners(a: PxPoint, b: PxPoint) -> Self {
        Bounds { min_x: a.x.min(b.x), min_y: a.y.min(b.y), max_x: a.x.max(b.x), max_y: a.y.max(b.y) }
    }

    pub fn width(&self) -> f64 { (self.max_x - self.min_x).max(MIN_EXTENT) }
    pub fn height(&self) -> f64 { (self.max_y - self.min_y).max(MIN_EXTENT) }

    pub fn contains(&self, p: PxPoint) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

/// How far a reference line extends past its defining points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Extent {
    Segment,
    /// Starts at `from`, unbounded past `to`.
    Ray,
    Line,
}

/// A line a shape is drawn with and hit-tested against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RefLine {
    pub from: PxPoint,
    pub to: PxPoint,
    pub extent: Extent,
}

impl RefLine {
    pub const fn segment(from: PxPoint, to: PxPoint) -> Self { Self { from, to, extent: Extent::Segment } }
    pub const fn ray(from: PxPoint, to: PxPoint) -> Self { Self { from, to, extent: Extent::Ray } }
    pub const fn line(from: PxPoint, to: PxPoint) -> Self { Self { from, to, extent: Extent::Line } }

    pub fn distance(&self, p: PxPoint) -> f64 {
        match self.extent {
            Extent::Segment => point_segment_distance(p, self.from, self.to),
            Extent::Ray => point_ray_distance(p, self.from, self.to),
            Extent::Line => point_line_distance(p, self.from, self.to),
        }
    }

    /// Finite endpoints for drawing, pushing unbounded ends out by `reach` pixels.
    pub fn extended(&self, reach: f64) -> (PxPoint, PxPoint) {
        let (dx, dy) = (self.to.x - self.from.x, self.to.y - self.from.y);
        let len = dx.hypot(dy);
        if len < MIN_EXTENT { return (self.from, self.to); }
        let (ux, uy) = (dx / len * reach, dy / len * reach);
        match self.extent {
            Extent::Segment => (self.from, self.to),
            Extent::Ray => (self.from, self.to.offset(ux, uy)),
            Extent::Line => (self.from.offset(-ux, -uy), self.to.offset(ux, uy)),
        }
    }
}

fn project_param(p: PxPoint, a: PxPoint, b: PxPoint) -> Option<(f64, f64, f64)> {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len2 = dx * dx + dy * dy;
    if len2 < MIN_EXTENT * MIN_EXTENT { return None; }
    Some((((p.x - a.x) * dx + (p.y - a.y) * dy) / len2, dx, dy))
}

fn distance_with(p: PxPoint, a: PxPoint, b: PxPoint, clamp_t: impl Fn(f64) -> f64) -> f64 {
    match project_param(p, a, b) {
        Some((t, dx, dy)) => {
            let t = clamp_t(t);
            p.distance_to(a.offset(t * dx, t * dy))
        }
        None => p.distance_to(a),
    }
}

pub fn point_segment_distance(p: PxPoint, a: PxPoint, b: PxPoint) -> f64 {
    distance_with(p, a, b, |t| t.clamp(0.0, 1.0))
}

pub fn point_ray_distance(p: PxPoint, origin: PxPoint, through: PxPoint) -> f64 {
    distance_with(p, origin, through, |t| t.max(0.0))
}

pub fn point_line_distance(p: PxPoint, a: PxPoint, b: PxPoint) -> f64 {
    distance_with(p, a, b, |t| t)
}

pub fn rect_contains(a: PxPoint, b: PxPoint, p: PxPoint) -> bool {
    Bounds::from_corners(a, b).contains(p)
}

/// Ellipse inscribed in the box spanned by `a` and `b`.
pub fn ellipse_contains(a: PxPoint, b: PxPoint, p: PxPoint) -> bool {
    let bounds = Bounds::from_corners(a, b);
    let c = a.midpoint(b);
    let rx = bounds.width() * 0.5;
    let ry = bounds.height() * 0.5;
    let nx = (p.x - c.x) / rx;
    let ny = (p.y - c.y) / ry;
    nx * nx + ny * ny <= 1.0
}

/// Box covered by a text label anchored at its top-left corner.
pub fn text_bounds(anchor: PxPoint, text: &str) -> Bounds {
    let chars = text.chars().count().max(1) as f64;
    Bounds::from_corners(anchor, anchor.offset(chars * TEXT_CHAR_WIDTH_PX, TEXT_LINE_HEIGHT_PX))
}

/// Fib level lines spanning the x-range of the two anchors. Level 0 sits at
/// the second anchor, level 1 at the first.
pub fn fib_lines(points: &[PxPoint; 2], levels: &[f64]) -> Vec<(f64, RefLine)> {
    let [a, b] = *points;
    let (x0, x1) = (a.x.min(b.x), a.x.max(b.x));
    levels
        .iter()
        .map(|&level| {
            let y = b.y + (a.y - b.y) * level;
            (level, RefLine::segment(PxPoint::new(x0, y), PxPoint::new(x1, y)))
        })
        .collect()
}

/// Base line through the first two points, its parallel through the third,
/// and the midline between them.
pub fn channel_lines(points: &[PxPoint; 3]) -> [RefLine; 3] {
    let [a, b, c] = *points;
    let (ox, oy) = if (b.x - a.x).abs() < MIN_EXTENT {
        (c.x - a.x, 0.0)
    } else {
        let slope = (b.y - a.y) / (b.x - a.x);
        (0.0, c.y - (a.y + slope * (c.x - a.x)))
    };
    [
        RefLine::segment(a, b),
        RefLine::segment(a.offset(ox, oy), b.offset(ox, oy)),
        RefLine::segment(a.offset(ox * 0.5, oy * 0.5), b.offset(ox * 0.5, oy * 0.5)),
    ]
}

/// Median from the pivot through the midpoint of the two reaction points,
/// tines parallel to it through each reaction point, and the reaction segment.
pub fn pitchfork_lines(points: &[PxPoint; 3]) -> [RefLine; 4] {
    let [pivot, b, c] = *points;
    let mid = b.midpoint(c);
    let (dx, dy) = (mid.x - pivot.x, mid.y - pivot.y);
    [
        RefLine::ray(pivot, mid),
        RefLine::ray(b, b.offset(dx, dy)),
        RefLine::ray(c, c.offset(dx, dy)),
        RefLine::segment(b, c),
    ]
}

/// Reference lines a shape is drawn with. Filled kinds and text have none.
pub fn reference_lines(geometry: &Geometry<PxPoint>) -> Vec<RefLine> {
    match geometry {
        Geometry::Trendline { points: [a, b] } | Geometry::Arrow { points: [a, b] } => vec![RefLine::segment(*a, *b)],
        Geometry::Ray { points: [a, b] } => vec![RefLine::ray(*a, *b)],
        Geometry::Hline { points: [p] } => vec![RefLine::line(*p, p.offset(1.0, 0.0))],
        Geometry::Vline { points: [p] } => vec![RefLine::line(*p, p.offset(0.0, 1.0))],
        Geometry::Fib { points, levels } => fib_lines(points, levels).into_iter().map(|(_, l)| l).collect(),
        Geometry::ParallelChannel { points } => channel_lines(points).to_vec(),
        Geometry::Pitchfork { points } => pitchfork_lines(points).to_vec(),
        Geometry::Rect { .. } | Geometry::Ellipse { .. } | Geometry::Text { .. } => Vec::new(),
    }
}

/// Hit-test distance from `p` to `shape`; callers compare it with their own
/// pixel threshold. Hidden shapes are never hit.
pub fn shape_distance(shape: &PixelShape, p: PxPoint) -> f64 {
    if shape.hidden { return f64::INFINITY; }
    let inside = |hit: bool| if hit { 0.0 } else { MISS_DISTANCE };
    match &shape.geometry {
        Geometry::Rect { points: [a, b], .. } => inside(rect_contains(*a, *b, p)),
        Geometry::Ellipse { points: [a, b] } => inside(ellipse_contains(*a, *b, p)),
        Geometry::Text { points: [a], text } => inside(text_bounds(*a, text).contains(p)),
        Geometry::Trendline { .. }
        | Geometry::Ray { .. }
        | Geometry::Arrow { .. }
        | Geometry::Hline { .. }
        | Geometry::Vline { .. }
        | Geometry::Fib { .. }
        | Geometry::ParallelChannel { .. }
        | Geometry::Pitchfork { .. } => reference_lines(&shape.geometry)
            .iter()
            .map(|l| l.distance(p))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Topmost (last drawn) shape within `threshold` pixels of `p`.
pub fn pick_topmost(shapes: &[PixelShape], p: PxPoint, threshold: f64) -> Option<ShapeId> {
    shapes.iter().rev().find(|s| shape_distance(s, p) <= threshold).map(|s| s.id)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    fn extreme(self, b: &Bounds) -> f64 {
        match self {
            Edge::Left => b.min_x,
            Edge::Right => b.max_x,
            Edge::Top => b.min_y,
            Edge::Bottom => b.max_y,
        }
    }

    fn pick(self, a: f64, b: f64) -> f64 {
        match self {
            Edge::Left | Edge::Top => a.min(b),
            Edge::Right | Edge::Bottom => a.max(b),
        }
    }

    fn delta(self, d: f64) -> (f64, f64) {
        match self {
            Edge::Left | Edge::Right => (d, 0.0),
            Edge::Top | Edge::Bottom => (0.0, d),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal: spread along x.
    H,
    /// Vertical: spread along y.
    V,
}

impl Axis {
    fn min_of(self, b: &Bounds) -> f64 {
        match self {
            Axis::H => b.min_x,
            Axis::V => b.min_y,
        }
    }

    fn delta(self, d: f64) -> (f64, f64) {
        match self {
            Axis::H => (d, 0.0),
            Axis::V => (0.0, d),
        }
    }
}

fn shape_bounds(s: &PixelShape) -> Option<Bounds> { Bounds::of(s.points()) }

fn shifted(s: &PixelShape, (dx, dy): (f64, f64)) -> PixelShape {
    let mut out = s.clone();
    out.translate(dx, dy);
    out
}

/// Rigidly shift every selected shape so its extreme on `edge` matches the
/// extreme of the whole selection. Needs at least two selected shapes.
pub fn align(shapes: &[PixelShape], selected: &[ShapeId], edge: Edge) -> Vec<PixelShape> {
    let sel: HashSet<ShapeId> = selected.iter().copied().collect();
    let extremes: Vec<f64> = shapes
        .iter()
        .filter(|s| sel.contains(&s.id))
        .filter_map(shape_bounds)
        .map(|b| edge.extreme(&b))
        .collect();
    if extremes.len() < 2 { return shapes.to_vec(); }
    let target = extremes[1..].iter().fold(extremes[0], |acc, &v| edge.pick(acc, v));

    shapes
        .iter()
        .map(|s| match shape_bounds(s) {
            Some(b) if sel.contains(&s.id) => shifted(s, edge.delta(target - edge.extreme(&b))),
            _ => s.clone(),
        })
        .collect()
}

/// Space selected shapes evenly along `axis` by their minimum coordinate,
/// keeping the first and last in place. Needs at least three selected shapes.
pub fn distribute(shapes: &[PixelShape], selected: &[ShapeId], axis: Axis) -> Vec<PixelShape> {
    let sel: HashSet<ShapeId> = selected.iter().copied().collect();
    let mut order: Vec<(usize, f64)> = shapes
        .iter()
        .enumerate()
        .filter(|(_, s)| sel.contains(&s.id))
        .filter_map(|(i, s)| shape_bounds(s).map(|b| (i, axis.min_of(&b))))
        .collect();
    if order.len() < 3 { return shapes.to_vec(); }
    order.sort_by(|a, b| a.1.total_cmp(&b.1));

    let first = order[0].1;
    let last = order[order.len() - 1].1;
    let gap = (last - first) / (order.len() - 1) as f64;

    let mut out = shapes.to_vec();
    for (rank, &(idx, min)) in order.iter().enumerate() {
        let target = first + rank as f64 * gap;
        out[idx] = shifted(&shapes[idx], axis.delta(target - min));
    }
    out
}
