// File: crates/overlay-core/src/shape.rs
// Summary: Overlay shape model: closed geometry sum type with fixed per-kind arity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{DomainPoint, PxPoint};

/// Fibonacci retracement levels used when a payload does not carry its own.
pub const DEFAULT_FIB_LEVELS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

fn default_fib_levels() -> Vec<f64> { DEFAULT_FIB_LEVELS.to_vec() }

fn is_false(v: &bool) -> bool { !*v }

/// Stable identifier of a shape within one store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(pub u64);

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    Trendline,
    Ray,
    Arrow,
    Hline,
    Vline,
    Rect,
    Ellipse,
    Fib,
    ParallelChannel,
    Pitchfork,
    Text,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 11] = [
        ShapeKind::Trendline,
        ShapeKind::Ray,
        ShapeKind::Arrow,
        ShapeKind::Hline,
        ShapeKind::Vline,
        ShapeKind::Rect,
        ShapeKind::Ellipse,
        ShapeKind::Fib,
        ShapeKind::ParallelChannel,
        ShapeKind::Pitchfork,
        ShapeKind::Text,
    ];

    /// Number of points a shape of this kind is defined by.
    pub const fn arity(self) -> usize {
        match self {
            ShapeKind::Hline | ShapeKind::Vline | ShapeKind::Text => 1,
            ShapeKind::Trendline
            | ShapeKind::Ray
            | ShapeKind::Arrow
            | ShapeKind::Rect
            | ShapeKind::Ellipse
            | ShapeKind::Fib => 2,
            ShapeKind::ParallelChannel | ShapeKind::Pitchfork => 3,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ShapeKind::Trendline => "trendline",
            ShapeKind::Ray => "ray",
            ShapeKind::Arrow => "arrow",
            ShapeKind::Hline => "hline",
            ShapeKind::Vline => "vline",
            ShapeKind::Rect => "rect",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Fib => "fib",
            ShapeKind::ParallelChannel => "parallel-channel",
            ShapeKind::Pitchfork => "pitchfork",
            ShapeKind::Text => "text",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-kind geometry. Point count is part of the type, so a shape can never
/// hold the wrong number of points for its kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Geometry<P> {
    Trendline { points: [P; 2] },
    Ray { points: [P; 2] },
    Arrow { points: [P; 2] },
    Hline { points: [P; 1] },
    Vline { points: [P; 1] },
    Rect {
        points: [P; 2],
        /// Entry price used for the risk:reward readout.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        entry: Option<f64>,
    },
    Ellipse { points: [P; 2] },
    Fib {
        points: [P; 2],
        #[serde(default = "default_fib_levels")]
        levels: Vec<f64>,
    },
    ParallelChannel { points: [P; 3] },
    Pitchfork { points: [P; 3] },
    Text {
        points: [P; 1],
        #[serde(default)]
        text: String,
    },
}

fn map_array<P, Q, const N: usize>(
    points: &[P; N],
    f: &mut impl FnMut(&P) -> Option<Q>,
) -> Option<[Q; N]> {
    let mapped = points.iter().map(|p| f(p)).collect::<Option<Vec<Q>>>()?;
    mapped.try_into().ok()
}

impl<P> Geometry<P> {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Geometry::Trendline { .. } => ShapeKind::Trendline,
            Geometry::Ray { .. } => ShapeKind::Ray,
            Geometry::Arrow { .. } => ShapeKind::Arrow,
            Geometry::Hline { .. } => ShapeKind::Hline,
            Geometry::Vline { .. } => ShapeKind::Vline,
            Geometry::Rect { .. } => ShapeKind::Rect,
            Geometry::Ellipse { .. } => ShapeKind::Ellipse,
            Geometry::Fib { .. } => ShapeKind::Fib,
            Geometry::ParallelChannel { .. } => ShapeKind::ParallelChannel,
            Geometry::Pitchfork { .. } => ShapeKind::Pitchfork,
            Geometry::Text { .. } => ShapeKind::Text,
        }
    }

    pub fn points(&self) -> &[P] {
        match self {
            Geometry::Hline { points } | Geometry::Vline { points } | Geometry::Text { points, .. } => points.as_slice(),
            Geometry::Trendline { points }
            | Geometry::Ray { points }
            | Geometry::Arrow { points }
            | Geometry::Rect { points, .. }
            | Geometry::Ellipse { points }
            | Geometry::Fib { points, .. } => points.as_slice(),
            Geometry::ParallelChannel { points } | Geometry::Pitchfork { points } => points.as_slice(),
        }
    }

    pub fn points_mut(&mut self) -> &mut [P] {
        match self {
            Geometry::Hline { points } | Geometry::Vline { points } | Geometry::Text { points, .. } => points.as_mut_slice(),
            Geometry::Trendline { points }
            | Geometry::Ray { points }
            | Geometry::Arrow { points }
            | Geometry::Rect { points, .. }
            | Geometry::Ellipse { points }
            | Geometry::Fib { points, .. } => points.as_mut_slice(),
            Geometry::ParallelChannel { points } | Geometry::Pitchfork { points } => points.as_mut_slice(),
        }
    }

    /// Convert every point; `None` if any point fails to convert.
    pub fn map_points<Q>(&self, mut f: impl FnMut(&P) -> Option<Q>) -> Option<Geometry<Q>> {
        let f = &mut f;
        Some(match self {
            Geometry::Trendline { points } => Geometry::Trendline { points: map_array(points, f)? },
            Geometry::Ray { points } => Geometry::Ray { points: map_array(points, f)? },
            Geometry::Arrow { points } => Geometry::Arrow { points: map_array(points, f)? },
            Geometry::Hline { points } => Geometry::Hline { points: map_array(points, f)? },
            Geometry::Vline { points } => Geometry::Vline { points: map_array(points, f)? },
            Geometry::Rect { points, entry } => Geometry::Rect { points: map_array(points, f)?, entry: *entry },
            Geometry::Ellipse { points } => Geometry::Ellipse { points: map_array(points, f)? },
            Geometry::Fib { points, levels } => Geometry::Fib { points: map_array(points, f)?, levels: levels.clone() },
            Geometry::ParallelChannel { points } => Geometry::ParallelChannel { points: map_array(points, f)? },
            Geometry::Pitchfork { points } => Geometry::Pitchfork { points: map_array(points, f)? },
            Geometry::Text { points, text } => Geometry::Text { points: map_array(points, f)?, text: text.clone() },
        })
    }
}

impl<P: Copy> Geometry<P> {
    /// Build a geometry of `kind` from exactly `kind.arity()` points, with
    /// default extras (fib levels, empty text, no entry price).
    pub fn from_points(kind: ShapeKind, points: &[P]) -> Option<Self> {
        Some(match kind {
            ShapeKind::Trendline => Geometry::Trendline { points: points.try_into().ok()? },
            ShapeKind::Ray => Geometry::Ray { points: points.try_into().ok()? },
            ShapeKind::Arrow => Geometry::Arrow { points: points.try_into().ok()? },
            ShapeKind::Hline => Geometry::Hline { points: points.try_into().ok()? },
            ShapeKind::Vline => Geometry::Vline { points: points.try_into().ok()? },
            ShapeKind::Rect => Geometry::Rect { points: points.try_into().ok()?, entry: None },
            ShapeKind::Ellipse => Geometry::Ellipse { points: points.try_into().ok()? },
            ShapeKind::Fib => Geometry::Fib { points: points.try_into().ok()?, levels: default_fib_levels() },
            ShapeKind::ParallelChannel => Geometry::ParallelChannel { points: points.try_into().ok()? },
            ShapeKind::Pitchfork => Geometry::Pitchfork { points: points.try_into().ok()? },
            ShapeKind::Text => Geometry::Text { points: points.try_into().ok()?, text: String::new() },
        })
    }
}

/// Optional presentation attributes. Colors are CSS color strings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShapeStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

/// A drawn overlay. `P` is the coordinate space of its points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape<P> {
    pub id: ShapeId,
    #[serde(flatten)]
    pub geometry: Geometry<P>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ShapeStyle>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub locked: bool,
    /// Back-reference to a host-owned layer record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_id: Option<String>,
}

/// Shape stored and persisted by the drawing store.
pub type DomainShape = Shape<DomainPoint>;
/// Shape projected onto the plot surface.
pub type PixelShape = Shape<PxPoint>;

impl<P> Shape<P> {
    pub fn new(id: ShapeId, geometry: Geometry<P>) -> Self {
        Self { id, geometry, style: None, hidden: false, locked: false, layer_id: None }
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn kind(&self) -> ShapeKind { self.geometry.kind() }

    pub fn points(&self) -> &[P] { self.geometry.points() }

    /// Same shape in another coordinate space; `None` if any point fails.
    pub fn map_points<Q>(&self, f: impl FnMut(&P) -> Option<Q>) -> Option<Shape<Q>> {
        Some(Shape {
            id: self.id,
            geometry: self.geometry.map_points(f)?,
            style: self.style.clone(),
            hidden: self.hidden,
            locked: self.locked,
            layer_id: self.layer_id.clone(),
        })
    }
}

impl DomainShape {
    /// Shift by a domain delta following each kind's degrees of freedom:
    /// horizontal lines only move in price, vertical lines only in time.
    pub fn translate(&mut self, dt: f64, dp: f64) {
        let (dt, dp) = match self.kind() {
            ShapeKind::Hline => (0.0, dp),
            ShapeKind::Vline => (dt, 0.0),
            ShapeKind::Trendline
            | ShapeKind::Ray
            | ShapeKind::Arrow
            | ShapeKind::Rect
            | ShapeKind::Ellipse
            | ShapeKind::Fib
            | ShapeKind::ParallelChannel
            | ShapeKind::Pitchfork
            | ShapeKind::Text => (dt, dp),
        };
        for p in self.geometry.points_mut() {
            *p = p.shifted(dt, dp);
        }
    }
}

impl PixelShape {
    pub fn translate(&mut self, dx: f64, dy: f64) {
        for p in self.geometry.points_mut() {
            *p = p.offset(dx, dy);
        }
    }
}
