// File: crates/overlay-core/src/label.rs
// Summary: Overlay readouts (value, delta, percent, angle, risk:reward) derived from shapes.

use serde::{Deserialize, Serialize};

use crate::geometry::Bounds;
use crate::mapper::CoordinateMapper;
use crate::shape::{DomainShape, Geometry};
use crate::time::format_utc;
use crate::types::{DomainPoint, PxPoint};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub show_value: bool,
    pub show_percent: bool,
    pub show_angle: bool,
    pub show_risk_reward: bool,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self { show_value: true, show_percent: true, show_angle: false, show_risk_reward: true }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub text: String,
    /// Pixel position the host should draw the text at.
    pub anchor: PxPoint,
}

const SEP: &str = " | ";

fn percent_of(delta: f64, reference: f64) -> Option<f64> {
    (reference != 0.0).then(|| delta / reference * 100.0)
}

fn angle_deg(a: PxPoint, b: PxPoint) -> f64 {
    (-(b.y - a.y)).atan2(b.x - a.x).to_degrees()
}

fn line_parts(cfg: &LabelConfig, d: [DomainPoint; 2], px: [PxPoint; 2]) -> Vec<String> {
    let delta = d[1].p - d[0].p;
    let mut parts = Vec::new();
    if cfg.show_value { parts.push(format!("{delta:+.2}")); }
    if cfg.show_percent {
        if let Some(pct) = percent_of(delta, d[0].p) { parts.push(format!("{pct:+.2}%")); }
    }
    if cfg.show_angle { parts.push(format!("{:.1}°", angle_deg(px[0], px[1]))); }
    parts
}

fn height_parts(cfg: &LabelConfig, d: [DomainPoint; 2]) -> Vec<String> {
    let lower = d[0].p.min(d[1].p);
    let height = (d[1].p - d[0].p).abs();
    let mut parts = Vec::new();
    if cfg.show_value { parts.push(format!("{height:.2}")); }
    if cfg.show_percent {
        if let Some(pct) = percent_of(height, lower) { parts.push(format!("{pct:.2}%")); }
    }
    parts
}

/// Reward measured toward the second corner's price, risk toward the first.
fn risk_reward(d: [DomainPoint; 2], entry: f64) -> Option<f64> {
    let reward = (d[1].p - entry).abs();
    let risk = (d[0].p - entry).abs();
    (risk > 0.0).then(|| reward / risk)
}

fn top_right(px: &[PxPoint]) -> Option<PxPoint> {
    Bounds::of(px).map(|b| PxPoint::new(b.max_x, b.min_y))
}

/// Readout for `shape`, or `None` when its kind has no readout, nothing is
/// enabled, or any coordinate cannot be mapped.
pub fn describe_drawing(shape: &DomainShape, mapper: &CoordinateMapper, cfg: &LabelConfig) -> Option<Label> {
    let projected = mapper.project(shape)?;
    let px = projected.points();
    let last = *px.last()?;

    let (parts, anchor) = match &shape.geometry {
        Geometry::Hline { points: [p] } => {
            (if cfg.show_value { vec![format!("{:.2}", p.p)] } else { Vec::new() }, last)
        }
        Geometry::Vline { points: [p] } => {
            let when = if cfg.show_value { vec![format_utc(p.t)?] } else { Vec::new() };
            (when, last)
        }
        Geometry::Trendline { points } | Geometry::Ray { points } | Geometry::Arrow { points } => {
            (line_parts(cfg, *points, [px[0], px[1]]), last)
        }
        Geometry::Rect { points, entry } => {
            let mut parts = height_parts(cfg, *points);
            if cfg.show_risk_reward {
                if let Some(rr) = entry.and_then(|e| risk_reward(*points, e)) {
                    parts.push(format!("R:R {rr:.2}"));
                }
            }
            (parts, top_right(px)?)
        }
        Geometry::Ellipse { points } => (height_parts(cfg, *points), top_right(px)?),
        Geometry::Fib { points, .. } => (height_parts(cfg, *points), last),
        Geometry::ParallelChannel { .. } | Geometry::Pitchfork { .. } | Geometry::Text { .. } => return None,
    };

    if parts.is_empty() { return None; }
    Some(Label { text: parts.join(SEP), anchor })
}
