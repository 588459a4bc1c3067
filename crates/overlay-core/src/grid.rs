// File: crates/overlay-core/src/grid.rs
// Summary: Grid layout and grid snapping helpers.

use crate::types::PxPoint;

pub fn linspace(start: f64, end: f64, steps: usize) -> Vec<f64> {
    if steps < 2 { return vec![start, end]; }
    let step = (end - start) / (steps as f64 - 1.0);
    (0..steps).map(|i| start + step * i as f64).collect()
}

/// Round `v` to the nearest multiple of `step`, halves away from zero.
/// A non-positive or non-finite step leaves `v` untouched.
#[inline]
pub fn round_to_step(v: f64, step: f64) -> f64 {
    if !(step > 0.0) || !step.is_finite() || !v.is_finite() { return v; }
    (v / step).round() * step
}

pub fn snap_px_to_grid(point: PxPoint, step: f64, enabled: bool) -> PxPoint {
    if !enabled { return point; }
    PxPoint { x: round_to_step(point.x, step), y: round_to_step(point.y, step) }
}

pub fn snap_y_to_price_levels(y: f64, step: f64) -> f64 {
    round_to_step(y, step)
}
