// File: crates/overlay-core/src/types.rs
// Summary: Point types for pixel space and domain (time, price) space.

use serde::{Deserialize, Serialize};

/// Position in pixels from the top-left of the plot surface.
/// X grows to the right, Y grows downward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PxPoint {
    pub x: f64,
    pub y: f64,
}

impl PxPoint {
    pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }

    #[inline]
    pub fn distance_to(self, other: PxPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[inline]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }

    pub fn midpoint(self, other: PxPoint) -> Self {
        Self { x: (self.x + other.x) * 0.5, y: (self.y + other.y) * 0.5 }
    }

    pub fn is_finite(self) -> bool { self.x.is_finite() && self.y.is_finite() }
}

/// Position in chart space: `t` in epoch seconds, `p` in price units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainPoint {
    pub t: f64,
    pub p: f64,
}

impl DomainPoint {
    pub const fn new(t: f64, p: f64) -> Self { Self { t, p } }

    #[inline]
    pub fn shifted(self, dt: f64, dp: f64) -> Self {
        Self { t: self.t + dt, p: self.p + dp }
    }
}
