// File: crates/overlay-core/src/mapper.rs
// Summary: Pluggable pixel <-> domain conversions with cached bar/price magnets.

use std::fmt;

use crate::scale::{TimeScale, ValueScale};
use crate::shape::{DomainShape, PixelShape};
use crate::time::{to_seconds, TimeInput};
use crate::types::{DomainPoint, PxPoint};

pub type PriceToY = Box<dyn Fn(f64) -> Option<f64>>;
pub type YToPrice = Box<dyn Fn(f64) -> Option<f64>>;
pub type TimeToX = Box<dyn Fn(&TimeInput) -> Option<f64>>;
pub type XToTime = Box<dyn Fn(f64) -> Option<TimeInput>>;

/// Partial set of conversion callbacks. Fields left `None` keep whatever the
/// mapper already has.
#[derive(Default)]
pub struct MapperUpdate {
    pub price_to_y: Option<PriceToY>,
    pub y_to_price: Option<YToPrice>,
    pub time_to_x: Option<TimeToX>,
    pub x_to_time: Option<XToTime>,
}

impl MapperUpdate {
    pub fn new() -> Self { Self::default() }

    pub fn price_to_y(mut self, f: impl Fn(f64) -> Option<f64> + 'static) -> Self {
        self.price_to_y = Some(Box::new(f));
        self
    }

    pub fn y_to_price(mut self, f: impl Fn(f64) -> Option<f64> + 'static) -> Self {
        self.y_to_price = Some(Box::new(f));
        self
    }

    pub fn time_to_x(mut self, f: impl Fn(&TimeInput) -> Option<f64> + 'static) -> Self {
        self.time_to_x = Some(Box::new(f));
        self
    }

    pub fn x_to_time(mut self, f: impl Fn(f64) -> Option<TimeInput> + 'static) -> Self {
        self.x_to_time = Some(Box::new(f));
        self
    }

    /// All four callbacks backed by a linear time scale and a value scale.
    /// Time inputs are reduced to epoch seconds first.
    pub fn from_scales(time: TimeScale, value: ValueScale) -> Self {
        Self::new()
            .price_to_y(move |p| Some(value.to_px(p)))
            .y_to_price(move |y| Some(value.from_px(y)))
            .time_to_x(move |t| to_seconds(t).map(|s| time.to_px(s)))
            .x_to_time(move |x| Some(TimeInput::Seconds(time.from_px(x))))
    }
}

/// Bridge between the plot surface and chart space. Owned by one chart
/// instance and passed explicitly to whatever needs conversions.
#[derive(Default)]
pub struct CoordinateMapper {
    price_to_y: Option<PriceToY>,
    y_to_price: Option<YToPrice>,
    time_to_x: Option<TimeToX>,
    x_to_time: Option<XToTime>,
    price_levels: Vec<f64>,
    bar_coords: Vec<f64>,
}

impl fmt::Debug for CoordinateMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordinateMapper")
            .field("price_to_y", &self.price_to_y.is_some())
            .field("y_to_price", &self.y_to_price.is_some())
            .field("time_to_x", &self.time_to_x.is_some())
            .field("x_to_time", &self.x_to_time.is_some())
            .field("price_levels", &self.price_levels.len())
            .field("bar_coords", &self.bar_coords.len())
            .finish()
    }
}

fn finite(v: Option<f64>) -> Option<f64> { v.filter(|v| v.is_finite()) }

impl CoordinateMapper {
    pub fn new() -> Self { Self::default() }

    pub fn from_scales(time: TimeScale, value: ValueScale) -> Self {
        let mut m = Self::new();
        m.set_mappers(MapperUpdate::from_scales(time, value));
        m
    }

    /// Merge callbacks; each provided field replaces the current one.
    pub fn set_mappers(&mut self, update: MapperUpdate) {
        if let Some(f) = update.price_to_y { self.price_to_y = Some(f); }
        if let Some(f) = update.y_to_price { self.y_to_price = Some(f); }
        if let Some(f) = update.time_to_x { self.time_to_x = Some(f); }
        if let Some(f) = update.x_to_time { self.x_to_time = Some(f); }
    }

    /// Re-install scale-backed callbacks after a pan or zoom.
    pub fn set_scales(&mut self, time: TimeScale, value: ValueScale) {
        self.set_mappers(MapperUpdate::from_scales(time, value));
    }

    pub fn y_to_price(&self, y: f64) -> Option<f64> {
        finite(self.y_to_price.as_ref().and_then(|f| f(y)))
    }

    pub fn price_to_y(&self, price: f64) -> Option<f64> {
        finite(self.price_to_y.as_ref().and_then(|f| f(price)))
    }

    pub fn x_to_time(&self, x: f64) -> Option<TimeInput> {
        self.x_to_time.as_ref().and_then(|f| f(x)).filter(TimeInput::is_usable)
    }

    pub fn time_to_x(&self, t: &TimeInput) -> Option<f64> {
        finite(self.time_to_x.as_ref().and_then(|f| f(t)))
    }

    /// Cache the prices the y-magnet may snap to, sorted ascending and deduplicated.
    pub fn set_visible_price_levels(&mut self, levels: &[f64]) {
        let mut v: Vec<f64> = levels.iter().copied().filter(|p| p.is_finite()).collect();
        v.sort_by(f64::total_cmp);
        v.dedup();
        self.price_levels = v;
    }

    /// Cache the pixel x of each visible bar, sorted ascending.
    pub fn set_visible_bar_coords(&mut self, coords: &[f64]) {
        let mut v: Vec<f64> = coords.iter().copied().filter(|x| x.is_finite()).collect();
        v.sort_by(f64::total_cmp);
        self.bar_coords = v;
    }

    pub fn visible_price_levels(&self) -> &[f64] { &self.price_levels }
    pub fn visible_bar_coords(&self) -> &[f64] { &self.bar_coords }

    /// Snap `y` to the pixel of the nearest visible price level within `tol`.
    pub fn magnet_y_to_ohlc(&self, y: f64, tol: f64) -> f64 {
        let mut best: Option<(f64, f64)> = None;
        for &level in &self.price_levels {
            let Some(ly) = self.price_to_y(level) else { continue };
            let d = (ly - y).abs();
            if best.map_or(true, |(_, bd)| d < bd) { best = Some((ly, d)); }
        }
        match best {
            Some((ly, d)) if d <= tol => ly,
            _ => y,
        }
    }

    /// Snap `x` to the nearest visible bar within `tol`. Equidistant bars
    /// resolve to the left one.
    pub fn magnet_x_to_bars(&self, x: f64, tol: f64) -> f64 {
        let bars = &self.bar_coords;
        if bars.is_empty() || !x.is_finite() { return x; }
        let i = bars.partition_point(|&b| b < x);
        let mut best: Option<(f64, f64)> = None;
        for j in [i.checked_sub(1), (i < bars.len()).then_some(i)].into_iter().flatten() {
            let d = (bars[j] - x).abs();
            if best.map_or(true, |(_, bd)| d < bd) { best = Some((bars[j], d)); }
        }
        match best {
            Some((bx, d)) if d <= tol => bx,
            _ => x,
        }
    }

    pub fn to_px(&self, p: DomainPoint) -> Option<PxPoint> {
        let x = self.time_to_x(&TimeInput::Seconds(p.t))?;
        let y = self.price_to_y(p.p)?;
        Some(PxPoint::new(x, y))
    }

    pub fn to_domain(&self, px: PxPoint) -> Option<DomainPoint> {
        let t = to_seconds(&self.x_to_time(px.x)?)?;
        let p = self.y_to_price(px.y)?;
        Some(DomainPoint::new(t, p))
    }

    pub fn project(&self, shape: &DomainShape) -> Option<PixelShape> {
        shape.map_points(|p| self.to_px(*p))
    }

    pub fn unproject(&self, shape: &PixelShape) -> Option<DomainShape> {
        shape.map_points(|p| self.to_domain(*p))
    }

    /// Apply both magnets to a pixel and convert the result to chart space.
    pub fn snap_domain_point(&self, px: PxPoint, tol: f64) -> Option<DomainPoint> {
        let snapped = PxPoint::new(self.magnet_x_to_bars(px.x, tol), self.magnet_y_to_ohlc(px.y, tol));
        self.to_domain(snapped)
    }
}
