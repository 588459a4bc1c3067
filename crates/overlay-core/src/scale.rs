// File: crates/overlay-core/src/scale.rs
// Summary: Time (X) and price (Y) scale transforms with zoom/pan hooks; backs the default mappers.

/// Horizontal time scale: consecutive bars `bar_seconds` apart are drawn
/// `bar_spacing` pixels apart, with `start_time` at `left_px`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeScale {
    pub left_px: f64,
    pub start_time: f64,
    pub bar_seconds: f64,
    pub bar_spacing: f64,
}

impl TimeScale {
    pub fn new(left_px: f64, start_time: f64, bar_seconds: f64, bar_spacing: f64) -> Self {
        Self {
            left_px,
            start_time,
            bar_seconds: bar_seconds.max(1e-9),
            bar_spacing: bar_spacing.max(0.01),
        }
    }

    #[inline]
    pub fn to_px(&self, t: f64) -> f64 {
        self.left_px + (t - self.start_time) / self.bar_seconds * self.bar_spacing
    }

    #[inline]
    pub fn from_px(&self, px: f64) -> f64 {
        self.start_time + (px - self.left_px) / self.bar_spacing * self.bar_seconds
    }

    /// Zoom around the cursor so the time under it stays put.
    pub fn zoom_at(&mut self, cursor_px: f64, factor: f64) {
        let anchor = self.from_px(cursor_px);
        self.bar_spacing = (self.bar_spacing * factor).clamp(0.5, 200.0);
        self.start_time = anchor - (cursor_px - self.left_px) / self.bar_spacing * self.bar_seconds;
    }

    pub fn pan_px(&mut self, dx_px: f64) {
        self.start_time -= dx_px / self.bar_spacing * self.bar_seconds;
    }

    /// Pixel x of each bar time, in input order.
    pub fn bar_coords<I: IntoIterator<Item = f64>>(&self, times: I) -> Vec<f64> {
        times.into_iter().map(|t| self.to_px(t)).collect()
    }
}

/// Vertical price scale mapping `[vmin, vmax]` onto `[bottom_px, top_px]`,
/// linear or log10.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueScale {
    pub top_px: f64,
    pub bottom_px: f64,
    pub vmin: f64,
    pub vmax: f64,
    pub log: bool,
}

const LOG_FLOOR: f64 = 1e-12;

impl ValueScale {
    pub fn new_linear(top_px: f64, bottom_px: f64, vmin: f64, mut vmax: f64) -> Self {
        if (vmax - vmin).abs() < 1e-12 { vmax = vmin + 1.0; }
        Self { top_px, bottom_px, vmin, vmax, log: false }
    }

    pub fn new_log10(top_px: f64, bottom_px: f64, vmin: f64, vmax: f64) -> Self {
        let vmin = vmin.max(LOG_FLOOR);
        let vmax = if vmax <= vmin { vmin * 10.0 } else { vmax };
        Self { top_px, bottom_px, vmin, vmax, log: true }
    }

    fn domain(&self) -> (f64, f64) {
        if self.log { (self.vmin.log10(), self.vmax.log10()) } else { (self.vmin, self.vmax) }
    }

    fn set_domain(&mut self, lo: f64, hi: f64) {
        if self.log {
            self.vmin = 10f64.powf(lo);
            self.vmax = 10f64.powf(hi);
        } else {
            self.vmin = lo;
            self.vmax = hi;
        }
    }

    #[inline]
    fn forward(&self, v: f64) -> f64 {
        if self.log { v.max(LOG_FLOOR).log10() } else { v }
    }

    #[inline]
    pub fn to_px(&self, price: f64) -> f64 {
        let (lo, hi) = self.domain();
        let span = (hi - lo).max(1e-12);
        self.bottom_px - (self.forward(price) - lo) / span * (self.bottom_px - self.top_px)
    }

    #[inline]
    pub fn from_px(&self, py: f64) -> f64 {
        let (lo, hi) = self.domain();
        let span = (hi - lo).max(1e-12);
        let v = lo + (self.bottom_px - py) / (self.bottom_px - self.top_px) * span;
        if self.log { 10f64.powf(v) } else { v }
    }

    pub fn pan_px(&mut self, dy_px: f64) {
        let (lo, hi) = self.domain();
        let frac = dy_px / (self.bottom_px - self.top_px).max(1.0);
        let delta = (hi - lo).max(1e-12) * frac;
        self.set_domain(lo + delta, hi + delta);
    }

    /// Shrink (`factor > 1`) or grow the visible range around `center`.
    pub fn zoom_center(&mut self, center: f64, factor: f64) {
        let (lo, hi) = self.domain();
        let c = self.forward(center);
        let half = ((hi - lo).max(1e-12) / factor.max(1e-9)).max(1e-9) * 0.5;
        self.set_domain(c - half, c + half);
    }
}
