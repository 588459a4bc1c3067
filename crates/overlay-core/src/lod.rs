// File: crates/overlay-core/src/lod.rs
// Summary: Level-of-detail: bucket sizing, min/max-preserving decimation, time-window slicing.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Fewest buckets a series is ever decimated to.
pub const MIN_BUCKETS: usize = 50;
pub const DEFAULT_PX_PER_BUCKET: f64 = 3.0;

/// Records ordered on the time axis.
pub trait Timed {
    fn time(&self) -> f64;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CandleLike {
    pub time: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    pub time: f64,
    pub value: f64,
}

impl Timed for CandleLike {
    #[inline]
    fn time(&self) -> f64 { self.time }
}

impl Timed for LinePoint {
    #[inline]
    fn time(&self) -> f64 { self.time }
}

/// Number of buckets to decimate to for a plot `pixel_width` wide.
pub fn bucket_count_for(pixel_width: f64, px_per_bucket: f64) -> usize {
    let per = if px_per_bucket.is_finite() && px_per_bucket > 0.0 { px_per_bucket } else { DEFAULT_PX_PER_BUCKET };
    let raw = (pixel_width / per).floor();
    let raw = if raw.is_finite() && raw > 0.0 { raw as usize } else { 0 };
    raw.max(MIN_BUCKETS)
}

/// Index ranges of `target` contiguous near-equal buckets over `n` items.
fn buckets(n: usize, target: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..target).map(move |i| (i * n / target, (i + 1) * n / target)).filter(|(s, e)| e > s)
}

/// Decimate candles to at most `target` buckets, keeping each bucket's
/// extremes. Returns the input untouched when it already fits.
pub fn downsample_candles_min_max(candles: &[CandleLike], target: usize) -> Cow<'_, [CandleLike]> {
    let target = target.max(1);
    if candles.len() <= target { return Cow::Borrowed(candles); }

    let out = buckets(candles.len(), target)
        .map(|(s, e)| {
            let chunk = &candles[s..e];
            let (high, low, volume) = chunk.iter().fold((f64::NEG_INFINITY, f64::INFINITY, 0.0), |(h, l, v), c| {
                (h.max(c.high), l.min(c.low), v + c.volume)
            });
            CandleLike {
                time: chunk[chunk.len() / 2].time,
                open: chunk[0].open,
                high,
                low,
                close: chunk[chunk.len() - 1].close,
                volume,
            }
        })
        .collect();
    Cow::Owned(out)
}

/// Decimate a line to at most `2 * target` points: each bucket contributes
/// its min and max points in original order, or one point when they coincide.
pub fn downsample_line_min_max(points: &[LinePoint], target: usize) -> Cow<'_, [LinePoint]> {
    let target = target.max(1);
    if points.len() <= target { return Cow::Borrowed(points); }

    let mut out = Vec::with_capacity(target * 2);
    for (s, e) in buckets(points.len(), target) {
        let (mut lo, mut hi) = (s, s);
        for i in s + 1..e {
            if points[i].value < points[lo].value { lo = i; }
            if points[i].value > points[hi].value { hi = i; }
        }
        match lo.cmp(&hi) {
            std::cmp::Ordering::Equal => out.push(points[lo]),
            std::cmp::Ordering::Less => out.extend([points[lo], points[hi]]),
            std::cmp::Ordering::Greater => out.extend([points[hi], points[lo]]),
        }
    }
    Cow::Owned(out)
}

/// First index whose time is `>= ts`, or `sorted.len()` if none.
pub fn lower_bound_by_time<T: Timed>(sorted: &[T], ts: f64) -> usize {
    if ts.is_nan() { return sorted.len(); }
    sorted.partition_point(|x| x.time() < ts)
}

/// Last index whose time is `<= ts`, or `-1` if none.
pub fn upper_bound_by_time<T: Timed>(sorted: &[T], ts: f64) -> isize {
    if ts.is_nan() { return -1; }
    sorted.partition_point(|x| x.time() <= ts) as isize - 1
}

/// Items with `from <= time <= to`. Reversed bounds are swapped.
pub fn slice_by_time_window<T: Timed>(sorted: &[T], from: f64, to: f64) -> &[T] {
    if sorted.is_empty() || from.is_nan() || to.is_nan() { return &[]; }
    let (from, to) = if from > to { (to, from) } else { (from, to) };
    let start = lower_bound_by_time(sorted, from);
    let end = upper_bound_by_time(sorted, to);
    if end < 0 || start > end as usize { return &[]; }
    &sorted[start..=end as usize]
}
