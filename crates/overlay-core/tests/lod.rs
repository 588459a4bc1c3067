// File: crates/overlay-core/tests/lod.rs
// Purpose: Downsampling extrema/volume guarantees and time-window search against linear scans.

use approx::assert_relative_eq;
use overlay_core::lod::{
    bucket_count_for, downsample_candles_min_max, downsample_line_min_max, lower_bound_by_time, slice_by_time_window,
    upper_bound_by_time,
};
use overlay_core::time::time_to_sec;
use overlay_core::{CalendarDate, CandleLike, LinePoint, TimeInput};
use proptest::prelude::*;

fn candles_from(closes: &[f64]) -> Vec<CandleLike> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| CandleLike {
            time: i as f64 * 60.0,
            open: c - 0.5,
            high: c + 1.0 + (i % 7) as f64,
            low: c - 1.0 - (i % 5) as f64,
            close: c,
            volume: 1.0 + (i % 3) as f64,
        })
        .collect()
}

#[test]
fn bucket_count_examples() {
    assert_eq!(bucket_count_for(300.0, 3.0), 100);
    assert_eq!(bucket_count_for(100.0, 3.0), 50);
    assert_eq!(bucket_count_for(3000.0, 3.0), 1000);
}

#[test]
fn candle_buckets_aggregate_ohlcv() {
    let candles = candles_from(&(0..10).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
    let out = downsample_candles_min_max(&candles, 2);
    assert_eq!(out.len(), 2);
    let first = &out[0];
    assert_eq!(first.open, candles[0].open);
    assert_eq!(first.close, candles[4].close);
    assert_eq!(first.time, candles[2].time);
    assert_eq!(first.high, candles[..5].iter().map(|c| c.high).fold(f64::MIN, f64::max));
    assert_eq!(first.low, candles[..5].iter().map(|c| c.low).fold(f64::MAX, f64::min));
    assert_relative_eq!(out.iter().map(|c| c.volume).sum::<f64>(), candles.iter().map(|c| c.volume).sum::<f64>());
}

#[test]
fn line_buckets_keep_original_order() {
    let pts: Vec<LinePoint> =
        [5.0, 9.0, 1.0, 4.0, 3.0, 0.0, 2.0, 8.0].iter().enumerate().map(|(i, &v)| LinePoint { time: i as f64, value: v }).collect();
    let out = downsample_line_min_max(&pts, 2);
    let values: Vec<f64> = out.iter().map(|p| p.value).collect();
    assert_eq!(values, vec![9.0, 1.0, 0.0, 8.0]);
    assert!(out.windows(2).all(|w| w[0].time < w[1].time));
}

#[test]
fn time_inputs_convert_to_seconds() {
    assert_eq!(time_to_sec(&TimeInput::Seconds(1_700_000_000.0)), 1_700_000_000.0);
    assert_eq!(time_to_sec(&TimeInput::Seconds(f64::NAN)), 0.0);
    assert_eq!(time_to_sec(&TimeInput::from("1700000000")), 1_700_000_000.0);
    assert_eq!(time_to_sec(&TimeInput::from("2024-01-01")), 1_704_067_200.0);
    assert_eq!(time_to_sec(&TimeInput::date(2024, 1, 1)), 1_704_067_200.0);
    assert_eq!(time_to_sec(&TimeInput::Calendar(CalendarDate { year: 2024, month: Some(2), day: None })), 0.0);
    assert_eq!(time_to_sec(&TimeInput::date(2023, 2, 30)), 0.0);
    assert_eq!(time_to_sec(&TimeInput::from("yesterday")), 0.0);
}

#[test]
fn window_edges() {
    let pts: Vec<LinePoint> = (0..5).map(|i| LinePoint { time: i as f64 * 10.0, value: 0.0 }).collect();
    assert_eq!(slice_by_time_window(&pts, 10.0, 30.0).len(), 3);
    assert_eq!(slice_by_time_window(&pts, 30.0, 10.0).len(), 3);
    assert_eq!(slice_by_time_window(&pts, 11.0, 19.0).len(), 0);
    assert_eq!(slice_by_time_window(&pts, -100.0, 100.0).len(), 5);
    assert!(slice_by_time_window::<LinePoint>(&[], 0.0, 1.0).is_empty());
}

fn sorted_times() -> impl Strategy<Value = Vec<LinePoint>> {
    prop::collection::vec(0.0f64..1_000.0, 0..80).prop_map(|mut ts| {
        ts.sort_by(f64::total_cmp);
        ts.into_iter().map(|time| LinePoint { time, value: 0.0 }).collect()
    })
}

proptest! {
    #[test]
    fn candle_extrema_and_volume_preserved(
        closes in prop::collection::vec(1.0f64..1_000.0, 1..400),
        target in 0usize..120,
    ) {
        let candles = candles_from(&closes);
        let out = downsample_candles_min_max(&candles, target);
        prop_assert!(out.len() <= target.max(1));
        let hi = |cs: &[CandleLike]| cs.iter().map(|c| c.high).fold(f64::MIN, f64::max);
        let lo = |cs: &[CandleLike]| cs.iter().map(|c| c.low).fold(f64::MAX, f64::min);
        prop_assert_eq!(hi(&out), hi(&candles));
        prop_assert_eq!(lo(&out), lo(&candles));
        let vin: f64 = candles.iter().map(|c| c.volume).sum();
        let vout: f64 = out.iter().map(|c| c.volume).sum();
        prop_assert!((vin - vout).abs() <= 1e-9 * vin.max(1.0));
    }

    #[test]
    fn line_extrema_preserved(values in prop::collection::vec(-1e3f64..1e3, 1..400), target in 1usize..100) {
        let pts: Vec<LinePoint> = values.iter().enumerate().map(|(i, &v)| LinePoint { time: i as f64, value: v }).collect();
        let out = downsample_line_min_max(&pts, target);
        let bound = if pts.len() <= target { pts.len() } else { target * 2 };
        prop_assert!(out.len() <= bound);
        let max = |ps: &[LinePoint]| ps.iter().map(|p| p.value).fold(f64::MIN, f64::max);
        let min = |ps: &[LinePoint]| ps.iter().map(|p| p.value).fold(f64::MAX, f64::min);
        prop_assert_eq!(max(&out), max(&pts));
        prop_assert_eq!(min(&out), min(&pts));
    }

    #[test]
    fn bounds_match_linear_scan(pts in sorted_times(), ts in -10.0f64..1_010.0) {
        let lower = pts.iter().position(|p| p.time >= ts).unwrap_or(pts.len());
        let upper = pts.iter().rposition(|p| p.time <= ts).map_or(-1, |i| i as isize);
        prop_assert_eq!(lower_bound_by_time(&pts, ts), lower);
        prop_assert_eq!(upper_bound_by_time(&pts, ts), upper);
    }

    #[test]
    fn window_matches_filter(pts in sorted_times(), a in -10.0f64..1_010.0, b in -10.0f64..1_010.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let expected: Vec<f64> = pts.iter().map(|p| p.time).filter(|t| *t >= lo && *t <= hi).collect();
        let got: Vec<f64> = slice_by_time_window(&pts, a, b).iter().map(|p| p.time).collect();
        prop_assert_eq!(got, expected);
    }
}
