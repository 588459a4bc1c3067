// File: crates/overlay-core/tests/mapper_snap.rs
// Purpose: Coordinate mapper conversions, magnet snapping and grid snapping.

use approx::assert_relative_eq;
use overlay_core::grid::{snap_px_to_grid, snap_y_to_price_levels};
use overlay_core::shape::{Geometry, Shape, ShapeId};
use overlay_core::{CoordinateMapper, DomainPoint, MapperUpdate, PxPoint, TimeInput, TimeScale, ValueScale};
use proptest::prelude::*;

fn identity_mapper() -> CoordinateMapper {
    let mut m = CoordinateMapper::new();
    m.set_mappers(
        MapperUpdate::new()
            .price_to_y(|p| Some(p))
            .y_to_price(|y| Some(y))
            .time_to_x(|t| overlay_core::time::to_seconds(t))
            .x_to_time(|x| Some(TimeInput::Seconds(x))),
    );
    m
}

fn scaled_mapper() -> CoordinateMapper {
    // 60 s bars, 10 px apart starting at x=0; prices 100..200 over 400..0 px.
    CoordinateMapper::from_scales(TimeScale::new(0.0, 0.0, 60.0, 10.0), ValueScale::new_linear(0.0, 400.0, 100.0, 200.0))
}

#[test]
fn price_magnet_snaps_within_tolerance_only() {
    let mut m = identity_mapper();
    m.set_visible_price_levels(&[30.0, 10.0, 20.0, 20.0, f64::NAN]);
    assert_eq!(m.visible_price_levels(), &[10.0, 20.0, 30.0]);
    assert_eq!(m.magnet_y_to_ohlc(18.5, 2.0), 20.0);
    assert_eq!(m.magnet_y_to_ohlc(25.0, 2.0), 25.0);
}

#[test]
fn price_magnet_tie_goes_to_lowest_level() {
    let mut m = identity_mapper();
    m.set_visible_price_levels(&[20.0, 10.0]);
    assert_eq!(m.magnet_y_to_ohlc(15.0, 5.0), 10.0);
}

#[test]
fn price_magnet_without_mapper_returns_input() {
    let mut m = CoordinateMapper::new();
    m.set_visible_price_levels(&[10.0]);
    assert_eq!(m.magnet_y_to_ohlc(10.5, 5.0), 10.5);
}

#[test]
fn bar_magnet_handles_edges() {
    let mut m = CoordinateMapper::new();
    m.set_visible_bar_coords(&[100.0, 110.0, 120.0]);
    assert_eq!(m.magnet_x_to_bars(96.0, 5.0), 100.0);
    assert_eq!(m.magnet_x_to_bars(124.0, 5.0), 120.0);
    assert_eq!(m.magnet_x_to_bars(130.0, 5.0), 130.0);
    assert_eq!(m.magnet_x_to_bars(110.0, 0.0), 110.0);
}

#[test]
fn scale_backed_mapper_round_trips() {
    let m = scaled_mapper();
    assert_eq!(m.time_to_x(&TimeInput::Seconds(120.0)), Some(20.0));
    assert_eq!(m.price_to_y(150.0), Some(200.0));
    let d = m.to_domain(PxPoint::new(35.0, 100.0)).unwrap();
    assert_relative_eq!(d.t, 210.0);
    assert_relative_eq!(d.p, 175.0);
}

#[test]
fn calendar_time_is_understood_by_scale_mapper() {
    let m = CoordinateMapper::from_scales(
        TimeScale::new(0.0, 1_704_067_200.0, 86_400.0, 10.0),
        ValueScale::new_linear(0.0, 100.0, 0.0, 1.0),
    );
    assert_eq!(m.time_to_x(&TimeInput::date(2024, 1, 3)), Some(20.0));
    assert_eq!(m.time_to_x(&TimeInput::from("2024-01-02")), Some(10.0));
    assert_eq!(m.time_to_x(&TimeInput::from("not a date")), None);
}

#[test]
fn project_fails_as_a_whole() {
    let mut m = scaled_mapper();
    let shape = Shape::new(
        ShapeId(1),
        Geometry::Trendline { points: [DomainPoint::new(0.0, 150.0), DomainPoint::new(600.0, 175.0)] },
    );
    let px = m.project(&shape).unwrap();
    assert_eq!(px.points(), &[PxPoint::new(0.0, 200.0), PxPoint::new(100.0, 100.0)]);
    let back = m.unproject(&px).unwrap();
    assert_relative_eq!(back.points()[1].t, 600.0);

    m.set_mappers(MapperUpdate::new().price_to_y(|p| (p < 160.0).then_some(p)));
    assert!(m.project(&shape).is_none());
}

#[test]
fn snap_domain_point_uses_both_magnets() {
    let mut m = scaled_mapper();
    m.set_visible_bar_coords(&[0.0, 10.0, 20.0]);
    m.set_visible_price_levels(&[150.0]);
    let d = m.snap_domain_point(PxPoint::new(12.0, 197.0), 4.0).unwrap();
    assert_relative_eq!(d.t, 60.0);
    assert_relative_eq!(d.p, 150.0);
}

#[test]
fn grid_snap_example() {
    assert_eq!(snap_px_to_grid(PxPoint::new(23.0, 47.0), 10.0, true), PxPoint::new(20.0, 50.0));
    assert_eq!(snap_px_to_grid(PxPoint::new(23.0, 47.0), 10.0, false), PxPoint::new(23.0, 47.0));
    assert_eq!(snap_y_to_price_levels(25.0, 10.0), 30.0);
    assert_eq!(snap_y_to_price_levels(-25.0, 10.0), -30.0);
    assert_eq!(snap_y_to_price_levels(25.0, 0.0), 25.0);
}

proptest! {
    #[test]
    fn bar_magnet_is_idempotent(
        mut bars in prop::collection::vec(-1_000.0f64..1_000.0, 1..40),
        x in -1_200.0f64..1_200.0,
        tol in 0.0f64..50.0,
    ) {
        let mut m = CoordinateMapper::new();
        bars.push(0.0);
        m.set_visible_bar_coords(&bars);
        let once = m.magnet_x_to_bars(x, tol);
        prop_assert_eq!(m.magnet_x_to_bars(once, tol), once);
    }

    #[test]
    fn bar_magnet_matches_linear_scan(
        bars in prop::collection::vec(-1_000.0f64..1_000.0, 1..40),
        x in -1_200.0f64..1_200.0,
    ) {
        let mut m = CoordinateMapper::new();
        m.set_visible_bar_coords(&bars);
        let snapped = m.magnet_x_to_bars(x, f64::INFINITY);
        let best = bars.iter().map(|b| (b - x).abs()).fold(f64::INFINITY, f64::min);
        prop_assert_eq!((snapped - x).abs(), best);
    }

    #[test]
    fn grid_snap_is_idempotent(x in -1.0e6f64..1.0e6, y in -1.0e6f64..1.0e6, step in 0.5f64..50.0) {
        let once = snap_px_to_grid(PxPoint::new(x, y), step, true);
        prop_assert_eq!(snap_px_to_grid(once, step, true), once);
    }
}
