// File: crates/overlay-core/tests/labels.rs
// Purpose: Label text and anchors per shape kind, toggles, and unmappable input.

use overlay_core::label::{describe_drawing, LabelConfig};
use overlay_core::shape::{DomainShape, Geometry, Shape, ShapeId};
use overlay_core::{CoordinateMapper, DomainPoint, MapperUpdate, PxPoint, TimeInput, TimeScale, ValueScale};

fn dp(t: f64, p: f64) -> DomainPoint { DomainPoint::new(t, p) }

fn shape(g: Geometry<DomainPoint>) -> DomainShape { Shape::new(ShapeId(1), g) }

/// x == t, y == 200 - p.
fn mapper() -> CoordinateMapper {
    CoordinateMapper::from_scales(TimeScale::new(0.0, 0.0, 1.0, 1.0), ValueScale::new_linear(0.0, 200.0, 0.0, 200.0))
}

fn all() -> LabelConfig {
    LabelConfig { show_value: true, show_percent: true, show_angle: true, show_risk_reward: true }
}

#[test]
fn hline_shows_price() {
    let l = describe_drawing(&shape(Geometry::Hline { points: [dp(10.0, 150.0)] }), &mapper(), &all()).unwrap();
    assert_eq!(l.text, "150.00");
    assert_eq!(l.anchor, PxPoint::new(10.0, 50.0));
}

#[test]
fn vline_shows_utc_time() {
    let l = describe_drawing(&shape(Geometry::Vline { points: [dp(1_704_067_200.0, 0.0)] }), &mapper(), &all()).unwrap();
    assert_eq!(l.text, "2024-01-01 00:00");
}

#[test]
fn trendline_delta_percent_angle() {
    let s = shape(Geometry::Trendline { points: [dp(0.0, 100.0), dp(50.0, 150.0)] });
    let l = describe_drawing(&s, &mapper(), &all()).unwrap();
    assert_eq!(l.text, "+50.00 | +50.00% | 45.0°");
    assert_eq!(l.anchor, PxPoint::new(50.0, 50.0));

    let only_angle = LabelConfig { show_value: false, show_percent: false, ..all() };
    assert_eq!(describe_drawing(&s, &mapper(), &only_angle).unwrap().text, "45.0°");
}

#[test]
fn percent_is_omitted_for_zero_reference() {
    let s = shape(Geometry::Arrow { points: [dp(0.0, 0.0), dp(10.0, 20.0)] });
    let cfg = LabelConfig { show_angle: false, ..all() };
    assert_eq!(describe_drawing(&s, &mapper(), &cfg).unwrap().text, "+20.00");
}

#[test]
fn rect_height_and_risk_reward() {
    let s = shape(Geometry::Rect { points: [dp(0.0, 90.0), dp(20.0, 120.0)], entry: Some(100.0) });
    let l = describe_drawing(&s, &mapper(), &all()).unwrap();
    assert_eq!(l.text, "30.00 | 33.33% | R:R 2.00");
    assert_eq!(l.anchor, PxPoint::new(20.0, 80.0));

    let no_entry = shape(Geometry::Rect { points: [dp(0.0, 90.0), dp(20.0, 120.0)], entry: None });
    assert_eq!(describe_drawing(&no_entry, &mapper(), &all()).unwrap().text, "30.00 | 33.33%");

    let zero_risk = shape(Geometry::Rect { points: [dp(0.0, 90.0), dp(20.0, 120.0)], entry: Some(90.0) });
    assert_eq!(describe_drawing(&zero_risk, &mapper(), &all()).unwrap().text, "30.00 | 33.33%");
}

#[test]
fn kinds_without_labels() {
    let m = mapper();
    let three = [dp(0.0, 10.0), dp(5.0, 20.0), dp(10.0, 15.0)];
    assert!(describe_drawing(&shape(Geometry::ParallelChannel { points: three }), &m, &all()).is_none());
    assert!(describe_drawing(&shape(Geometry::Pitchfork { points: three }), &m, &all()).is_none());
    let text = shape(Geometry::Text { points: [dp(0.0, 10.0)], text: "hi".into() });
    assert!(describe_drawing(&text, &m, &all()).is_none());
}

#[test]
fn nothing_enabled_means_no_label() {
    let none = LabelConfig { show_value: false, show_percent: false, show_angle: false, show_risk_reward: false };
    let s = shape(Geometry::Trendline { points: [dp(0.0, 100.0), dp(50.0, 150.0)] });
    assert!(describe_drawing(&s, &mapper(), &none).is_none());
}

#[test]
fn unmappable_coordinates_yield_none() {
    let mut m = mapper();
    m.set_mappers(MapperUpdate::new().time_to_x(|t: &TimeInput| match t {
        TimeInput::Seconds(s) if *s < 100.0 => Some(*s),
        _ => None,
    }));
    let s = shape(Geometry::Trendline { points: [dp(0.0, 100.0), dp(500.0, 150.0)] });
    assert!(describe_drawing(&s, &m, &all()).is_none());
    assert!(describe_drawing(&s, &CoordinateMapper::new(), &all()).is_none());
}
