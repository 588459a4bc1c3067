// File: crates/overlay-core/tests/svg.rs
// Purpose: SVG document structure, escaping, and conversion of pixel shapes to primitives.

use overlay_core::shape::{Geometry, PixelShape, Shape, ShapeId, ShapeStyle};
use overlay_core::svg::{shapes_to_nodes, Style, SvgDocument, SvgNode, ViewBox};
use overlay_core::PxPoint;

fn px(x: f64, y: f64) -> PxPoint { PxPoint::new(x, y) }

#[test]
fn document_has_header_and_view_box() {
    let doc = SvgDocument::new(200.0, 100.0).with_view_box(ViewBox { min_x: 0.0, min_y: 0.0, width: 400.0, height: 200.0 });
    let out = doc.render(&[]);
    assert!(out.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100" viewBox="0 0 400 200">"#));
    assert!(out.trim_end().ends_with("</svg>"));
    assert!(!SvgDocument::new(1.0, 1.0).render(&[]).contains("viewBox"));
}

#[test]
fn text_and_attributes_are_escaped() {
    let mut style = Style::new();
    style.insert("data-note".into(), r#"a"b"#.into());
    let nodes = [SvgNode::Text { x: 1.0, y: 2.0, content: "P&L <5%> 'x'".into(), style }];
    let out = SvgDocument::new(10.0, 10.0).render(&nodes);
    assert!(out.contains(r#"<text x="1" y="2" data-note="a&quot;b">P&amp;L &lt;5%&gt; &apos;x&apos;</text>"#));
}

#[test]
fn groups_nest_children() {
    let nodes = [SvgNode::Group {
        children: vec![
            SvgNode::Circle { cx: 5.0, cy: 5.0, r: 0.0, style: Style::new() },
            SvgNode::Polyline { points: vec![px(0.0, 0.0), px(1.5, 2.0)], style: Style::new() },
        ],
        style: Style::new(),
    }];
    let out = SvgDocument::new(10.0, 10.0).render(&nodes);
    assert!(out.contains("<g>\n    <circle cx=\"5\" cy=\"5\" r=\"0.000001\"/>"));
    assert!(out.contains(r#"<polyline points="0,0 1.5,2"/>"#));
    assert!(out.contains("  </g>"));
}

#[test]
fn shapes_map_to_primitives() {
    let mut hidden: PixelShape = Shape::new(ShapeId(9), Geometry::Hline { points: [px(0.0, 5.0)] });
    hidden.hidden = true;
    let shapes = vec![
        Shape::new(ShapeId(1), Geometry::Hline { points: [px(30.0, 40.0)] }).with_style(ShapeStyle {
            stroke: Some("#ff0000".into()),
            dash: Some(vec![4.0, 2.0]),
            ..ShapeStyle::default()
        }),
        Shape::new(ShapeId(2), Geometry::Rect { points: [px(50.0, 60.0), px(10.0, 20.0)], entry: None }),
        Shape::new(ShapeId(3), Geometry::Arrow { points: [px(0.0, 0.0), px(100.0, 0.0)] }),
        Shape::new(ShapeId(4), Geometry::Ellipse { points: [px(0.0, 0.0), px(20.0, 10.0)] }),
        hidden,
    ];
    let nodes = shapes_to_nodes(&shapes, 300.0, 200.0);
    assert_eq!(nodes.len(), 4);

    match &nodes[0] {
        SvgNode::Line { x1, x2, y1, style, .. } => {
            assert_eq!((*x1, *x2, *y1), (0.0, 300.0, 40.0));
            assert_eq!(style["stroke"], "#ff0000");
            assert_eq!(style["stroke-dasharray"], "4,2");
        }
        other => panic!("expected line, got {other:?}"),
    }
    match &nodes[1] {
        SvgNode::Rect { x, y, width, height, .. } => assert_eq!((*x, *y, *width, *height), (10.0, 20.0, 40.0, 40.0)),
        other => panic!("expected rect, got {other:?}"),
    }
    match &nodes[2] {
        SvgNode::Group { children, .. } => {
            assert!(matches!(children[1], SvgNode::Path { ref d, .. } if d.starts_with("M 90 5 L 100 0")));
        }
        other => panic!("expected group, got {other:?}"),
    }
    assert!(matches!(&nodes[3], SvgNode::Path { d, .. } if d.starts_with("M 0 5 A 10 5")));
}

#[test]
fn fib_and_pitchfork_expand_to_lines() {
    let shapes: Vec<PixelShape> = vec![
        Shape::new(ShapeId(1), Geometry::Fib { points: [px(0.0, 100.0), px(50.0, 0.0)], levels: vec![0.0, 1.0] }),
        Shape::new(ShapeId(2), Geometry::Pitchfork { points: [px(0.0, 50.0), px(100.0, 0.0), px(100.0, 100.0)] }),
    ];
    let nodes = shapes_to_nodes(&shapes, 300.0, 200.0);
    let count = |n: &SvgNode| match n {
        SvgNode::Group { children, .. } => children.iter().filter(|c| matches!(c, SvgNode::Line { .. })).count(),
        _ => 0,
    };
    assert_eq!(count(&nodes[0]), 2);
    assert_eq!(count(&nodes[1]), 4);
    let out = SvgDocument::new(300.0, 200.0).render(&nodes);
    assert!(out.contains(">0</text>") && out.contains(">1</text>"));
}

#[test]
fn zero_sizes_stay_positive() {
    let nodes = [
        SvgNode::Rect { x: 0.0, y: 0.0, width: 0.0, height: -3.0, style: Style::new() },
        SvgNode::Circle { cx: 1.0, cy: 1.0, r: 0.0004, style: Style::new() },
        SvgNode::Rect { x: 0.0, y: 0.0, width: 2.5, height: 0.0, style: Style::new() },
    ];
    let out = SvgDocument::new(10.0, 10.0).render(&nodes);
    assert!(out.contains(r#"<rect x="0" y="0" width="0.000001" height="0.000001"/>"#));
    assert!(out.contains(r#"<circle cx="1" cy="1" r="0.0004"/>"#));
    assert!(out.contains(r#"<rect x="0" y="0" width="2.5" height="0.000001"/>"#));
    assert!(!out.contains(r#"r="0""#) && !out.contains(r#"width="0""#));
}
