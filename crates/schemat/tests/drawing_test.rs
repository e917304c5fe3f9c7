//! Integration tests for placing elements on a drawing.
//!
//! These tests exercise the public API end to end: element definitions from
//! the catalog, placement directives, the cursor and the error taxonomy.

use std::sync::Arc;

use float_cmp::assert_approx_eq;
use schemat::{
    Drawing, SchematError,
    color::Color,
    config::{DrawingConfig, GlobalConfig},
    element::{ElementDefinition, ElementKind},
    elements::{Arrow, Capacitor, Dot, FlowBox, Line, Resistor},
    geometry::Point,
    segment::{HAlign, Primitive, Segment},
    style::{StyleAttribute, StyleAttrs, StyleSource},
};
use schemat_core::Error;

type TestResult = Result<(), SchematError>;

fn assert_point(actual: Point, expected: (f32, f32)) {
    assert_approx_eq!(f32, actual.x(), expected.0, epsilon = 1e-5);
    assert_approx_eq!(f32, actual.y(), expected.1, epsilon = 1e-5);
}

/// A drawing resolving against a private global snapshot.
fn isolated_drawing(global: GlobalConfig) -> Drawing {
    Drawing::new().with_global_config(Arc::new(global))
}

#[test]
fn test_two_terminal_defaults_to_unit_length() -> TestResult {
    let mut drawing = Drawing::new();
    let id = drawing.add(Resistor::new().build()?)?;

    let resistor = drawing.element(id)?;
    assert_point(resistor.start()?, (0.0, 0.0));
    assert_point(resistor.end()?, (drawing.unit(), 0.0));
    assert_eq!(resistor.geometry().and_then(|g| g.length()), Some(drawing.unit()));
    assert_point(drawing.here(), (drawing.unit(), 0.0));
    Ok(())
}

#[test]
fn test_drawing_unit_changes_default_length() -> TestResult {
    let mut drawing = Drawing::with_config(DrawingConfig::new().with_unit(2.0)?);
    let id = drawing.add(Capacitor::new().build()?.up())?;
    assert_point(drawing.anchor(id, "end")?, (0.0, 2.0));
    Ok(())
}

#[test]
fn test_chained_elements_share_endpoints() -> TestResult {
    let mut drawing = Drawing::new();
    let ids = [
        drawing.add(Resistor::new().build()?.right())?,
        drawing.add(Capacitor::new().build()?.down())?,
        drawing.add(Line::new().build()?.left())?,
        drawing.add(Resistor::new().build()?.theta(135.0))?,
    ];

    for pair in ids.windows(2) {
        let end = drawing.anchor(pair[0], "end")?;
        let start = drawing.anchor(pair[1], "start")?;
        assert_point(start, (end.x(), end.y()));
    }
    Ok(())
}

#[test]
fn test_right_then_up() -> TestResult {
    let mut drawing = Drawing::new();
    let unit = drawing.unit();
    drawing.add(Line::new().build()?.right())?;
    assert_point(drawing.here(), (unit, 0.0));
    drawing.add(Line::new().build()?.up())?;
    assert_point(drawing.here(), (unit, unit));
    assert_approx_eq!(f32, drawing.theta(), 90.0);
    Ok(())
}

#[test]
fn test_heading_persists_until_changed() -> TestResult {
    let mut drawing = Drawing::new();
    drawing.add(Line::new().build()?.down())?;
    let id = drawing.add(Resistor::new().build()?)?;
    assert_point(drawing.anchor(id, "end")?, (0.0, -2.0 * drawing.unit()));
    Ok(())
}

#[test]
fn test_endpoints_set_length_and_heading() -> TestResult {
    let mut drawing = Drawing::new();
    let id = drawing.add(Line::new().build()?.endpoints((0.0, 0.0), (3.0, 4.0)))?;

    let element = drawing.element(id)?;
    let geometry = element.geometry().expect("line should be placed");
    assert_approx_eq!(f32, geometry.length().unwrap_or_default(), 5.0, epsilon = 1e-5);
    assert_approx_eq!(
        f32,
        geometry.transform().theta(),
        4.0_f32.atan2(3.0).to_degrees(),
        epsilon = 1e-4
    );
    assert_point(drawing.anchor(id, "end")?, (3.0, 4.0));
    // The derived heading is not persisted without a direction directive
    assert_approx_eq!(f32, drawing.theta(), 0.0);
    Ok(())
}

#[test]
fn test_endpoint_pair_wins_over_length() -> TestResult {
    let mut drawing = Drawing::new();
    let id = drawing.add(
        Line::new()
            .build()?
            .endpoints((0.0, 0.0), (2.0, 0.0))
            .length(5.0),
    )?;
    assert_point(drawing.anchor(id, "end")?, (2.0, 0.0));
    Ok(())
}

#[test]
fn test_length_wins_over_single_target() -> TestResult {
    let mut drawing = Drawing::new();
    let id = drawing.add(Line::new().build()?.to((0.0, 2.0)).length(1.0))?;
    // Heading comes from the target, length from the directive
    assert_point(drawing.anchor(id, "end")?, (0.0, 1.0));
    Ok(())
}

#[test]
fn test_tox_and_toy() -> TestResult {
    let mut drawing = Drawing::new();
    drawing.move_to((1.0, 1.0));
    let horizontal = drawing.add(Line::new().build()?.tox(5.0))?;
    assert_point(drawing.anchor(horizontal, "end")?, (5.0, 1.0));

    let vertical = drawing.add(Line::new().build()?.toy(-2.0))?;
    assert_point(drawing.anchor(vertical, "end")?, (5.0, -2.0));
    Ok(())
}

#[test]
fn test_anchor_directive_aligns_named_anchor() -> TestResult {
    let mut drawing = Drawing::new();
    let id = drawing.add(FlowBox::new("Step").build()?.at((5.0, 5.0)).anchor("E"))?;

    assert_point(drawing.anchor(id, "E")?, (5.0, 5.0));
    assert_point(drawing.anchor(id, "W")?, (2.0, 5.0));
    let offset = drawing
        .element(id)?
        .geometry()
        .map(|geometry| geometry.transform().offset());
    assert_point(offset.unwrap_or_default(), (2.0, 5.0));
    Ok(())
}

#[test]
fn test_at_anchor_of_previous_element() -> TestResult {
    let mut drawing = Drawing::new();
    let resistor = drawing.add(Resistor::new().build()?.right())?;
    let line = drawing.add(Line::new().build()?.at_anchor(resistor, "center").down())?;

    let center = drawing.anchor(resistor, "center")?;
    assert_point(drawing.anchor(line, "start")?, (center.x(), center.y()));
    Ok(())
}

#[test]
fn test_flip_mirrors_across_main_axis() -> TestResult {
    let mut drawing = Drawing::new();
    let plain = drawing.add(Resistor::new().build()?.at((0.0, 0.0)).hold())?;
    let flipped = drawing.add(Resistor::new().build()?.at((0.0, 0.0)).flip().hold())?;
    let twice = drawing.add(Resistor::new().build()?.at((0.0, 0.0)).flip().flip().hold())?;

    let zigzag = |segments: &[Segment]| -> Vec<Point> {
        segments
            .iter()
            .find_map(|segment| match segment.primitive() {
                Primitive::Path(points) if points.len() > 2 => Some(points.clone()),
                _ => None,
            })
            .unwrap_or_default()
    };

    let plain_points = zigzag(drawing.element(plain)?.segments());
    let flipped_points = zigzag(drawing.element(flipped)?.segments());
    assert!(!plain_points.is_empty());
    for (a, b) in plain_points.iter().zip(&flipped_points) {
        assert_point(*b, (a.x(), -a.y()));
    }
    assert_eq!(drawing.element(twice)?.segments(), drawing.element(plain)?.segments());
    Ok(())
}

#[test]
fn test_reversed_arrow_points_back() -> TestResult {
    let mut drawing = Drawing::new();
    let forward = drawing.add(Arrow::new().build()?.right().hold())?;
    let backward = drawing.add(Arrow::new().build()?.right().reverse())?;

    let head = |segments: &[Segment]| -> Vec<Point> {
        segments
            .iter()
            .find_map(|segment| match segment.primitive() {
                Primitive::Polygon(points) => Some(points.clone()),
                _ => None,
            })
            .unwrap_or_default()
    };

    let unit = drawing.unit();
    let forward_head = head(drawing.element(forward)?.segments());
    assert_point(forward_head[0], (unit, 0.0));
    assert!(forward_head[1].x() < unit);

    let backward_head = head(drawing.element(backward)?.segments());
    assert_point(backward_head[0], (0.0, 0.0));
    assert!(backward_head[1].x() > 0.0);

    // Reversing changes the drawing, not the endpoints
    assert_point(drawing.anchor(backward, "end")?, (unit, 0.0));
    Ok(())
}

#[test]
fn test_labels_stay_upright() -> TestResult {
    let mut drawing = Drawing::new();
    let id = drawing.add(Resistor::new().build()?.up().label("R1"))?;

    let text = drawing
        .element(id)?
        .segments()
        .iter()
        .find_map(|segment| match segment.primitive() {
            Primitive::Text(text) => Some(text.clone()),
            _ => None,
        })
        .expect("label should be placed");
    assert_eq!(text.content(), "R1");
    assert_approx_eq!(f32, text.rotation(), 0.0);
    // The label sits on the left of an upward element and extends away from it
    assert!(text.position().x() < 0.0);
    assert_eq!(text.halign(), HAlign::Right);
    Ok(())
}

#[test]
fn test_push_pop_restores_cursor() -> TestResult {
    let mut drawing = Drawing::new();
    drawing.add(Line::new().build()?.right())?;
    let saved = drawing.cursor();

    drawing.push();
    drawing.add(Line::new().build()?.up())?;
    drawing.add(Dot::new().build()?)?;
    assert_ne!(drawing.cursor(), saved);

    drawing.pop()?;
    assert_eq!(drawing.cursor(), saved);
    Ok(())
}

#[test]
fn test_scoped_branch() -> TestResult {
    let mut drawing = Drawing::new();
    drawing.add(Line::new().build()?.right())?;
    let before = drawing.cursor();

    let branch = drawing.scoped(|drawing| drawing.add(Resistor::new().build()?.down()))?;
    assert_eq!(drawing.cursor(), before);
    assert!(drawing.element(branch)?.is_placed());
    Ok(())
}

#[test]
fn test_hold_and_drop() -> TestResult {
    let mut drawing = Drawing::new();
    drawing.add(Resistor::new().build()?.hold())?;
    assert_point(drawing.here(), (0.0, 0.0));

    let id = drawing.add(Resistor::new().build()?.drop("center"))?;
    let center = drawing.anchor(id, "center")?;
    assert_point(drawing.here(), (center.x(), center.y()));
    Ok(())
}

#[test]
fn test_pop_on_empty_stack() {
    let mut drawing = Drawing::new();
    assert!(matches!(drawing.pop(), Err(Error::EmptyStateStack)));
}

#[test]
fn test_anchor_of_unplaced_element() -> TestResult {
    let mut drawing = Drawing::new();
    let staged = drawing.stage(Resistor::new().build()?);

    assert!(matches!(
        drawing.anchor(staged, "end"),
        Err(Error::UnplacedElement { .. })
    ));
    let result = drawing.add(Line::new().build()?.at_anchor(staged, "end"));
    assert!(matches!(result, Err(Error::UnplacedElement { .. })));

    drawing.place(staged)?;
    assert!(matches!(drawing.place(staged), Err(Error::AlreadyPlaced { .. })));
    drawing.add(Line::new().build()?.at_anchor(staged, "end"))?;
    Ok(())
}

#[test]
fn test_unknown_anchor_discards_element() -> TestResult {
    let mut drawing = Drawing::new();
    drawing.add(Line::new().build()?)?;
    let cursor = drawing.cursor();

    let result = drawing.add(Resistor::new().build()?.drop("missing"));
    assert!(matches!(
        result,
        Err(Error::UnknownAnchor { ref anchor, .. }) if anchor == "missing"
    ));
    assert_eq!(drawing.elements().count(), 1);
    assert_eq!(drawing.cursor(), cursor);
    Ok(())
}

#[test]
fn test_element_ids_belong_to_their_drawing() -> TestResult {
    let mut first = Drawing::new();
    let mut second = Drawing::new();
    let id = first.add(Line::new().build()?)?;
    second.add(Line::new().build()?)?;
    assert!(matches!(second.element(id), Err(Error::UnknownElement)));
    Ok(())
}

/// A definition with a class name no other test uses.
#[derive(Debug)]
struct Probe;

impl ElementDefinition for Probe {
    fn name(&self) -> &str {
        "Probe"
    }

    fn class_chain(&self) -> &[&'static str] {
        &["Probe", "ProbeBase"]
    }

    fn kind(&self) -> ElementKind {
        ElementKind::TwoTerminal
    }

    fn segments(&self) -> schemat_core::Result<Vec<Segment>> {
        Ok(vec![Segment::path(vec![Point::default(), Point::new(1.0, 0.0)])?])
    }

    fn defaults(&self) -> StyleAttrs {
        StyleAttrs::new().with_zorder(3)
    }
}

#[test]
fn test_style_precedence() -> TestResult {
    let red = Color::new("red")?;
    let blue = Color::new("blue")?;
    let green = Color::new("green")?;

    let mut global = GlobalConfig::default();
    global.set_class_defaults("ProbeBase", StyleAttrs::new().with_color(Color::new("gray")?));
    global.set_class_defaults("Probe", StyleAttrs::new().with_color(red));
    let mut drawing = isolated_drawing(global);

    let class_default = drawing.add(Probe.build()?)?;
    let argument = drawing.add(Probe.build()?.color(blue))?;
    let mut with_setter = Probe.build()?.color(blue);
    with_setter.set_color(green);
    let setter = drawing.add(with_setter)?;

    let style_of = |id| drawing.element(id).ok().and_then(|e| e.style().cloned());
    assert_eq!(style_of(class_default).map(|s| s.color()), Some(red));
    assert_eq!(style_of(argument).map(|s| s.color()), Some(blue));
    assert_eq!(style_of(setter).map(|s| s.color()), Some(green));

    let element = drawing.element(class_default)?;
    assert_eq!(
        element.style_source(StyleAttribute::Color),
        Some(StyleSource::ClassDefault("Probe".to_string()))
    );
    assert_eq!(element.style_source(StyleAttribute::ZOrder), Some(StyleSource::Element));
    assert_eq!(element.style_source(StyleAttribute::LineWidth), Some(StyleSource::HardDefault));
    assert_eq!(
        drawing.element(setter)?.style_source(StyleAttribute::Color),
        Some(StyleSource::Setter)
    );
    Ok(())
}

#[test]
fn test_drawing_style_sits_below_element_defaults() -> TestResult {
    let config = DrawingConfig::new().with_style(StyleAttrs::new().with_lw(3.0)?.with_zorder(7));
    let mut drawing = Drawing::with_config(config);
    let id = drawing.add(Probe.build()?)?;

    let element = drawing.element(id)?;
    let style = element.style().cloned().unwrap_or_default();
    assert_approx_eq!(f32, style.lw(), 3.0);
    assert_eq!(style.zorder(), 3);
    assert_eq!(element.style_source(StyleAttribute::LineWidth), Some(StyleSource::Drawing));
    Ok(())
}

#[test]
fn test_post_hoc_setter_restyles_placed_element() -> TestResult {
    let mut drawing = Drawing::new();
    let id = drawing.add(Resistor::new().build()?)?;
    let segments = drawing.element(id)?.segments().to_vec();

    let orange = Color::new("orange")?;
    drawing.element_mut(id)?.set_color(orange);
    drawing.element_mut(id)?.set_lw(4.0)?;

    let element = drawing.element(id)?;
    let style = element.style().cloned().unwrap_or_default();
    assert_eq!(style.color(), orange);
    assert_approx_eq!(f32, style.lw(), 4.0);
    // Geometry is untouched
    assert_eq!(element.segments(), segments.as_slice());
    Ok(())
}

#[test]
fn test_invalid_style_values() -> TestResult {
    assert!(matches!(Color::new("no-such-color"), Err(Error::InvalidColor(_))));
    assert!(matches!(Resistor::new().build()?.lw(-1.0), Err(Error::InvalidValue(_))));
    assert!(matches!(Resistor::new().build()?.fontsize(-1.0), Err(Error::InvalidValue(_))));
    Ok(())
}

#[test]
fn test_invalid_placement_values() -> TestResult {
    let mut drawing = Drawing::new();
    let nan = Resistor::new().build()?.at((f32::NAN, 0.0));
    assert!(matches!(drawing.add(nan), Err(Error::InvalidValue(_))));
    let backwards = Resistor::new().build()?.length(-2.0);
    assert!(matches!(drawing.add(backwards), Err(Error::InvalidValue(_))));

    assert_point(drawing.here(), (0.0, 0.0));
    assert!(drawing.bounds().is_none());
    assert!(matches!(
        DrawingConfig::new().with_unit(0.0),
        Err(Error::InvalidValue(_))
    ));
    Ok(())
}

#[test]
fn test_frame_orders_by_zorder_and_pads_bounds() -> TestResult {
    let mut drawing = Drawing::with_config(DrawingConfig::new().with_margin(0.5)?);
    drawing.add(Dot::new().build()?)?;
    drawing.add(Line::new().build()?.right())?;

    let frame = drawing.frame();
    let zorders: Vec<i32> = frame.segments().iter().map(|s| s.zorder()).collect();
    let mut sorted = zorders.clone();
    sorted.sort();
    assert_eq!(zorders, sorted);
    // The dot was added first but draws on top
    assert_eq!(zorders.last(), Some(&1));

    let bounds = drawing.bounds().unwrap_or_default();
    assert_approx_eq!(f32, frame.bounds().min_x(), bounds.min_x() - 0.5);
    assert_approx_eq!(f32, frame.bounds().max_x(), bounds.max_x() + 0.5);
    Ok(())
}

#[test]
fn test_empty_drawing_has_empty_frame() {
    let drawing = Drawing::new();
    assert!(drawing.bounds().is_none());
    assert!(drawing.frame().is_empty());
}
