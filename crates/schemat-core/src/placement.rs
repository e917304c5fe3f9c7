//! The placement engine.
//!
//! Placement turns an element's local geometry into absolute coordinates. The
//! directives accumulated on the element ([`Placement`]) are consulted together
//! in one pass, in this order:
//!
//! 1. start position: explicit point, then another element's anchor, then the cursor
//! 2. heading: explicit angle, then direction keyword, then the cursor heading
//! 3. length (two-terminal elements only), possibly deriving the heading from an end point
//! 4. flip and reverse mirroring
//! 5. scaling about the local origin
//! 6. stretching with leads to the required length
//! 7. label layout
//! 8. rotation and translation (optionally aligning a named anchor to the start)
//! 9. the next cursor state
//!
//! # Conflicting directives
//!
//! Conflicts never fail. An explicit endpoint pair beats an explicit length;
//! an explicit length beats the distance to a single end point (`to`, `tox`,
//! `toy`), whose direction still sets the heading. An `anchor` directive is
//! ignored when an end point constrains the element.

use indexmap::IndexMap;
use log::{debug, trace};

use crate::{
    drawing::ElementId,
    element::{Element, ElementKind, LABEL_OFFSET, Label, LabelLoc},
    error::{Error, Result},
    geometry::{Bounds, Point, Transform},
    segment::{MirrorAxis, Primitive, Segment, TextGeometry},
    style::ResolvedStyle,
};

/// Position and heading of a drawing's cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cursor {
    position: Point,
    theta: f32,
}

impl Cursor {
    pub fn new(position: Point, theta: f32) -> Self {
        Self { position, theta }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Heading in degrees, counter-clockwise from the positive x axis.
    pub fn theta(&self) -> f32 {
        self.theta
    }

    pub(crate) fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub(crate) fn set_theta(&mut self, theta: f32) {
        self.theta = theta;
    }
}

/// Direction shorthands. Each implies a heading and updates the cursor heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Right,
    Up,
    Left,
    Down,
}

impl Direction {
    pub fn theta(self) -> f32 {
        match self {
            Self::Right => 0.0,
            Self::Up => 90.0,
            Self::Left => 180.0,
            Self::Down => 270.0,
        }
    }
}

/// Where an element starts.
#[derive(Debug, Clone, PartialEq)]
pub enum At {
    Point(Point),
    /// The named anchor of another, already placed, element
    Anchor(ElementId, String),
}

/// A single end point constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    Point(Point),
    /// End at this x coordinate, keeping the start's y
    X(f32),
    /// End at this y coordinate, keeping the start's x
    Y(f32),
}

impl Target {
    fn resolve(self, start: Point) -> Point {
        match self {
            Self::Point(point) => point,
            Self::X(x) => start.with_x(x),
            Self::Y(y) => start.with_y(y),
        }
    }
}

/// Placement directives accumulated on an element before it is placed.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub(crate) at: Option<At>,
    pub(crate) to: Option<Target>,
    pub(crate) endpoints: Option<(Point, Point)>,
    pub(crate) direction: Option<Direction>,
    pub(crate) theta: Option<f32>,
    pub(crate) length: Option<f32>,
    pub(crate) anchor: Option<String>,
    pub(crate) drop: Option<String>,
    pub(crate) hold: bool,
    pub(crate) flip: bool,
    pub(crate) reverse: bool,
    pub(crate) zoom: (f32, f32),
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            at: None,
            to: None,
            endpoints: None,
            direction: None,
            theta: None,
            length: None,
            anchor: None,
            drop: None,
            hold: false,
            flip: false,
            reverse: false,
            zoom: (1.0, 1.0),
        }
    }
}

impl Placement {
    pub fn at(&self) -> Option<&At> {
        self.at.as_ref()
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn length(&self) -> Option<f32> {
        self.length
    }

    pub fn is_hold(&self) -> bool {
        self.hold
    }

    pub fn is_flipped(&self) -> bool {
        self.flip
    }

    pub fn is_reversed(&self) -> bool {
        self.reverse
    }

    /// Whether an angle or direction directive was given.
    fn sets_heading(&self) -> bool {
        self.theta.is_some() || self.direction.is_some()
    }

    /// Checks that every numeric directive is usable.
    ///
    /// Coordinates and angles must be finite, an explicit length must be
    /// positive and scale factors must be finite and non-zero.
    fn validate(&self, element: &str) -> Result<()> {
        let invalid = |what: &str, value: String| -> Result<()> {
            Err(Error::InvalidValue(format!(
                "{what} of `{element}` must be finite, got {value}"
            )))
        };

        if let Some(At::Point(point)) = self.at {
            if !point.is_finite() {
                return invalid("start point", format!("{point:?}"));
            }
        }
        let target = match self.to {
            Some(Target::Point(point)) => point.is_finite(),
            Some(Target::X(value) | Target::Y(value)) => value.is_finite(),
            None => true,
        };
        if !target {
            return invalid("end target", format!("{:?}", self.to));
        }
        if let Some((first, second)) = self.endpoints {
            if !first.is_finite() || !second.is_finite() {
                return invalid("endpoints", format!("{first:?}, {second:?}"));
            }
        }
        if let Some(theta) = self.theta {
            if !theta.is_finite() {
                return invalid("angle", theta.to_string());
            }
        }
        if let Some(length) = self.length {
            if !(length.is_finite() && length > 0.0) {
                return Err(Error::InvalidValue(format!(
                    "length of `{element}` must be a positive finite number, got {length}"
                )));
            }
        }
        let (scale_x, scale_y) = self.zoom;
        if [scale_x, scale_y]
            .iter()
            .any(|scale| !scale.is_finite() || *scale == 0.0)
        {
            return Err(Error::InvalidValue(format!(
                "scale of `{element}` must be finite and non-zero, got ({scale_x}, {scale_y})"
            )));
        }
        Ok(())
    }
}

/// Everything the engine needs from the drawing.
pub(crate) struct PlacementContext<'a> {
    pub(crate) cursor: Cursor,
    pub(crate) unit: f32,
    pub(crate) style: &'a ResolvedStyle,
    pub(crate) anchor_lookup: &'a dyn Fn(ElementId, &str) -> Result<Point>,
}

/// Absolute geometry of a placed element.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedGeometry {
    pub(crate) segments: Vec<Segment>,
    pub(crate) anchors: IndexMap<String, Point>,
    pub(crate) transform: Transform,
    pub(crate) length: Option<f32>,
    pub(crate) bounds: Bounds,
}

impl PlacedGeometry {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn anchors(&self) -> &IndexMap<String, Point> {
        &self.anchors
    }

    /// The rigid transform mapping (mirrored, scaled, stretched) local
    /// coordinates to absolute coordinates.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Total length of a two-terminal element.
    pub fn length(&self) -> Option<f32> {
        self.length
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

/// Result of placing one element.
pub(crate) struct PlacementOutcome {
    pub(crate) geometry: PlacedGeometry,
    pub(crate) cursor: Cursor,
}

pub(crate) fn place(element: &Element, context: &PlacementContext<'_>) -> Result<PlacementOutcome> {
    let placement = element.placement();
    let two_terminal = element.kind() == ElementKind::TwoTerminal;

    placement.validate(element.name())?;

    // Definition errors surface even when the directive ends up unused
    for name in [&placement.anchor, &placement.drop].into_iter().flatten() {
        if !element.has_anchor(name) {
            return Err(Error::UnknownAnchor {
                element: element.name().to_string(),
                anchor: name.clone(),
            });
        }
    }

    let mut start = match &placement.at {
        Some(At::Point(point)) => *point,
        Some(At::Anchor(id, name)) => (context.anchor_lookup)(*id, name)?,
        None => context.cursor.position,
    };

    let mut theta = placement
        .theta
        .or(placement.direction.map(Direction::theta))
        .unwrap_or(context.cursor.theta);

    let end = match (placement.endpoints, placement.to) {
        (Some((first, second)), _) => {
            start = first;
            Some(EndConstraint::Pair(second))
        }
        (None, Some(target)) => Some(EndConstraint::Single(target.resolve(start))),
        (None, None) => None,
    };

    let length = if two_terminal {
        let length = match end {
            Some(EndConstraint::Pair(end)) => {
                if placement.length.is_some() {
                    debug!(element = element.name(); "Endpoint pair overrides explicit length");
                }
                theta = heading_towards(start, end).unwrap_or(theta);
                start.distance(end)
            }
            Some(EndConstraint::Single(end)) => {
                theta = heading_towards(start, end).unwrap_or(theta);
                placement.length.unwrap_or_else(|| start.distance(end))
            }
            None => placement.length.unwrap_or(context.unit),
        };
        Some(length)
    } else {
        if end.is_some() || placement.length.is_some() {
            debug!(element = element.name(); "Length directives ignored on fixed element");
        }
        None
    };
    let end = end.filter(|_| two_terminal);

    let mut segments = element.local_segments().to_vec();
    let mut caps = element.end_caps().to_vec();
    let mut anchors = element.local_anchors().clone();

    if placement.flip {
        let axis = MirrorAxis::Horizontal { at: 0.0 };
        mirror(&mut segments, &mut anchors, axis);
        mirror(&mut caps, &mut IndexMap::new(), axis);
    }
    if placement.reverse {
        let at = if two_terminal {
            core_extent(&segments).map_or(0.0, |(min_x, max_x)| (min_x + max_x) / 2.0)
        } else {
            0.0
        };
        mirror(&mut segments, &mut anchors, MirrorAxis::Vertical { at });
        mirror(&mut caps, &mut IndexMap::new(), MirrorAxis::Vertical { at: 0.0 });
    }

    let (scale_x, scale_y) = placement.zoom;
    if (scale_x, scale_y) != (1.0, 1.0) {
        let zoom = Transform::scaling(scale_x, scale_y);
        segments = segments.iter().map(|s| s.transformed(&zoom)).collect();
        caps = caps.iter().map(|s| s.transformed(&zoom)).collect();
        for point in anchors.values_mut() {
            *point = zoom.apply(*point);
        }
    }

    if let Some(length) = length {
        stretch(&mut segments, &mut anchors, length)?;
        // Caps sit at the end, or at the start once reversed
        let at = if placement.reverse { 0.0 } else { length };
        segments.extend(caps.iter().map(|cap| cap.translated(Point::new(at, 0.0))));
    }

    let body = local_body_bounds(&segments, &anchors);
    for label in element.labels() {
        segments.push(layout_label(label, body)?);
    }

    let rotation = Transform::new(theta, Point::default());
    let offset = match (&placement.anchor, end) {
        (Some(name), None) => {
            let local = anchors.get(name).copied().unwrap_or_default();
            start.sub_point(rotation.apply(local))
        }
        (Some(_), Some(_)) => {
            debug!(element = element.name(); "Anchor directive ignored with an end point constraint");
            start
        }
        (None, _) => start,
    };
    let transform = Transform::new(theta, offset);
    trace!(
        element = element.name(),
        theta,
        offset_x = offset.x(),
        offset_y = offset.y();
        "Resolved placement transform"
    );

    let segments: Vec<Segment> = segments.iter().map(|s| s.transformed(&transform)).collect();
    for point in anchors.values_mut() {
        *point = transform.apply(*point);
    }

    let bounds = segments
        .iter()
        .map(|segment| segment.bounds(context.style))
        .chain(anchors.values().copied().map(Bounds::from_point))
        .fold(Bounds::from_point(offset), |acc, bounds| acc.merge(&bounds));

    let cursor = next_cursor(element, context.cursor, &anchors, theta);

    debug!(
        element = element.name(),
        x = start.x(),
        y = start.y(),
        theta;
        "Element placed"
    );

    Ok(PlacementOutcome {
        geometry: PlacedGeometry {
            segments,
            anchors,
            transform,
            length,
            bounds,
        },
        cursor,
    })
}

#[derive(Debug, Clone, Copy)]
enum EndConstraint {
    Pair(Point),
    Single(Point),
}

/// Heading of the vector from `start` to `end`, if they differ.
fn heading_towards(start: Point, end: Point) -> Option<f32> {
    let vector = end.sub_point(start);
    (!vector.is_zero()).then(|| vector.angle())
}

fn mirror(segments: &mut [Segment], anchors: &mut IndexMap<String, Point>, axis: MirrorAxis) {
    for segment in segments.iter_mut() {
        *segment = segment.mirrored(axis);
    }
    for point in anchors.values_mut() {
        *point = match axis {
            MirrorAxis::Horizontal { at } => point.with_y(2.0 * at - point.y()),
            MirrorAxis::Vertical { at } => point.with_x(2.0 * at - point.x()),
        };
    }
}

/// Horizontal extent of the non-text geometry.
fn core_extent(segments: &[Segment]) -> Option<(f32, f32)> {
    let style = ResolvedStyle::default();
    segments
        .iter()
        .filter(|segment| !matches!(segment.primitive(), Primitive::Text(_)))
        .map(|segment| segment.bounds(&style))
        .reduce(|acc, bounds| acc.merge(&bounds))
        .map(|bounds| (bounds.min_x(), bounds.max_x()))
}

/// Centers the core on `[0, length]` and fills the gaps with leads.
fn stretch(
    segments: &mut Vec<Segment>,
    anchors: &mut IndexMap<String, Point>,
    length: f32,
) -> Result<()> {
    let (min_x, max_x) = core_extent(segments).unwrap_or((0.0, 0.0));
    let lead = (length - (max_x - min_x)) / 2.0;
    let shift = Point::new(lead - min_x, 0.0);

    for segment in segments.iter_mut() {
        *segment = segment.translated(shift);
    }
    for point in anchors.values_mut() {
        *point = point.add_point(shift);
    }

    if lead > 0.0 {
        segments.push(Segment::path(vec![Point::default(), Point::new(lead, 0.0)])?);
        segments.push(Segment::path(vec![
            Point::new(length - lead, 0.0),
            Point::new(length, 0.0),
        ])?);
    }
    trace!(length, lead; "Stretched two-terminal element");

    anchors.insert("start".to_string(), Point::default());
    anchors.insert("center".to_string(), Point::new(length / 2.0, 0.0));
    anchors.insert("end".to_string(), Point::new(length, 0.0));
    Ok(())
}

fn local_body_bounds(segments: &[Segment], anchors: &IndexMap<String, Point>) -> Bounds {
    let style = ResolvedStyle::default();
    segments
        .iter()
        .filter(|segment| !matches!(segment.primitive(), Primitive::Text(_)))
        .map(|segment| segment.bounds(&style))
        .chain(anchors.values().copied().map(Bounds::from_point))
        .reduce(|acc, bounds| acc.merge(&bounds))
        .unwrap_or_default()
}

fn layout_label(label: &Label, body: Bounds) -> Result<Segment> {
    let center = body.center();
    let offset = label.offset().unwrap_or(LABEL_OFFSET);
    let (position, outward) = match label.loc() {
        LabelLoc::Top => (center.with_y(body.max_y() + offset), Some(Point::new(0.0, 1.0))),
        LabelLoc::Bottom => (center.with_y(body.min_y() - offset), Some(Point::new(0.0, -1.0))),
        LabelLoc::Left => (center.with_x(body.min_x() - offset), Some(Point::new(-1.0, 0.0))),
        LabelLoc::Right => (center.with_x(body.max_x() + offset), Some(Point::new(1.0, 0.0))),
        LabelLoc::Center => (center, None),
    };
    let text = TextGeometry::new(position, label.text());
    let text = match outward {
        Some(direction) => text.with_outward(direction),
        None => text,
    };
    Segment::text(text)
}

fn next_cursor(
    element: &Element,
    cursor: Cursor,
    anchors: &IndexMap<String, Point>,
    theta: f32,
) -> Cursor {
    let placement = element.placement();
    if placement.hold {
        return cursor;
    }
    let position = placement
        .drop
        .as_ref()
        .and_then(|name| anchors.get(name))
        .or_else(|| anchors.get("end"))
        .copied()
        .unwrap_or(cursor.position);
    let theta = if placement.sets_heading() {
        theta
    } else {
        cursor.theta
    };
    Cursor::new(position, theta)
}
