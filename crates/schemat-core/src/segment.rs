//! Drawing primitives owned by elements.
//!
//! A [`Segment`] is one drawable primitive with its own style overrides. It is
//! defined in element-local coordinates when the element is constructed and
//! mapped to absolute coordinates when the element is placed.
//!
//! # Primitive kinds
//!
//! | Kind | Geometry |
//! |------|----------|
//! | [`Primitive::Path`] | open polyline |
//! | [`Primitive::Polygon`] | closed polyline |
//! | [`Primitive::Circle`] | center and radius |
//! | [`Primitive::Arc`] | elliptical arc, see [`ArcGeometry`] |
//! | [`Primitive::Bezier`] | quadratic (3 points) or cubic (4 points) curve |
//! | [`Primitive::Text`] | anchored text, see [`TextGeometry`] |
//!
//! # Mirroring and rotation
//!
//! Segments flagged `flip_exempt` (arrowheads, for instance) keep their
//! geometry when the element is flipped. Text is never mirrored and, unless
//! it follows the element rotation, never rotated; either way it is kept
//! upright.

use std::fmt;

use crate::{
    error::{Error, Result},
    geometry::{Bounds, Point, Transform, normalize_angle},
    style::{ResolvedStyle, StyleAttrs},
    text,
};

/// Axis a segment is mirrored across.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MirrorAxis {
    /// Mirror across the horizontal line `y = at` (flip)
    Horizontal { at: f32 },
    /// Mirror across the vertical line `x = at` (reverse)
    Vertical { at: f32 },
}

impl MirrorAxis {
    fn mirror(self, point: Point) -> Point {
        match self {
            Self::Horizontal { at } => point.with_y(2.0 * at - point.y()),
            Self::Vertical { at } => point.with_x(2.0 * at - point.x()),
        }
    }

    fn mirror_vector(self, vector: Point) -> Point {
        match self {
            Self::Horizontal { .. } => vector.with_y(-vector.y()),
            Self::Vertical { .. } => vector.with_x(-vector.x()),
        }
    }
}

/// Horizontal text alignment relative to the text anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl HAlign {
    fn swapped(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Center => Self::Center,
            Self::Right => Self::Left,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Vertical text alignment relative to the text anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VAlign {
    Top,
    #[default]
    Center,
    Bottom,
}

impl VAlign {
    fn swapped(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Center => Self::Center,
            Self::Bottom => Self::Top,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Center => "center",
            Self::Bottom => "bottom",
        }
    }
}

/// Component of a unit vector above which a label counts as offset along that axis.
const ALIGN_THRESHOLD: f32 = 0.3;

/// An elliptical arc.
///
/// The ellipse has the given `width` and `height` before being rotated by
/// `angle` degrees about its center. The arc sweeps counter-clockwise from
/// parameter angle `theta1` to `theta2`; equal angles draw the full ellipse.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcGeometry {
    center: Point,
    width: f32,
    height: f32,
    angle: f32,
    theta1: f32,
    theta2: f32,
}

impl ArcGeometry {
    pub fn new(center: Point, width: f32, height: f32, theta1: f32, theta2: f32) -> Self {
        Self {
            center,
            width,
            height,
            angle: 0.0,
            theta1,
            theta2,
        }
    }

    /// Sets the rotation of the ellipse axes in degrees.
    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn theta1(&self) -> f32 {
        self.theta1
    }

    pub fn theta2(&self) -> f32 {
        self.theta2
    }

    /// Counter-clockwise sweep in degrees, in `(0, 360]`.
    pub fn sweep(&self) -> f32 {
        let sweep = normalize_angle(self.theta2 - self.theta1);
        if sweep == 0.0 { 360.0 } else { sweep }
    }

    /// Point on the ellipse at parameter angle `t` (degrees).
    pub fn point_at(&self, t: f32) -> Point {
        let t = t.to_radians();
        Point::new(self.width / 2.0 * t.cos(), self.height / 2.0 * t.sin())
            .rotate(self.angle)
            .add_point(self.center)
    }

    pub fn start_point(&self) -> Point {
        self.point_at(self.theta1)
    }

    pub fn end_point(&self) -> Point {
        self.point_at(self.theta1 + self.sweep())
    }

    fn contains_parameter(&self, t: f32) -> bool {
        normalize_angle(t - self.theta1) <= self.sweep()
    }

    /// Exact extent: the end points plus every axis extremum inside the sweep.
    pub fn bounds(&self) -> Bounds {
        let a = self.width / 2.0;
        let b = self.height / 2.0;
        let (cos, sin) = crate::geometry::cos_sin_deg(self.angle);

        let t_x = (-b * sin).atan2(a * cos).to_degrees();
        let t_y = (b * cos).atan2(a * sin).to_degrees();

        let extrema = [t_x, t_x + 180.0, t_y, t_y + 180.0]
            .into_iter()
            .filter(|t| self.contains_parameter(*t))
            .map(|t| self.point_at(t));

        let start = self.start_point();
        Bounds::from_point(start)
            .include_point(self.end_point())
            .merge(&Bounds::from_points(extrema).unwrap_or_else(|| Bounds::from_point(start)))
    }

    fn mirrored(&self, axis: MirrorAxis) -> Self {
        // Mirroring reverses orientation, so the sweep is traversed backwards
        let (theta1, theta2) = match axis {
            MirrorAxis::Horizontal { .. } => (-self.theta2, -self.theta1),
            MirrorAxis::Vertical { .. } => (180.0 - self.theta2, 180.0 - self.theta1),
        };
        Self {
            center: axis.mirror(self.center),
            angle: -self.angle,
            theta1,
            theta2,
            ..self.clone()
        }
    }

    fn transformed(&self, transform: &Transform) -> Self {
        let mut arc = self.clone();
        if transform.scale_x() < 0.0 {
            arc = arc.mirrored(MirrorAxis::Vertical { at: 0.0 });
        }
        if transform.scale_y() < 0.0 {
            arc = arc.mirrored(MirrorAxis::Horizontal { at: 0.0 });
        }
        let positive = Transform::new(transform.theta(), transform.offset())
            .with_scale(transform.scale_x().abs(), transform.scale_y().abs());
        Self {
            center: positive.apply(arc.center),
            width: arc.width * positive.scale_x(),
            height: arc.height * positive.scale_y(),
            angle: arc.angle + transform.theta(),
            ..arc
        }
    }
}

/// Anchored text.
///
/// When an `outward` direction is set, the alignment is recomputed after
/// every transform so that the text extends away from the anchor in that
/// direction (labels use this to stay clear of the element body).
#[derive(Debug, Clone, PartialEq)]
pub struct TextGeometry {
    position: Point,
    content: String,
    halign: HAlign,
    valign: VAlign,
    rotation: f32,
    follow_rotation: bool,
    outward: Option<Point>,
}

impl TextGeometry {
    pub fn new(position: Point, content: &str) -> Self {
        Self {
            position,
            content: content.to_string(),
            halign: HAlign::default(),
            valign: VAlign::default(),
            rotation: 0.0,
            follow_rotation: false,
            outward: None,
        }
    }

    pub fn with_align(mut self, halign: HAlign, valign: VAlign) -> Self {
        self.halign = halign;
        self.valign = valign;
        self
    }

    /// Sets the text rotation in degrees (normalized to stay upright).
    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = upright(rotation);
        self
    }

    /// Rotate the text along with the element it belongs to.
    pub fn with_follow_rotation(mut self, follow_rotation: bool) -> Self {
        self.follow_rotation = follow_rotation;
        self
    }

    /// Align the text so that it extends away from its anchor along `direction`.
    pub fn with_outward(mut self, direction: Point) -> Self {
        self.outward = Some(direction);
        self.realign();
        self
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn halign(&self) -> HAlign {
        self.halign
    }

    pub fn valign(&self) -> VAlign {
        self.valign
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    fn realign(&mut self) {
        let Some(direction) = self.outward else {
            return;
        };
        let length = direction.hypot();
        if length == 0.0 {
            return;
        }
        // Alignment is evaluated in the text's own (possibly rotated) frame
        let local = direction.scale(1.0 / length).rotate(-self.rotation);
        self.halign = if local.x() > ALIGN_THRESHOLD {
            HAlign::Left
        } else if local.x() < -ALIGN_THRESHOLD {
            HAlign::Right
        } else {
            HAlign::Center
        };
        self.valign = if local.y() > ALIGN_THRESHOLD {
            VAlign::Bottom
        } else if local.y() < -ALIGN_THRESHOLD {
            VAlign::Top
        } else {
            VAlign::Center
        };
    }

    fn mirrored(&self, axis: MirrorAxis) -> Self {
        let mut text = self.clone();
        text.position = axis.mirror(self.position);
        text.rotation = upright(-self.rotation);
        match self.outward {
            Some(direction) => {
                text.outward = Some(axis.mirror_vector(direction));
                text.realign();
            }
            None => match axis {
                MirrorAxis::Horizontal { .. } => text.valign = self.valign.swapped(),
                MirrorAxis::Vertical { .. } => text.halign = self.halign.swapped(),
            },
        }
        text
    }

    fn transformed(&self, transform: &Transform) -> Self {
        let mut text = self.clone();
        text.position = transform.apply(self.position);
        if self.follow_rotation {
            text.rotation = upright(self.rotation + transform.theta());
        }
        if let Some(direction) = self.outward {
            text.outward = Some(transform.apply_vector(direction));
            text.realign();
        }
        text
    }

    /// Extent of the rendered text for the given font settings.
    pub fn bounds(&self, font: &str, fontsize: f32) -> Bounds {
        let size = text::measure(&self.content, font, fontsize);
        let (w, h) = (size.width(), size.height());
        let min_x = match self.halign {
            HAlign::Left => 0.0,
            HAlign::Center => -w / 2.0,
            HAlign::Right => -w,
        };
        let min_y = match self.valign {
            VAlign::Bottom => 0.0,
            VAlign::Center => -h / 2.0,
            VAlign::Top => -h,
        };
        let corners = [
            Point::new(min_x, min_y),
            Point::new(min_x + w, min_y),
            Point::new(min_x + w, min_y + h),
            Point::new(min_x, min_y + h),
        ];
        Bounds::from_points(
            corners
                .into_iter()
                .map(|corner| corner.rotate(self.rotation).add_point(self.position)),
        )
        .unwrap_or_else(|| Bounds::from_point(self.position))
    }
}

/// Normalizes a text rotation into `(-90, 90]` so the text never reads upside down.
fn upright(rotation: f32) -> f32 {
    let mut rotation = normalize_angle(rotation);
    if rotation > 180.0 {
        rotation -= 360.0;
    }
    if rotation > 90.0 {
        rotation -= 180.0;
    } else if rotation <= -90.0 {
        rotation += 180.0;
    }
    rotation
}

/// The geometry of a segment.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Path(Vec<Point>),
    Polygon(Vec<Point>),
    Circle { center: Point, radius: f32 },
    Arc(ArcGeometry),
    Bezier(Vec<Point>),
    Text(TextGeometry),
}

impl Primitive {
    /// Short name of the primitive kind.
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Path(_) => PrimitiveKind::Path,
            Self::Polygon(_) => PrimitiveKind::Polygon,
            Self::Circle { .. } => PrimitiveKind::Circle,
            Self::Arc(_) => PrimitiveKind::Arc,
            Self::Bezier(_) => PrimitiveKind::Bezier,
            Self::Text(_) => PrimitiveKind::Text,
        }
    }

    /// Coordinates defining the primitive.
    ///
    /// Paths, polygons and curves return their points; circles and arcs their
    /// center; text its anchor.
    pub fn points(&self) -> Vec<Point> {
        match self {
            Self::Path(points) | Self::Polygon(points) | Self::Bezier(points) => points.clone(),
            Self::Circle { center, .. } => vec![*center],
            Self::Arc(arc) => vec![arc.center],
            Self::Text(text) => vec![text.position],
        }
    }
}

/// Kind tag of a [`Primitive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Path,
    Polygon,
    Circle,
    Arc,
    Bezier,
    Text,
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Path => "path",
            Self::Polygon => "polygon",
            Self::Circle => "circle",
            Self::Arc => "arc",
            Self::Bezier => "bezier",
            Self::Text => "text",
        };
        f.write_str(name)
    }
}

/// One drawable primitive plus its style overrides.
///
/// # Examples
///
/// ```
/// # use schemat_core::geometry::Point;
/// # use schemat_core::segment::Segment;
/// let zigzag = Segment::path(vec![
///     Point::new(0.0, 0.0),
///     Point::new(0.5, 0.25),
///     Point::new(1.0, -0.25),
/// ])
/// .unwrap();
/// assert_eq!(zigzag.primitive().points().len(), 3);
///
/// // A path needs at least two points
/// assert!(Segment::path(vec![Point::new(0.0, 0.0)]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    primitive: Primitive,
    style: StyleAttrs,
    flip_exempt: bool,
}

fn check_finite(points: &[Point]) -> Result<()> {
    if points.iter().all(|point| point.is_finite()) {
        Ok(())
    } else {
        Err(Error::MalformedSegment(
            "segment coordinates must be finite".to_string(),
        ))
    }
}

impl Segment {
    fn new(primitive: Primitive) -> Self {
        Self {
            primitive,
            style: StyleAttrs::default(),
            flip_exempt: false,
        }
    }

    /// An open polyline through at least two points.
    pub fn path(points: Vec<Point>) -> Result<Self> {
        if points.len() < 2 {
            return Err(Error::MalformedSegment(format!(
                "path needs at least 2 points, got {}",
                points.len()
            )));
        }
        check_finite(&points)?;
        Ok(Self::new(Primitive::Path(points)))
    }

    /// A closed polygon with at least three vertices.
    pub fn polygon(points: Vec<Point>) -> Result<Self> {
        if points.len() < 3 {
            return Err(Error::MalformedSegment(format!(
                "polygon needs at least 3 points, got {}",
                points.len()
            )));
        }
        check_finite(&points)?;
        Ok(Self::new(Primitive::Polygon(points)))
    }

    pub fn circle(center: Point, radius: f32) -> Result<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(Error::MalformedSegment(format!(
                "circle radius must be positive, got {radius}"
            )));
        }
        check_finite(&[center])?;
        Ok(Self::new(Primitive::Circle { center, radius }))
    }

    pub fn arc(arc: ArcGeometry) -> Result<Self> {
        if !(arc.width.is_finite() && arc.width > 0.0 && arc.height.is_finite() && arc.height > 0.0)
        {
            return Err(Error::MalformedSegment(format!(
                "arc must have a positive size, got {}x{}",
                arc.width, arc.height
            )));
        }
        if !(arc.theta1.is_finite() && arc.theta2.is_finite() && arc.angle.is_finite()) {
            return Err(Error::MalformedSegment(
                "arc angles must be finite".to_string(),
            ));
        }
        check_finite(&[arc.center])?;
        Ok(Self::new(Primitive::Arc(arc)))
    }

    /// A quadratic (3 points) or cubic (4 points) Bézier curve.
    pub fn bezier(points: Vec<Point>) -> Result<Self> {
        if !matches!(points.len(), 3 | 4) {
            return Err(Error::MalformedSegment(format!(
                "bezier needs 3 or 4 control points, got {}",
                points.len()
            )));
        }
        check_finite(&points)?;
        Ok(Self::new(Primitive::Bezier(points)))
    }

    pub fn text(text: TextGeometry) -> Result<Self> {
        check_finite(&[text.position])?;
        if !text.rotation.is_finite() {
            return Err(Error::MalformedSegment(
                "text rotation must be finite".to_string(),
            ));
        }
        Ok(Self::new(Primitive::Text(text)))
    }

    /// Attaches per-segment style overrides.
    pub fn with_style(mut self, style: StyleAttrs) -> Self {
        self.style = style;
        self
    }

    /// Keeps this segment's geometry unchanged when the element is flipped.
    pub fn flip_exempt(mut self) -> Self {
        self.flip_exempt = true;
        self
    }

    pub fn primitive(&self) -> &Primitive {
        &self.primitive
    }

    pub fn style(&self) -> &StyleAttrs {
        &self.style
    }

    pub fn is_flip_exempt(&self) -> bool {
        self.flip_exempt
    }

    /// Mirrors the segment across `axis`.
    ///
    /// Flip-exempt segments ignore horizontal mirroring.
    pub fn mirrored(&self, axis: MirrorAxis) -> Segment {
        if self.flip_exempt && matches!(axis, MirrorAxis::Horizontal { .. }) {
            return self.clone();
        }
        let primitive = match &self.primitive {
            Primitive::Path(points) => Primitive::Path(mirror_all(points, axis)),
            Primitive::Polygon(points) => Primitive::Polygon(mirror_all(points, axis)),
            Primitive::Bezier(points) => Primitive::Bezier(mirror_all(points, axis)),
            Primitive::Circle { center, radius } => Primitive::Circle {
                center: axis.mirror(*center),
                radius: *radius,
            },
            Primitive::Arc(arc) => Primitive::Arc(arc.mirrored(axis)),
            Primitive::Text(text) => Primitive::Text(text.mirrored(axis)),
        };
        Segment {
            primitive,
            ..self.clone()
        }
    }

    /// Maps the segment through `transform`.
    pub fn transformed(&self, transform: &Transform) -> Segment {
        let primitive = match &self.primitive {
            Primitive::Path(points) => Primitive::Path(apply_all(points, transform)),
            Primitive::Polygon(points) => Primitive::Polygon(apply_all(points, transform)),
            Primitive::Bezier(points) => Primitive::Bezier(apply_all(points, transform)),
            Primitive::Circle { center, radius } => Primitive::Circle {
                center: transform.apply(*center),
                // Non-uniform scales keep the circle round, preserving its area
                radius: radius * (transform.scale_x() * transform.scale_y()).abs().sqrt(),
            },
            Primitive::Arc(arc) => Primitive::Arc(arc.transformed(transform)),
            Primitive::Text(text) => Primitive::Text(text.transformed(transform)),
        };
        Segment {
            primitive,
            ..self.clone()
        }
    }

    /// Moves the segment by `offset` without any other change.
    pub fn translated(&self, offset: Point) -> Segment {
        self.transformed(&Transform::new(0.0, offset))
    }

    /// Bounding box of the segment as drawn with `style`.
    ///
    /// Circles and arcs include their full curvature, Bézier curves their
    /// control polygon, and text its measured extent.
    pub fn bounds(&self, style: &ResolvedStyle) -> Bounds {
        match &self.primitive {
            Primitive::Path(points) | Primitive::Polygon(points) | Primitive::Bezier(points) => {
                Bounds::from_points(points.iter().copied()).unwrap_or_default()
            }
            Primitive::Circle { center, radius } => {
                Bounds::from_point(*center).add_margin(*radius)
            }
            Primitive::Arc(arc) => arc.bounds(),
            Primitive::Text(text) => {
                let style = style.overridden_by(&self.style);
                text.bounds(style.font(), style.fontsize())
            }
        }
    }
}

fn mirror_all(points: &[Point], axis: MirrorAxis) -> Vec<Point> {
    points.iter().map(|point| axis.mirror(*point)).collect()
}

fn apply_all(points: &[Point], transform: &Transform) -> Vec<Point> {
    points.iter().map(|point| transform.apply(*point)).collect()
}
