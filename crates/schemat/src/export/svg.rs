//! SVG backend.
//!
//! Drawing coordinates are y-up; SVG is y-down. The backend maps a point
//! `(x, y)` of a frame with bounds `b` to
//! `((x - b.min_x) * scale, (b.max_y - y) * scale)`, so rotations that are
//! counter-clockwise in the drawing stay counter-clockwise on screen.
//!
//! Segments are grouped by z-order into `<g data-zorder="..">` elements,
//! emitted bottom first.

use log::{debug, trace};
use svg::{
    Document,
    node::element::{self as svg_element, path::Data},
};

use schemat_core::{
    geometry::Point,
    render::{Backend, Frame, RenderedSegment},
    segment::{ArcGeometry, HAlign, Primitive, TextGeometry, VAlign},
    style::ResolvedStyle,
    text::POINTS_PER_UNIT,
};

use super::Error;

/// Default output scale in pixels per drawing unit.
pub const DEFAULT_SCALE: f32 = 20.0;

/// Type alias for boxed SVG nodes.
type SvgNode = Box<dyn svg::Node>;

/// Applies stroke color, opacity, width and dash pattern to an SVG element.
///
/// Line widths and dash lengths are given in points and converted with the
/// backend scale.
macro_rules! apply_stroke {
    ($element:expr, $style:expr, $points_to_px:expr) => {{
        let style: &ResolvedStyle = $style;
        let mut elem = $element
            .set("stroke", style.color().to_string())
            .set("stroke-opacity", style.color().alpha())
            .set("stroke-width", style.lw() * $points_to_px)
            .set("stroke-linecap", "round")
            .set("stroke-linejoin", "round");

        if let Some(dasharray) = style.ls().dash_pattern() {
            elem = elem.set("stroke-dasharray", dasharray);
        }

        elem
    }};
}

/// Renders frames to SVG documents.
///
/// # Examples
///
/// ```
/// # use schemat::{Drawing, SvgBackend};
/// let drawing = Drawing::new();
/// let svg = drawing.render(&mut SvgBackend::new().with_scale(40.0).unwrap()).unwrap();
/// assert!(svg.starts_with("<svg"));
/// ```
#[derive(Debug, Clone)]
pub struct SvgBackend {
    scale: f32,
}

impl Default for SvgBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SvgBackend {
    pub fn new() -> Self {
        Self {
            scale: DEFAULT_SCALE,
        }
    }

    /// Sets the output scale in pixels per drawing unit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] unless the scale is positive and finite.
    pub fn with_scale(mut self, scale: f32) -> Result<Self, Error> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(Error::Render(format!(
                "scale must be positive, got {scale}"
            )));
        }
        self.scale = scale;
        Ok(self)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    fn points_to_px(&self) -> f32 {
        self.scale / POINTS_PER_UNIT
    }
}

impl Backend for SvgBackend {
    type Output = String;
    type Error = Error;

    fn render(&mut self, frame: &Frame) -> Result<String, Error> {
        let bounds = frame.bounds();
        if !(bounds.min_point().is_finite() && bounds.max_point().is_finite()) {
            return Err(Error::Render("drawing bounds are not finite".to_string()));
        }

        let canvas = Canvas {
            origin: Point::new(bounds.min_x(), bounds.max_y()),
            scale: self.scale,
            points_to_px: self.points_to_px(),
        };
        let width = bounds.width() * self.scale;
        let height = bounds.height() * self.scale;

        let mut document = Document::new()
            .set("viewBox", format!("0 0 {width} {height}"))
            .set("width", width)
            .set("height", height);

        if let Some(background) = frame.background() {
            let rect = svg_element::Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", width)
                .set("height", height)
                .set("fill", background.to_string())
                .set("fill-opacity", background.alpha());
            document = document.add(rect);
        }

        for group in canvas.render_groups(frame.segments()) {
            document = document.add(group);
        }

        debug!(width = width, height = height, segments = frame.segments().len(); "SVG document built");
        Ok(document.to_string())
    }
}

/// Maps drawing coordinates to SVG coordinates.
struct Canvas {
    /// Drawing-space point mapped to the SVG origin (top left)
    origin: Point,
    scale: f32,
    points_to_px: f32,
}

impl Canvas {
    fn map(&self, point: Point) -> (f32, f32) {
        (
            (point.x() - self.origin.x()) * self.scale,
            (self.origin.y() - point.y()) * self.scale,
        )
    }

    /// Groups consecutive segments with equal z-order.
    fn render_groups(&self, segments: &[RenderedSegment]) -> Vec<SvgNode> {
        let mut result = Vec::new();
        let Some(first) = segments.first() else {
            return result;
        };

        let mut current_zorder = first.zorder();
        let mut current_group = svg_element::Group::new().set("data-zorder", current_zorder);

        for segment in segments {
            if segment.zorder() != current_zorder {
                result.push(Box::new(current_group) as SvgNode);
                current_zorder = segment.zorder();
                current_group = svg_element::Group::new().set("data-zorder", current_zorder);
            }
            current_group = current_group.add(self.render_segment(segment));
        }
        result.push(Box::new(current_group) as SvgNode);

        result
    }

    fn render_segment(&self, segment: &RenderedSegment) -> SvgNode {
        let style = segment.style();
        trace!(kind:% = segment.kind(), zorder = segment.zorder(); "Rendering segment");
        match segment.primitive() {
            Primitive::Path(points) => {
                let path = svg_element::Path::new()
                    .set("d", self.polyline(points, false))
                    .set("fill", "none");
                Box::new(apply_stroke!(path, style, self.points_to_px))
            }
            Primitive::Polygon(points) => {
                let path = svg_element::Path::new().set("d", self.polyline(points, true));
                Box::new(apply_stroke!(self.fill(path, style), style, self.points_to_px))
            }
            Primitive::Circle { center, radius } => {
                let (cx, cy) = self.map(*center);
                let circle = svg_element::Circle::new()
                    .set("cx", cx)
                    .set("cy", cy)
                    .set("r", radius * self.scale);
                Box::new(apply_stroke!(self.fill(circle, style), style, self.points_to_px))
            }
            Primitive::Arc(arc) => {
                let path = svg_element::Path::new()
                    .set("d", self.arc(arc))
                    .set("fill", "none");
                Box::new(apply_stroke!(path, style, self.points_to_px))
            }
            Primitive::Bezier(points) => {
                let path = svg_element::Path::new()
                    .set("d", self.bezier(points))
                    .set("fill", "none");
                Box::new(apply_stroke!(path, style, self.points_to_px))
            }
            Primitive::Text(text) => Box::new(self.text(text, style)),
        }
    }

    fn fill<T>(&self, element: T, style: &ResolvedStyle) -> T
    where
        T: svg::Node + FillTarget,
    {
        match style.fill() {
            Some(fill) => element
                .set_fill(fill.to_string())
                .set_fill_opacity(fill.alpha()),
            None => element.set_fill("none".to_string()),
        }
    }

    fn polyline(&self, points: &[Point], close: bool) -> Data {
        let mut data = Data::new();
        for (index, point) in points.iter().enumerate() {
            let mapped = self.map(*point);
            data = if index == 0 {
                data.move_to(mapped)
            } else {
                data.line_to(mapped)
            };
        }
        if close { data.close() } else { data }
    }

    fn arc(&self, arc: &ArcGeometry) -> Data {
        let rx = arc.width() / 2.0 * self.scale;
        let ry = arc.height() / 2.0 * self.scale;
        // The y flip negates the axis rotation and turns a counter-clockwise
        // sweep into SVG's negative-angle direction (sweep flag 0)
        let rotation = -arc.angle();
        let sweep = arc.sweep();

        let data = Data::new().move_to(self.map(arc.start_point()));
        if sweep >= 360.0 {
            // A single arc command cannot close on itself
            let (hx, hy) = self.map(arc.point_at(arc.theta1() + 180.0));
            let (ex, ey) = self.map(arc.start_point());
            data.elliptical_arc_to((rx, ry, rotation, 0.0, 0.0, hx, hy))
                .elliptical_arc_to((rx, ry, rotation, 0.0, 0.0, ex, ey))
        } else {
            let large_arc = if sweep > 180.0 { 1.0 } else { 0.0 };
            let (ex, ey) = self.map(arc.end_point());
            data.elliptical_arc_to((rx, ry, rotation, large_arc, 0.0, ex, ey))
        }
    }

    fn bezier(&self, points: &[Point]) -> Data {
        let mapped: Vec<(f32, f32)> = points.iter().map(|point| self.map(*point)).collect();
        match mapped.as_slice() {
            [start, (x1, y1), (x, y)] => Data::new()
                .move_to(*start)
                .quadratic_curve_to((*x1, *y1, *x, *y)),
            [start, (x1, y1), (x2, y2), (x, y)] => Data::new()
                .move_to(*start)
                .cubic_curve_to((*x1, *y1, *x2, *y2, *x, *y)),
            // Segment construction rejects other control point counts
            _ => Data::new(),
        }
    }

    fn text(&self, text: &TextGeometry, style: &ResolvedStyle) -> svg_element::Text {
        let (x, y) = self.map(text.position());
        let anchor = match text.halign() {
            HAlign::Left => "start",
            HAlign::Center => "middle",
            HAlign::Right => "end",
        };
        let baseline = match text.valign() {
            VAlign::Top => "text-before-edge",
            VAlign::Center => "central",
            VAlign::Bottom => "text-after-edge",
        };

        let mut element = svg_element::Text::new(text.content())
            .set("x", x)
            .set("y", y)
            .set("font-family", style.font())
            .set("font-size", style.fontsize() * self.points_to_px)
            .set("text-anchor", anchor)
            .set("dominant-baseline", baseline)
            .set("fill", style.color().to_string())
            .set("fill-opacity", style.color().alpha());
        if text.rotation() != 0.0 {
            element = element.set("transform", format!("rotate({} {x} {y})", -text.rotation()));
        }
        element
    }
}

/// SVG elements that take a fill.
trait FillTarget: Sized {
    fn set_fill(self, fill: String) -> Self;
    fn set_fill_opacity(self, opacity: f32) -> Self;
}

macro_rules! impl_fill_target {
    ($($element:ty),*) => {
        $(impl FillTarget for $element {
            fn set_fill(self, fill: String) -> Self {
                self.set("fill", fill)
            }

            fn set_fill_opacity(self, opacity: f32) -> Self {
                self.set("fill-opacity", opacity)
            }
        })*
    };
}

impl_fill_target!(svg_element::Path, svg_element::Circle);
