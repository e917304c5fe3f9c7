//! Elements: named bags of segments and anchors, plus placement directives.
//!
//! An element definition ([`ElementDefinition`]) supplies local geometry only.
//! [`Element`] wraps that geometry with a fluent builder collecting placement
//! directives and style arguments; the directives are consulted together when
//! the element is placed on a [`Drawing`](crate::drawing::Drawing).
//!
//! # Lifecycle
//!
//! 1. constructed from a definition with local geometry
//! 2. configured through builder methods (consuming `self`)
//! 3. placed exactly once, after which its segments and anchors are absolute
//!
//! Only style may change after placement, through the `set_*` setters.

use std::fmt;

use indexmap::IndexMap;
use log::debug;

use crate::{
    color::Color,
    config::{DrawingConfig, GlobalConfig},
    drawing::ElementId,
    error::{Error, Result},
    geometry::{Bounds, Point},
    placement::{At, Direction, PlacedGeometry, Placement, Target},
    segment::Segment,
    style::{Fill, LineStyle, ResolvedStyle, StyleAttribute, StyleAttrs, StyleChain, StyleSource},
};

/// Default distance between a label and the element body.
pub const LABEL_OFFSET: f32 = 0.1;

/// Anchors every two-terminal element has once placed.
const TWO_TERMINAL_ANCHORS: [&str; 3] = ["start", "center", "end"];

/// The two element families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Arbitrary geometry that is never stretched
    Fixed,
    /// Geometry laid out along the positive x axis and stretched with leads
    /// to the required length
    TwoTerminal,
}

/// The generic interface every element type implements.
///
/// Segments and anchors are given in local coordinates. Two-terminal
/// elements draw their core along the positive x axis; the engine centers it
/// and adds `start`, `center` and `end` anchors.
pub trait ElementDefinition: fmt::Debug {
    /// Display name used in logs and error messages.
    fn name(&self) -> &str;

    /// Class names for default lookup, nearest first.
    fn class_chain(&self) -> &[&'static str];

    fn kind(&self) -> ElementKind;

    fn segments(&self) -> Result<Vec<Segment>>;

    fn anchors(&self) -> IndexMap<String, Point> {
        IndexMap::new()
    }

    /// Segments attached to the end of a two-terminal element, relative to
    /// the end point (arrowheads, for instance). They are not stretched and
    /// move to the start when the element is reversed.
    fn end_caps(&self) -> Result<Vec<Segment>> {
        Ok(Vec::new())
    }

    /// Defaults computed by the definition itself.
    fn defaults(&self) -> StyleAttrs {
        StyleAttrs::default()
    }

    /// Builds an [`Element`] from this definition.
    fn build(&self) -> Result<Element>
    where
        Self: Sized,
    {
        Element::new(self)
    }
}

/// Where a label sits relative to the element body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LabelLoc {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    text: String,
    loc: LabelLoc,
    offset: Option<f32>,
}

impl Label {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn loc(&self) -> LabelLoc {
        self.loc
    }

    pub fn offset(&self) -> Option<f32> {
        self.offset
    }
}

/// The lower levels of the style chain, captured when the element is placed.
///
/// Re-resolving a placed element's style (after a post-hoc setter call) uses
/// this capture, so later configuration changes never leak into it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleBase {
    classes: Vec<(String, StyleAttrs)>,
    drawing: StyleAttrs,
    global: StyleAttrs,
}

impl StyleBase {
    pub(crate) fn capture(classes: &[String], drawing: &DrawingConfig, global: &GlobalConfig) -> Self {
        Self {
            classes: classes
                .iter()
                .filter_map(|class| {
                    global
                        .class_defaults(class)
                        .map(|attrs| (class.clone(), attrs.clone()))
                })
                .collect(),
            drawing: drawing.style().clone(),
            global: global.style().clone(),
        }
    }
}

/// A diagram element.
///
/// # Examples
///
/// ```
/// # use schemat_core::element::{Element, ElementDefinition, ElementKind};
/// # use schemat_core::error::Result;
/// # use schemat_core::geometry::Point;
/// # use schemat_core::segment::Segment;
/// #[derive(Debug)]
/// struct Wire;
///
/// impl ElementDefinition for Wire {
///     fn name(&self) -> &str { "Wire" }
///     fn class_chain(&self) -> &[&'static str] { &["Wire", "Element2Term", "Element"] }
///     fn kind(&self) -> ElementKind { ElementKind::TwoTerminal }
///     fn segments(&self) -> Result<Vec<Segment>> {
///         Ok(vec![Segment::path(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)])?])
///     }
/// }
///
/// let wire = Wire.build().unwrap().up().length(2.0).label("w1");
/// assert!(!wire.is_placed());
/// ```
#[derive(Debug, Clone)]
pub struct Element {
    name: String,
    classes: Vec<String>,
    kind: ElementKind,
    segments: Vec<Segment>,
    end_caps: Vec<Segment>,
    anchors: IndexMap<String, Point>,
    defaults: StyleAttrs,
    args: StyleAttrs,
    setters: StyleAttrs,
    placement: Placement,
    labels: Vec<Label>,
    placed: Option<Placed>,
}

#[derive(Debug, Clone)]
struct Placed {
    geometry: PlacedGeometry,
    base: StyleBase,
    style: ResolvedStyle,
}

impl Element {
    /// Creates an unplaced element from a definition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedSegment`] if the definition's geometry is
    /// invalid, including anchors with non-finite coordinates.
    pub fn new(definition: &dyn ElementDefinition) -> Result<Self> {
        let segments = definition.segments()?;
        let end_caps = definition.end_caps()?;
        let anchors = definition.anchors();
        if let Some((name, _)) = anchors.iter().find(|(_, point)| !point.is_finite()) {
            return Err(Error::MalformedSegment(format!(
                "anchor `{name}` of `{}` is not finite",
                definition.name()
            )));
        }
        Ok(Self {
            name: definition.name().to_string(),
            classes: definition
                .class_chain()
                .iter()
                .map(|class| class.to_string())
                .collect(),
            kind: definition.kind(),
            segments,
            end_caps,
            anchors,
            defaults: definition.defaults(),
            args: StyleAttrs::default(),
            setters: StyleAttrs::default(),
            placement: Placement::default(),
            labels: Vec::new(),
            placed: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Class chain, nearest first.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn local_segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn end_caps(&self) -> &[Segment] {
        &self.end_caps
    }

    pub fn local_anchors(&self) -> &IndexMap<String, Point> {
        &self.anchors
    }

    pub fn is_placed(&self) -> bool {
        self.placed.is_some()
    }

    /// Absolute geometry, once placed.
    pub fn geometry(&self) -> Option<&PlacedGeometry> {
        self.placed.as_ref().map(|placed| &placed.geometry)
    }

    /// Absolute segments, empty until placed.
    pub fn segments(&self) -> &[Segment] {
        self.geometry()
            .map(PlacedGeometry::segments)
            .unwrap_or_default()
    }

    /// Resolved style, once placed.
    pub fn style(&self) -> Option<&ResolvedStyle> {
        self.placed.as_ref().map(|placed| &placed.style)
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.geometry().map(PlacedGeometry::bounds)
    }

    /// Whether the element has (or will have, once placed) an anchor named `name`.
    pub fn has_anchor(&self, name: &str) -> bool {
        self.anchors.contains_key(name)
            || (self.kind == ElementKind::TwoTerminal && TWO_TERMINAL_ANCHORS.contains(&name))
    }

    /// Absolute position of an anchor.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownAnchor`] if the element defines no such anchor
    /// - [`Error::UnplacedElement`] if the element has not been placed yet
    pub fn absolute_anchor(&self, name: &str) -> Result<Point> {
        if !self.has_anchor(name) {
            return Err(self.unknown_anchor(name));
        }
        let geometry = self.geometry().ok_or_else(|| Error::UnplacedElement {
            element: self.name.clone(),
        })?;
        geometry
            .anchors()
            .get(name)
            .copied()
            .ok_or_else(|| self.unknown_anchor(name))
    }

    /// Local position of an anchor defined by the element definition.
    pub fn local_anchor(&self, name: &str) -> Result<Point> {
        self.anchors
            .get(name)
            .copied()
            .ok_or_else(|| self.unknown_anchor(name))
    }

    pub fn start(&self) -> Result<Point> {
        self.absolute_anchor("start")
    }

    pub fn end(&self) -> Result<Point> {
        self.absolute_anchor("end")
    }

    fn unknown_anchor(&self, name: &str) -> Error {
        Error::UnknownAnchor {
            element: self.name.clone(),
            anchor: name.to_string(),
        }
    }

    // -------------------------------------------------------------------------
    // Placement directives
    // -------------------------------------------------------------------------

    /// Starts the element at an absolute position.
    pub fn at(mut self, point: impl Into<Point>) -> Self {
        self.placement.at = Some(At::Point(point.into()));
        self
    }

    /// Starts the element at a named anchor of an already placed element.
    pub fn at_anchor(mut self, element: ElementId, anchor: &str) -> Self {
        self.placement.at = Some(At::Anchor(element, anchor.to_string()));
        self
    }

    /// Ends a two-terminal element at `point`.
    pub fn to(mut self, point: impl Into<Point>) -> Self {
        self.placement.to = Some(Target::Point(point.into()));
        self
    }

    /// Ends a two-terminal element at x coordinate `x`.
    pub fn tox(mut self, x: f32) -> Self {
        self.placement.to = Some(Target::X(x));
        self
    }

    /// Ends a two-terminal element at y coordinate `y`.
    pub fn toy(mut self, y: f32) -> Self {
        self.placement.to = Some(Target::Y(y));
        self
    }

    /// Places a two-terminal element between two points.
    pub fn endpoints(mut self, start: impl Into<Point>, end: impl Into<Point>) -> Self {
        self.placement.endpoints = Some((start.into(), end.into()));
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.placement.direction = Some(direction);
        self
    }

    pub fn up(self) -> Self {
        self.direction(Direction::Up)
    }

    pub fn down(self) -> Self {
        self.direction(Direction::Down)
    }

    pub fn left(self) -> Self {
        self.direction(Direction::Left)
    }

    pub fn right(self) -> Self {
        self.direction(Direction::Right)
    }

    /// Sets the heading in degrees; takes precedence over a direction.
    pub fn theta(mut self, theta: f32) -> Self {
        self.placement.theta = Some(theta);
        self
    }

    /// Sets the total length of a two-terminal element.
    ///
    /// Placement fails with [`Error::InvalidValue`] unless the length is a
    /// positive finite number.
    pub fn length(mut self, length: f32) -> Self {
        self.placement.length = Some(length);
        self
    }

    /// Aligns the named anchor, instead of the local origin, with the start position.
    pub fn anchor(mut self, anchor: &str) -> Self {
        self.placement.anchor = Some(anchor.to_string());
        self
    }

    /// Leaves the cursor at the named anchor after placement.
    pub fn drop(mut self, anchor: &str) -> Self {
        self.placement.drop = Some(anchor.to_string());
        self
    }

    /// Leaves the cursor untouched after placement.
    pub fn hold(mut self) -> Self {
        self.placement.hold = true;
        self
    }

    /// Toggles mirroring across the local horizontal axis.
    pub fn flip(mut self) -> Self {
        self.placement.flip = !self.placement.flip;
        self
    }

    /// Toggles mirroring along the local main axis.
    pub fn reverse(mut self) -> Self {
        self.placement.reverse = !self.placement.reverse;
        self
    }

    pub fn scale(mut self, factor: f32) -> Self {
        self.placement.zoom = (factor, factor);
        self
    }

    pub fn scalex(mut self, factor: f32) -> Self {
        self.placement.zoom.0 = factor;
        self
    }

    pub fn scaley(mut self, factor: f32) -> Self {
        self.placement.zoom.1 = factor;
        self
    }

    /// Adds a label above the element.
    pub fn label(self, text: &str) -> Self {
        self.label_at(text, LabelLoc::Top, LABEL_OFFSET)
    }

    pub fn label_at(mut self, text: &str, loc: LabelLoc, offset: f32) -> Self {
        self.labels.push(Label {
            text: text.to_string(),
            loc,
            offset: Some(offset),
        });
        self
    }

    // -------------------------------------------------------------------------
    // Style arguments
    // -------------------------------------------------------------------------

    pub fn color(mut self, color: Color) -> Self {
        self.args.set_color(color);
        self
    }

    pub fn fill(mut self, fill: impl Into<Fill>) -> Self {
        self.args.set_fill(fill);
        self
    }

    pub fn lw(mut self, lw: f32) -> Result<Self> {
        self.args.set_lw(lw)?;
        Ok(self)
    }

    pub fn ls(mut self, ls: LineStyle) -> Self {
        self.args.set_ls(ls);
        self
    }

    pub fn zorder(mut self, zorder: i32) -> Self {
        self.args.set_zorder(zorder);
        self
    }

    pub fn font(mut self, font: &str) -> Self {
        self.args.set_font(font);
        self
    }

    pub fn fontsize(mut self, fontsize: f32) -> Result<Self> {
        self.args.set_fontsize(fontsize)?;
        Ok(self)
    }

    // -------------------------------------------------------------------------
    // Setters
    // -------------------------------------------------------------------------

    pub fn set_color(&mut self, color: Color) {
        self.setters.set_color(color);
        self.restyle();
    }

    pub fn set_fill(&mut self, fill: impl Into<Fill>) {
        self.setters.set_fill(fill);
        self.restyle();
    }

    pub fn set_lw(&mut self, lw: f32) -> Result<()> {
        self.setters.set_lw(lw)?;
        self.restyle();
        Ok(())
    }

    pub fn set_ls(&mut self, ls: LineStyle) {
        self.setters.set_ls(ls);
        self.restyle();
    }

    pub fn set_zorder(&mut self, zorder: i32) {
        self.setters.set_zorder(zorder);
        self.restyle();
    }

    pub fn set_font(&mut self, font: &str) {
        self.setters.set_font(font);
        self.restyle();
    }

    pub fn set_fontsize(&mut self, fontsize: f32) -> Result<()> {
        self.setters.set_fontsize(fontsize)?;
        self.restyle();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Style resolution
    // -------------------------------------------------------------------------

    fn style_chain<'a>(&'a self, base: &'a StyleBase) -> StyleChain<'a> {
        let mut chain = StyleChain::new()
            .with_layer(StyleSource::Setter, &self.setters)
            .with_layer(StyleSource::Argument, &self.args);
        for (class, attrs) in &base.classes {
            chain.push(StyleSource::ClassDefault(class.clone()), attrs);
        }
        chain
            .with_layer(StyleSource::Element, &self.defaults)
            .with_layer(StyleSource::Drawing, &base.drawing)
            .with_layer(StyleSource::Global, &base.global)
    }

    /// Resolves the style against configuration captured now.
    pub(crate) fn resolve_style(&self, base: &StyleBase) -> ResolvedStyle {
        self.style_chain(base).resolve()
    }

    /// Names the level of the precedence chain an attribute was resolved from.
    ///
    /// Returns `None` until the element is placed.
    pub fn style_source(&self, attribute: StyleAttribute) -> Option<StyleSource> {
        self.placed
            .as_ref()
            .map(|placed| self.style_chain(&placed.base).source_of(attribute))
    }

    fn restyle(&mut self) {
        let Some(placed) = &self.placed else {
            return;
        };
        let style = self.resolve_style(&placed.base);
        debug!(element = self.name.as_str(); "Re-resolved style of placed element");
        if let Some(placed) = self.placed.as_mut() {
            placed.style = style;
        }
    }

    pub(crate) fn mark_placed(&mut self, geometry: PlacedGeometry, base: StyleBase, style: ResolvedStyle) {
        self.placed = Some(Placed {
            geometry,
            base,
            style,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Probe;

    impl ElementDefinition for Probe {
        fn name(&self) -> &str {
            "Probe"
        }

        fn class_chain(&self) -> &[&'static str] {
            &["Probe", "Element"]
        }

        fn kind(&self) -> ElementKind {
            ElementKind::Fixed
        }

        fn segments(&self) -> Result<Vec<Segment>> {
            Ok(vec![Segment::circle(Point::default(), 0.5)?])
        }

        fn anchors(&self) -> IndexMap<String, Point> {
            IndexMap::from([("tip".to_string(), Point::new(0.5, 0.0))])
        }
    }

    #[derive(Debug)]
    struct Broken;

    impl ElementDefinition for Broken {
        fn name(&self) -> &str {
            "Broken"
        }

        fn class_chain(&self) -> &[&'static str] {
            &["Broken"]
        }

        fn kind(&self) -> ElementKind {
            ElementKind::Fixed
        }

        fn segments(&self) -> Result<Vec<Segment>> {
            Ok(vec![Segment::polygon(vec![Point::default(), Point::new(1.0, 1.0)])?])
        }
    }

    #[test]
    fn test_malformed_definition_is_rejected() {
        let err = Broken.build().unwrap_err();
        assert!(matches!(err, Error::MalformedSegment(_)));
    }

    #[test]
    fn test_flip_and_reverse_toggle() {
        let element = Probe.build().unwrap().flip().flip().reverse();
        assert!(!element.placement().is_flipped());
        assert!(element.placement().is_reversed());
    }

    #[test]
    fn test_scale_directives() {
        let element = Probe.build().unwrap().scale(2.0).scaley(0.5);
        assert_eq!(element.placement().zoom, (2.0, 0.5));
    }

    #[test]
    fn test_style_arguments_are_validated() {
        assert!(matches!(
            Probe.build().unwrap().lw(-1.0),
            Err(Error::InvalidValue(_))
        ));
        assert!(Probe.build().unwrap().fontsize(f32::INFINITY).is_err());
    }

    #[test]
    fn test_unplaced_anchor_lookup() {
        let element = Probe.build().unwrap();
        assert_eq!(element.local_anchor("tip").unwrap(), Point::new(0.5, 0.0));
        assert!(matches!(
            element.absolute_anchor("tip"),
            Err(Error::UnplacedElement { .. })
        ));
        assert!(matches!(
            element.absolute_anchor("nope"),
            Err(Error::UnknownAnchor { .. })
        ));
        assert!(element.style_source(StyleAttribute::Color).is_none());
    }

    #[test]
    fn test_style_chain_order() {
        let mut element = Probe
            .build()
            .unwrap()
            .color(Color::new("blue").unwrap())
            .zorder(3);
        element.set_color(Color::new("red").unwrap());

        let base = StyleBase {
            classes: vec![(
                "Probe".to_string(),
                StyleAttrs::new()
                    .with_color(Color::new("green").unwrap())
                    .with_lw(4.0)
                    .unwrap(),
            )],
            drawing: StyleAttrs::new().with_font("serif"),
            global: StyleAttrs::new().with_font("monospace").with_zorder(9),
        };
        let style = element.resolve_style(&base);
        assert_eq!(style.color(), Color::new("red").unwrap());
        assert_eq!(style.zorder(), 3);
        assert_eq!(style.lw(), 4.0);
        assert_eq!(style.font(), "serif");
    }
}
