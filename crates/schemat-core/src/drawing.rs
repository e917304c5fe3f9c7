//! The drawing state machine.
//!
//! A [`Drawing`] owns the cursor, the save/restore stack, the ordered list of
//! elements, and the running bounding box. Elements are registered explicitly:
//! [`Drawing::add`] places an element immediately, while [`Drawing::stage`]
//! reserves an id for an element that is placed later with
//! [`Drawing::place`].
//!
//! # Example
//!
//! ```
//! # use schemat_core::drawing::Drawing;
//! # use schemat_core::element::{ElementDefinition, ElementKind};
//! # use schemat_core::error::Result;
//! # use schemat_core::geometry::Point;
//! # use schemat_core::segment::Segment;
//! # #[derive(Debug)]
//! # struct Wire;
//! # impl ElementDefinition for Wire {
//! #     fn name(&self) -> &str { "Wire" }
//! #     fn class_chain(&self) -> &[&'static str] { &["Wire"] }
//! #     fn kind(&self) -> ElementKind { ElementKind::TwoTerminal }
//! #     fn segments(&self) -> Result<Vec<Segment>> {
//! #         Ok(vec![Segment::path(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)])?])
//! #     }
//! # }
//! let mut drawing = Drawing::new();
//! let first = drawing.add(Wire.build()?.right())?;
//! drawing.add(Wire.build()?.up())?;
//!
//! let unit = drawing.unit();
//! assert_eq!(drawing.anchor(first, "end")?, Point::new(unit, 0.0));
//! assert_eq!(drawing.here(), Point::new(unit, unit));
//! # Ok::<(), schemat_core::error::Error>(())
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use log::{debug, info};

use crate::{
    color::Color,
    config::{DrawingConfig, GlobalConfig, global_config},
    element::{Element, StyleBase},
    error::{Error, Result},
    geometry::{Bounds, Point},
    placement::{self, Cursor, PlacementContext},
    render::{Backend, Frame, RenderedSegment},
};

static NEXT_DRAWING_ID: AtomicU64 = AtomicU64::new(0);

/// Identifies an element within the drawing that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId {
    drawing: u64,
    index: usize,
}

impl ElementId {
    /// Position of the element in insertion order.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// A diagram under construction.
#[derive(Debug)]
pub struct Drawing {
    id: u64,
    config: DrawingConfig,
    global: Option<Arc<GlobalConfig>>,
    cursor: Cursor,
    stack: Vec<Cursor>,
    elements: Vec<Element>,
    bounds: Option<Bounds>,
}

impl Default for Drawing {
    fn default() -> Self {
        Self::new()
    }
}

impl Drawing {
    /// Creates an empty drawing with the cursor at the origin, heading right.
    pub fn new() -> Self {
        Self::with_config(DrawingConfig::default())
    }

    pub fn with_config(config: DrawingConfig) -> Self {
        Self {
            id: NEXT_DRAWING_ID.fetch_add(1, Ordering::Relaxed),
            config,
            global: None,
            cursor: Cursor::default(),
            stack: Vec::new(),
            elements: Vec::new(),
            bounds: None,
        }
    }

    /// Pins the global configuration this drawing resolves against.
    ///
    /// By default every placement reads the current process-wide snapshot.
    pub fn with_global_config(mut self, global: Arc<GlobalConfig>) -> Self {
        self.global = Some(global);
        self
    }

    pub fn config(&self) -> &DrawingConfig {
        &self.config
    }

    fn global(&self) -> Arc<GlobalConfig> {
        self.global.clone().unwrap_or_else(global_config)
    }

    /// Current cursor position.
    pub fn here(&self) -> Point {
        self.cursor.position()
    }

    /// Current cursor heading in degrees.
    pub fn theta(&self) -> f32 {
        self.cursor.theta()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Default two-terminal element length.
    pub fn unit(&self) -> f32 {
        self.config.unit().unwrap_or_else(|| self.global().unit())
    }

    pub fn margin(&self) -> f32 {
        self.config.margin().unwrap_or_else(|| self.global().margin())
    }

    pub fn background(&self) -> Option<Color> {
        self.config.background().or_else(|| self.global().background())
    }

    /// Moves the cursor relative to its current position.
    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.cursor.set_position(self.cursor.position().translate(dx, dy));
    }

    pub fn move_to(&mut self, point: impl Into<Point>) {
        self.cursor.set_position(point.into());
    }

    /// Moves the cursor to an anchor of a placed element, plus an offset.
    pub fn move_from(&mut self, id: ElementId, anchor: &str, dx: f32, dy: f32) -> Result<()> {
        let position = self.anchor(id, anchor)?;
        self.cursor.set_position(position.translate(dx, dy));
        Ok(())
    }

    pub fn set_theta(&mut self, theta: f32) {
        self.cursor.set_theta(theta);
    }

    /// Saves the cursor position and heading.
    pub fn push(&mut self) {
        self.stack.push(self.cursor);
    }

    /// Restores the most recently saved cursor state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyStateStack`] if nothing was pushed.
    pub fn pop(&mut self) -> Result<()> {
        self.cursor = self.stack.pop().ok_or(Error::EmptyStateStack)?;
        Ok(())
    }

    /// Runs `build` with the cursor state saved, restoring it afterwards.
    ///
    /// The cursor and the state stack are restored even if `build` fails.
    pub fn scoped<T>(&mut self, build: impl FnOnce(&mut Drawing) -> Result<T>) -> Result<T> {
        let saved = self.cursor;
        let depth = self.stack.len();
        let result = build(self);
        self.stack.truncate(depth);
        self.cursor = saved;
        result
    }

    /// Registers an element without placing it.
    ///
    /// The returned id can already be referenced by other elements, but its
    /// anchors are unavailable until [`Drawing::place`] is called.
    pub fn stage(&mut self, element: Element) -> ElementId {
        let id = ElementId {
            drawing: self.id,
            index: self.elements.len(),
        };
        debug!(element = element.name(), index = id.index; "Element staged");
        self.elements.push(element);
        id
    }

    /// Places a staged element.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownElement`] for an id from another drawing
    /// - [`Error::AlreadyPlaced`] if the element was placed before
    /// - any error raised by the placement engine
    pub fn place(&mut self, id: ElementId) -> Result<()> {
        let index = self.index_of(id)?;
        let element = &self.elements[index];
        if element.is_placed() {
            return Err(Error::AlreadyPlaced {
                element: element.name().to_string(),
            });
        }

        let global = self.global();
        let base = StyleBase::capture(element.classes(), &self.config, &global);
        let style = element.resolve_style(&base);
        let unit = self.config.unit().unwrap_or(global.unit());

        let lookup = |id: ElementId, anchor: &str| self.anchor(id, anchor);
        let context = PlacementContext {
            cursor: self.cursor,
            unit,
            style: &style,
            anchor_lookup: &lookup,
        };
        let outcome = placement::place(element, &context)?;

        let bounds = outcome.geometry.bounds();
        self.bounds = Some(match self.bounds {
            Some(current) => current.merge(&bounds),
            None => bounds,
        });
        self.cursor = outcome.cursor;
        self.elements[index].mark_placed(outcome.geometry, base, style);
        Ok(())
    }

    /// Registers and places an element.
    ///
    /// On failure the element is not kept.
    pub fn add(&mut self, element: Element) -> Result<ElementId> {
        let id = self.stage(element);
        if let Err(err) = self.place(id) {
            self.elements.pop();
            return Err(err);
        }
        Ok(id)
    }

    fn index_of(&self, id: ElementId) -> Result<usize> {
        if id.drawing != self.id || id.index >= self.elements.len() {
            return Err(Error::UnknownElement);
        }
        Ok(id.index)
    }

    pub fn element(&self, id: ElementId) -> Result<&Element> {
        let index = self.index_of(id)?;
        Ok(&self.elements[index])
    }

    /// Mutable access for post-hoc style edits.
    pub fn element_mut(&mut self, id: ElementId) -> Result<&mut Element> {
        let index = self.index_of(id)?;
        Ok(&mut self.elements[index])
    }

    /// Absolute position of an element's anchor.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownElement`] for an id from another drawing
    /// - [`Error::UnknownAnchor`] if the element has no such anchor
    /// - [`Error::UnplacedElement`] if the element is staged but not placed
    pub fn anchor(&self, id: ElementId, name: &str) -> Result<Point> {
        self.element(id)?.absolute_anchor(name)
    }

    /// Union of the bounds of all placed elements, `None` while empty.
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Placed elements in insertion order.
    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, element)| element.is_placed())
            .map(|(index, element)| {
                (
                    ElementId {
                        drawing: self.id,
                        index,
                    },
                    element,
                )
            })
    }

    /// Snapshot of everything a backend needs.
    ///
    /// Segments are ordered by z-order; equal z-orders keep insertion order.
    /// The bounds are padded by the configured margin.
    pub fn frame(&self) -> Frame {
        let mut segments: Vec<RenderedSegment> = self
            .elements()
            .filter_map(|(_, element)| element.style().map(|style| (element, style)))
            .flat_map(|(element, style)| {
                element
                    .segments()
                    .iter()
                    .map(move |segment| RenderedSegment::new(segment, style))
            })
            .collect();
        segments.sort_by_key(RenderedSegment::zorder);

        let bounds = self
            .bounds
            .map(|bounds| bounds.add_margin(self.margin()))
            .unwrap_or_default();

        Frame::new(bounds, self.background(), segments)
    }

    /// Finalizes the drawing and hands the frame to a backend.
    pub fn render<B: Backend>(&self, backend: &mut B) -> Result<B::Output, B::Error> {
        let frame = self.frame();
        info!(
            segments = frame.segments().len(),
            width = frame.bounds().width(),
            height = frame.bounds().height();
            "Rendering drawing"
        );
        backend.render(&frame)
    }
}
