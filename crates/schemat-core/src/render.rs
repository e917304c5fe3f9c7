//! The backend contract.
//!
//! A finalized drawing is handed to a backend as a [`Frame`]: padded bounds,
//! an optional background color, and every placed segment in absolute
//! coordinates with its resolved style. Segments are ordered by z-order
//! (bottom first); segments with equal z-order keep insertion order.
//!
//! The core makes no assumption about which backend is used; implement
//! [`Backend`] to produce any output format.

use crate::{
    color::Color,
    geometry::{Bounds, Point},
    segment::{Primitive, PrimitiveKind, Segment, TextGeometry},
    style::ResolvedStyle,
};

/// A placed segment ready for output.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSegment {
    primitive: Primitive,
    style: ResolvedStyle,
}

impl RenderedSegment {
    /// Combines an absolute segment with its element's style; the segment's
    /// own overrides win.
    pub fn new(segment: &Segment, element_style: &ResolvedStyle) -> Self {
        Self {
            primitive: segment.primitive().clone(),
            style: element_style.overridden_by(segment.style()),
        }
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.primitive.kind()
    }

    pub fn primitive(&self) -> &Primitive {
        &self.primitive
    }

    /// Absolute coordinates, see [`Primitive::points`].
    pub fn points(&self) -> Vec<Point> {
        self.primitive.points()
    }

    pub fn style(&self) -> &ResolvedStyle {
        &self.style
    }

    pub fn zorder(&self) -> i32 {
        self.style.zorder()
    }

    /// Text content, rotation and alignment for text segments.
    pub fn text(&self) -> Option<&TextGeometry> {
        match &self.primitive {
            Primitive::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Everything a backend needs to draw a finalized drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    bounds: Bounds,
    background: Option<Color>,
    segments: Vec<RenderedSegment>,
}

impl Frame {
    pub fn new(bounds: Bounds, background: Option<Color>, segments: Vec<RenderedSegment>) -> Self {
        Self {
            bounds,
            background,
            segments,
        }
    }

    /// Drawing bounds including the margin.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    /// Segments in drawing order.
    pub fn segments(&self) -> &[RenderedSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// An output format for finalized drawings.
pub trait Backend {
    type Output;
    type Error;

    fn render(&mut self, frame: &Frame) -> Result<Self::Output, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StyleAttrs;

    #[test]
    fn test_segment_overrides_win() {
        let segment = Segment::circle(Point::default(), 1.0)
            .unwrap()
            .with_style(StyleAttrs::new().with_zorder(7));
        let rendered = RenderedSegment::new(&segment, &ResolvedStyle::default());
        assert_eq!(rendered.zorder(), 7);
        assert_eq!(rendered.kind(), PrimitiveKind::Circle);
        assert!(rendered.text().is_none());
    }

    #[derive(Default)]
    struct Counter;

    impl Backend for Counter {
        type Output = usize;
        type Error = std::convert::Infallible;

        fn render(&mut self, frame: &Frame) -> Result<usize, Self::Error> {
            Ok(frame.segments().len())
        }
    }

    #[test]
    fn test_backend_receives_frame() {
        let segment = Segment::path(vec![Point::default(), Point::new(1.0, 0.0)]).unwrap();
        let frame = Frame::new(
            Bounds::default(),
            None,
            vec![RenderedSegment::new(&segment, &ResolvedStyle::default())],
        );
        assert_eq!(Counter.render(&frame), Ok(1));
    }
}
