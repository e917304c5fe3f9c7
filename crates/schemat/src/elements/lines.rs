//! Plain connections.

use schemat_core::{
    Result,
    element::{ElementDefinition, ElementKind},
    segment::Segment,
    style::{Fill, StyleAttrs},
};

use super::{ELEMENT_CLASS, TWO_TERMINAL_CLASS, points};

/// Arrowhead length in drawing units.
const HEAD_LENGTH: f32 = 0.3;
/// Arrowhead width in drawing units.
const HEAD_WIDTH: f32 = 0.2;

/// A straight wire. Its leads cover the whole length.
#[derive(Debug, Clone, Default)]
pub struct Line;

impl Line {
    pub fn new() -> Self {
        Self
    }
}

impl ElementDefinition for Line {
    fn name(&self) -> &str {
        "Line"
    }

    fn class_chain(&self) -> &[&'static str] {
        &["Line", TWO_TERMINAL_CLASS, ELEMENT_CLASS]
    }

    fn kind(&self) -> ElementKind {
        ElementKind::TwoTerminal
    }

    fn segments(&self) -> Result<Vec<Segment>> {
        Ok(Vec::new())
    }
}

/// A wire ending in a filled arrowhead.
///
/// The head keeps its shape when the arrow is flipped and moves to the start
/// when it is reversed.
#[derive(Debug, Clone)]
pub struct Arrow {
    head_length: f32,
    head_width: f32,
}

impl Default for Arrow {
    fn default() -> Self {
        Self {
            head_length: HEAD_LENGTH,
            head_width: HEAD_WIDTH,
        }
    }
}

impl Arrow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the arrowhead size in drawing units.
    pub fn with_head(mut self, length: f32, width: f32) -> Self {
        self.head_length = length;
        self.head_width = width;
        self
    }
}

impl ElementDefinition for Arrow {
    fn name(&self) -> &str {
        "Arrow"
    }

    fn class_chain(&self) -> &[&'static str] {
        &["Arrow", "Line", TWO_TERMINAL_CLASS, ELEMENT_CLASS]
    }

    fn kind(&self) -> ElementKind {
        ElementKind::TwoTerminal
    }

    fn segments(&self) -> Result<Vec<Segment>> {
        Ok(Vec::new())
    }

    fn end_caps(&self) -> Result<Vec<Segment>> {
        let half_width = self.head_width / 2.0;
        let head = Segment::polygon(points(&[
            (0.0, 0.0),
            (-self.head_length, half_width),
            (-self.head_length, -half_width),
        ]))?
        .with_style(StyleAttrs::new().with_fill(Fill::Stroke))
        .flip_exempt();
        Ok(vec![head])
    }
}
