//! Flowchart boxes.

use indexmap::IndexMap;
use schemat_core::{
    Result,
    element::{ElementDefinition, ElementKind},
    geometry::Point,
    segment::{Segment, TextGeometry},
};

use super::{ELEMENT_CLASS, anchor_map, points};

/// A rectangular flowchart box with centered text.
///
/// The box is entered on its west side, which sits on the cursor, and the
/// cursor continues from its east side. Compass anchors (`N`, `NE`, `E`, ...)
/// mark the sides and corners.
#[derive(Debug, Clone)]
pub struct FlowBox {
    text: String,
    width: f32,
    height: f32,
}

impl FlowBox {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            width: 3.0,
            height: 2.0,
        }
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

impl ElementDefinition for FlowBox {
    fn name(&self) -> &str {
        "FlowBox"
    }

    fn class_chain(&self) -> &[&'static str] {
        &["FlowBox", ELEMENT_CLASS]
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Fixed
    }

    fn segments(&self) -> Result<Vec<Segment>> {
        let (w, h) = (self.width, self.height / 2.0);
        let mut segments = vec![Segment::polygon(points(&[
            (0.0, h),
            (w, h),
            (w, -h),
            (0.0, -h),
        ]))?];
        if !self.text.is_empty() {
            segments.push(Segment::text(TextGeometry::new(
                Point::new(w / 2.0, 0.0),
                &self.text,
            ))?);
        }
        Ok(segments)
    }

    fn anchors(&self) -> IndexMap<String, Point> {
        let (w, h) = (self.width, self.height / 2.0);
        anchor_map([
            ("center", (w / 2.0, 0.0)),
            ("N", (w / 2.0, h)),
            ("S", (w / 2.0, -h)),
            ("E", (w, 0.0)),
            ("W", (0.0, 0.0)),
            ("NE", (w, h)),
            ("NW", (0.0, h)),
            ("SE", (w, -h)),
            ("SW", (0.0, -h)),
            ("start", (0.0, 0.0)),
            ("end", (w, 0.0)),
        ])
    }
}
