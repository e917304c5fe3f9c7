//! Logic gates.

use indexmap::IndexMap;
use schemat_core::{
    Result,
    element::{ElementDefinition, ElementKind},
    geometry::Point,
    segment::{ArcGeometry, Segment},
};

use super::{ELEMENT_CLASS, points};

/// Gate body height in drawing units.
const GATE_HEIGHT: f32 = 1.0;
/// Length of the input and output leads.
const LEAD: f32 = 0.35;
/// Radius of the inversion bubble.
const BUBBLE_RADIUS: f32 = 0.09;

/// An AND gate (or NAND when inverted).
///
/// The body's flat back sits at the cursor; inputs are anchored as `in1`,
/// `in2`, ... from top to bottom and the output as `out`, which is also where
/// the cursor continues.
#[derive(Debug, Clone)]
pub struct AndGate {
    inputs: usize,
    inverted: bool,
}

impl Default for AndGate {
    fn default() -> Self {
        Self {
            inputs: 2,
            inverted: false,
        }
    }
}

impl AndGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of inputs; at least two.
    pub fn with_inputs(mut self, inputs: usize) -> Self {
        self.inputs = inputs.max(2);
        self
    }

    /// Adds an inversion bubble on the output.
    pub fn inverted(mut self) -> Self {
        self.inverted = true;
        self
    }

    fn input_y(&self, index: usize) -> f32 {
        GATE_HEIGHT / 2.0 - GATE_HEIGHT * (index + 1) as f32 / (self.inputs + 1) as f32
    }

    /// X coordinate where the output lead starts.
    fn output_x(&self) -> f32 {
        let tip = GATE_HEIGHT;
        if self.inverted {
            tip + 2.0 * BUBBLE_RADIUS
        } else {
            tip
        }
    }
}

impl ElementDefinition for AndGate {
    fn name(&self) -> &str {
        if self.inverted { "NandGate" } else { "AndGate" }
    }

    fn class_chain(&self) -> &[&'static str] {
        &["AndGate", "LogicGate", ELEMENT_CLASS]
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Fixed
    }

    fn segments(&self) -> Result<Vec<Segment>> {
        let half = GATE_HEIGHT / 2.0;
        let mut segments = vec![
            Segment::path(points(&[(half, half), (0.0, half), (0.0, -half), (half, -half)]))?,
            Segment::arc(ArcGeometry::new(
                Point::new(half, 0.0),
                GATE_HEIGHT,
                GATE_HEIGHT,
                -90.0,
                90.0,
            ))?,
        ];

        for index in 0..self.inputs {
            let y = self.input_y(index);
            segments.push(Segment::path(points(&[(-LEAD, y), (0.0, y)]))?);
        }

        if self.inverted {
            segments.push(Segment::circle(
                Point::new(GATE_HEIGHT + BUBBLE_RADIUS, 0.0),
                BUBBLE_RADIUS,
            )?);
        }
        let out = self.output_x();
        segments.push(Segment::path(points(&[(out, 0.0), (out + LEAD, 0.0)]))?);
        Ok(segments)
    }

    fn anchors(&self) -> IndexMap<String, Point> {
        let mut anchors: IndexMap<String, Point> = (0..self.inputs)
            .map(|index| (format!("in{}", index + 1), Point::new(-LEAD, self.input_y(index))))
            .collect();
        let out = Point::new(self.output_x() + LEAD, 0.0);
        anchors.insert("out".to_string(), out);
        anchors.insert("center".to_string(), Point::new(GATE_HEIGHT / 2.0, 0.0));
        anchors.insert("end".to_string(), out);
        anchors
    }
}
