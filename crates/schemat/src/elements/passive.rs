//! Two-terminal circuit components.

use indexmap::IndexMap;
use schemat_core::{
    Result,
    element::{ElementDefinition, ElementKind},
    geometry::Point,
    segment::{ArcGeometry, HAlign, Segment, TextGeometry, VAlign},
    style::{Fill, StyleAttrs},
};

use super::{ELEMENT_CLASS, TWO_TERMINAL_CLASS, anchor_map, points};

/// Core width shared by the resistor and inductor.
const CORE_WIDTH: f32 = 1.0;

/// A zigzag resistor.
#[derive(Debug, Clone)]
pub struct Resistor {
    /// Peak-to-centerline height of the zigzag
    height: f32,
    /// Number of zigzag peaks
    peaks: usize,
}

impl Default for Resistor {
    fn default() -> Self {
        Self {
            height: 0.25,
            peaks: 6,
        }
    }
}

impl Resistor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_peaks(mut self, peaks: usize) -> Self {
        self.peaks = peaks;
        self
    }
}

impl ElementDefinition for Resistor {
    fn name(&self) -> &str {
        "Resistor"
    }

    fn class_chain(&self) -> &[&'static str] {
        &["Resistor", TWO_TERMINAL_CLASS, ELEMENT_CLASS]
    }

    fn kind(&self) -> ElementKind {
        ElementKind::TwoTerminal
    }

    fn segments(&self) -> Result<Vec<Segment>> {
        let step = CORE_WIDTH / (2 * self.peaks) as f32;
        let mut zigzag = Vec::with_capacity(self.peaks + 2);
        zigzag.push(Point::default());
        for peak in 0..self.peaks {
            let sign = if peak % 2 == 0 { 1.0 } else { -1.0 };
            zigzag.push(Point::new(step * (2 * peak + 1) as f32, sign * self.height));
        }
        zigzag.push(Point::new(CORE_WIDTH, 0.0));
        Ok(vec![Segment::path(zigzag)?])
    }
}

/// A capacitor: two parallel plates, optionally polarized.
#[derive(Debug, Clone)]
pub struct Capacitor {
    gap: f32,
    plate_height: f32,
    polar: bool,
}

impl Default for Capacitor {
    fn default() -> Self {
        Self {
            gap: 0.18,
            plate_height: 0.6,
            polar: false,
        }
    }
}

impl Capacitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the start plate with a `+` sign.
    pub fn polar(mut self) -> Self {
        self.polar = true;
        self
    }
}

impl ElementDefinition for Capacitor {
    fn name(&self) -> &str {
        "Capacitor"
    }

    fn class_chain(&self) -> &[&'static str] {
        &["Capacitor", TWO_TERMINAL_CLASS, ELEMENT_CLASS]
    }

    fn kind(&self) -> ElementKind {
        ElementKind::TwoTerminal
    }

    fn segments(&self) -> Result<Vec<Segment>> {
        let half = self.plate_height / 2.0;
        let mut segments = vec![
            Segment::path(points(&[(0.0, half), (0.0, -half)]))?,
            Segment::path(points(&[(self.gap, half), (self.gap, -half)]))?,
        ];
        if self.polar {
            let sign = TextGeometry::new(Point::new(-0.1, half), "+")
                .with_align(HAlign::Right, VAlign::Bottom);
            segments.push(Segment::text(sign)?);
        }
        Ok(segments)
    }

    fn anchors(&self) -> IndexMap<String, Point> {
        anchor_map([
            ("plate1", (0.0, 0.0)),
            ("plate2", (self.gap, 0.0)),
        ])
    }
}

/// An inductor drawn as a row of half loops.
#[derive(Debug, Clone)]
pub struct Inductor {
    loops: usize,
}

impl Default for Inductor {
    fn default() -> Self {
        Self { loops: 4 }
    }
}

impl Inductor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of loops; at least one is drawn.
    pub fn with_loops(mut self, loops: usize) -> Self {
        self.loops = loops.max(1);
        self
    }
}

impl ElementDefinition for Inductor {
    fn name(&self) -> &str {
        "Inductor"
    }

    fn class_chain(&self) -> &[&'static str] {
        &["Inductor", TWO_TERMINAL_CLASS, ELEMENT_CLASS]
    }

    fn kind(&self) -> ElementKind {
        ElementKind::TwoTerminal
    }

    fn segments(&self) -> Result<Vec<Segment>> {
        let diameter = CORE_WIDTH / self.loops as f32;
        (0..self.loops)
            .map(|index| {
                let center = Point::new(diameter * (index as f32 + 0.5), 0.0);
                Segment::arc(ArcGeometry::new(center, diameter, diameter, 0.0, 180.0))
            })
            .collect()
    }
}

/// A diode: a triangle pointing toward the cathode bar.
#[derive(Debug, Clone)]
pub struct Diode {
    width: f32,
    height: f32,
    filled: bool,
}

impl Default for Diode {
    fn default() -> Self {
        Self {
            width: 0.4,
            height: 0.5,
            filled: false,
        }
    }
}

impl Diode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills the triangle with the stroke color.
    pub fn filled(mut self) -> Self {
        self.filled = true;
        self
    }
}

impl ElementDefinition for Diode {
    fn name(&self) -> &str {
        "Diode"
    }

    fn class_chain(&self) -> &[&'static str] {
        &["Diode", TWO_TERMINAL_CLASS, ELEMENT_CLASS]
    }

    fn kind(&self) -> ElementKind {
        ElementKind::TwoTerminal
    }

    fn segments(&self) -> Result<Vec<Segment>> {
        let half = self.height / 2.0;
        Ok(vec![
            Segment::polygon(points(&[(0.0, half), (0.0, -half), (self.width, 0.0)]))?,
            Segment::path(points(&[(self.width, half), (self.width, -half)]))?,
            Segment::path(points(&[(0.0, 0.0), (self.width, 0.0)]))?,
        ])
    }

    fn defaults(&self) -> StyleAttrs {
        if self.filled {
            StyleAttrs::new().with_fill(Fill::Stroke)
        } else {
            StyleAttrs::default()
        }
    }
}
