//! Connection dots and ground symbols.

use indexmap::IndexMap;
use schemat_core::{
    Result,
    color::Color,
    element::{ElementDefinition, ElementKind},
    geometry::Point,
    segment::Segment,
    style::{Fill, StyleAttrs},
};

use super::{ELEMENT_CLASS, anchor_map, points};

/// A junction dot centered on the cursor.
///
/// Filled with the stroke color unless [`Dot::open`] is used, in which case
/// the inside is white.
#[derive(Debug, Clone)]
pub struct Dot {
    radius: f32,
    open: bool,
}

impl Default for Dot {
    fn default() -> Self {
        Self {
            radius: 0.075,
            open: false,
        }
    }
}

impl Dot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(mut self) -> Self {
        self.open = true;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }
}

impl ElementDefinition for Dot {
    fn name(&self) -> &str {
        "Dot"
    }

    fn class_chain(&self) -> &[&'static str] {
        &["Dot", ELEMENT_CLASS]
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Fixed
    }

    fn segments(&self) -> Result<Vec<Segment>> {
        Ok(vec![Segment::circle(Point::default(), self.radius)?])
    }

    fn anchors(&self) -> IndexMap<String, Point> {
        anchor_map([
            ("start", (0.0, 0.0)),
            ("center", (0.0, 0.0)),
            ("end", (0.0, 0.0)),
        ])
    }

    fn defaults(&self) -> StyleAttrs {
        let fill = if self.open {
            Fill::Color(Color::white())
        } else {
            Fill::Stroke
        };
        StyleAttrs::new().with_fill(fill).with_zorder(1)
    }
}

/// A ground symbol hanging below the cursor.
///
/// The symbol follows the drawing heading like any fixed element; place it
/// with `theta(0.0)` to keep it pointing down.
#[derive(Debug, Clone, Default)]
pub struct Ground {
    /// Draw the chassis variant (angled ticks) instead of bars
    chassis: bool,
}

impl Ground {
    /// Lead length from the connection point to the top bar
    const LEAD: f32 = 0.3;
    const WIDTH: f32 = 0.6;
    const BAR_GAP: f32 = 0.1;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn chassis(mut self) -> Self {
        self.chassis = true;
        self
    }
}

impl ElementDefinition for Ground {
    fn name(&self) -> &str {
        "Ground"
    }

    fn class_chain(&self) -> &[&'static str] {
        &["Ground", ELEMENT_CLASS]
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Fixed
    }

    fn segments(&self) -> Result<Vec<Segment>> {
        let top = -Self::LEAD;
        let half = Self::WIDTH / 2.0;
        let mut segments = vec![
            Segment::path(points(&[(0.0, 0.0), (0.0, top)]))?,
            Segment::path(points(&[(-half, top), (half, top)]))?,
        ];

        if self.chassis {
            let depth = top - 2.0 * Self::BAR_GAP;
            for x in [-half, 0.0, half] {
                segments.push(Segment::path(points(&[
                    (x, top),
                    (x - Self::BAR_GAP * 1.5, depth),
                ]))?);
            }
        } else {
            for bar in 1..3 {
                let y = top - Self::BAR_GAP * bar as f32;
                let half = half * (1.0 - bar as f32 / 3.0);
                segments.push(Segment::path(points(&[(-half, y), (half, y)]))?);
            }
        }
        Ok(segments)
    }

    fn anchors(&self) -> IndexMap<String, Point> {
        anchor_map([("start", (0.0, 0.0)), ("center", (0.0, -Self::LEAD))])
    }
}

#[cfg(test)]
mod tests {
    use schemat_core::segment::Primitive;

    use super::*;

    #[test]
    fn test_dot_defaults() {
        let dot = Dot::new();
        assert_eq!(dot.defaults().fill(), Some(Fill::Stroke));
        assert_eq!(dot.open().defaults().fill(), Some(Fill::Color(Color::white())));
    }

    #[test]
    fn test_dot_anchors_coincide() {
        let dot = Dot::new().build().unwrap();
        assert_eq!(dot.kind(), ElementKind::Fixed);
        assert_eq!(dot.local_anchors()["end"], Point::default());
        assert!(matches!(
            dot.local_segments()[0].primitive(),
            Primitive::Circle { radius, .. } if *radius == 0.075
        ));
    }

    #[test]
    fn test_dot_radius_is_validated() {
        assert!(Dot::new().with_radius(0.0).build().is_err());
    }

    #[test]
    fn test_ground_has_no_end() {
        let ground = Ground::new().build().unwrap();
        assert!(!ground.has_anchor("end"));
        assert_eq!(ground.local_segments().len(), 4);
        assert_eq!(Ground::new().chassis().segments().unwrap().len(), 5);
    }
}
