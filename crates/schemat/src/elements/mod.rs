//! A small catalog of element definitions.
//!
//! Each definition supplies local geometry, anchors and a class chain; the
//! placement engine treats them all the same way. Build an [`Element`] with
//! [`ElementDefinition::build`] and chain placement directives on it:
//!
//! ```
//! # use schemat::{Drawing, elements::{Dot, Resistor}, element::ElementDefinition};
//! let mut drawing = Drawing::new();
//! drawing.add(Resistor::new().build()?.up())?;
//! drawing.add(Dot::new().build()?)?;
//! # Ok::<(), schemat::SchematError>(())
//! ```
//!
//! Two-terminal definitions draw their core between `x = 0` and the core
//! width; the placement engine adds the leads. Fixed definitions are drawn
//! around their local origin, which lands on the drawing cursor.
//!
//! [`Element`]: schemat_core::element::Element
//! [`ElementDefinition::build`]: schemat_core::element::ElementDefinition::build

mod connectors;
mod flow;
mod lines;
mod logic;
mod passive;

pub use connectors::{Dot, Ground};
pub use flow::FlowBox;
pub use lines::{Arrow, Line};
pub use logic::AndGate;
pub use passive::{Capacitor, Diode, Inductor, Resistor};

use indexmap::IndexMap;
use schemat_core::geometry::Point;

/// Class shared by every element.
const ELEMENT_CLASS: &str = "Element";

/// Class shared by every two-terminal element.
const TWO_TERMINAL_CLASS: &str = "Element2Term";

/// Builds an anchor map from `(name, (x, y))` pairs.
fn anchor_map<'a>(anchors: impl IntoIterator<Item = (&'a str, (f32, f32))>) -> IndexMap<String, Point> {
    anchors
        .into_iter()
        .map(|(name, point)| (name.to_string(), Point::from(point)))
        .collect()
}

/// Builds a point list from coordinate pairs.
fn points(coords: &[(f32, f32)]) -> Vec<Point> {
    coords.iter().copied().map(Point::from).collect()
}
