//! Schemat - declarative, cursor-driven construction of circuit schematics
//! and block diagrams.
//!
//! Elements are chained on a [`Drawing`]: each one starts where the previous
//! one ended unless told otherwise, and the drawing keeps a cursor (position
//! and heading) that placements advance. The finished drawing is handed to a
//! backend; [`SvgBackend`] writes SVG.
//!
//! # Examples
//!
//! ```
//! use schemat::{Drawing, SchematError, elements::{Capacitor, Line, Resistor}};
//! use schemat::element::ElementDefinition;
//!
//! let mut drawing = Drawing::new();
//! drawing.add(Resistor::new().build()?.right().label("R1"))?;
//! drawing.add(Capacitor::new().build()?.down().label("C1"))?;
//! drawing.add(Line::new().build()?.left())?;
//!
//! let svg = schemat::render_svg(&drawing)?;
//! assert!(svg.contains("<svg"));
//! # Ok::<(), SchematError>(())
//! ```

pub mod config;
pub mod elements;
pub mod export;

mod error;

pub use schemat_core::{color, drawing, element, geometry, placement, render, segment, style, text};

pub use error::SchematError;
pub use export::svg::SvgBackend;
pub use schemat_core::drawing::{Drawing, ElementId};

use log::info;

/// Renders a drawing to an SVG string with the default [`SvgBackend`].
///
/// # Errors
///
/// Returns [`SchematError::Export`] if the drawing cannot be rendered.
pub fn render_svg(drawing: &Drawing) -> Result<String, SchematError> {
    let mut backend = SvgBackend::default();
    let svg = drawing.render(&mut backend)?;
    info!(bytes = svg.len(); "SVG rendered successfully");
    Ok(svg)
}
