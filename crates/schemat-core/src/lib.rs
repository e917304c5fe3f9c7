//! Schemat Core
//!
//! This crate provides the placement engine behind Schemat diagrams. It
//! includes:
//!
//! - **Geometry**: points, bounds and affine transforms ([`geometry`] module)
//! - **Segments**: the drawing primitives elements are built from ([`segment`] module)
//! - **Style**: attribute types and the precedence chain ([`style`] module)
//! - **Configuration**: per-drawing and process-wide settings ([`config`] module)
//! - **Elements**: the generic element interface and builder ([`element`] module)
//! - **Placement**: local-to-absolute transforms and cursor chaining ([`placement`] module)
//! - **Drawing**: the cursor, state stack and element list ([`drawing`] module)
//! - **Rendering**: the frame handed to backends ([`render`] module)
//!
//! Coordinates are in drawing units with the y axis pointing up; angles are
//! in degrees, counter-clockwise from the positive x axis.

pub mod color;
pub mod config;
pub mod drawing;
pub mod element;
pub mod error;
pub mod geometry;
pub mod placement;
pub mod render;
pub mod segment;
pub mod style;
pub mod text;

pub use error::{Error, Result};
