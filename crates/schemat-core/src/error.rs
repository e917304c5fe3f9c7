//! Error types for diagram construction.
//!
//! Every failure in the construction pipeline is fatal and surfaces at the call
//! that triggered it. The variants fall into three groups:
//!
//! - **Definition errors**: [`Error::UnknownAnchor`], [`Error::MalformedSegment`]
//! - **Ordering errors**: [`Error::UnplacedElement`], [`Error::AlreadyPlaced`],
//!   [`Error::UnknownElement`], [`Error::EmptyStateStack`]
//! - **Style/value errors**: [`Error::InvalidColor`], [`Error::InvalidLineStyle`],
//!   [`Error::InvalidValue`]
//!
//! Contradictory placement directives are not errors; they are resolved by a
//! fixed precedence rule in the placement engine.

use thiserror::Error;

/// Result alias used throughout the core crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("element `{element}` has no anchor named `{anchor}`")]
    UnknownAnchor { element: String, anchor: String },

    #[error("malformed segment: {0}")]
    MalformedSegment(String),

    #[error("element `{element}` has not been placed yet")]
    UnplacedElement { element: String },

    #[error("element `{element}` is already placed")]
    AlreadyPlaced { element: String },

    #[error("element id does not belong to this drawing")]
    UnknownElement,

    #[error("pop called on an empty drawing state stack")]
    EmptyStateStack,

    #[error("invalid color `{0}`")]
    InvalidColor(String),

    #[error("invalid line style `{0}`, expected one of: solid, dashed, dotted, dashdot, -, --, :, -. or a dash pattern such as `4,2`")]
    InvalidLineStyle(String),

    #[error("invalid value: {0}")]
    InvalidValue(String),
}
