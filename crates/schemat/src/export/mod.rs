//! Output backends for finalized drawings.

pub mod svg;

use thiserror::Error;

/// Errors raised while exporting a drawing.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Render error: {0}")]
    Render(String),
}
