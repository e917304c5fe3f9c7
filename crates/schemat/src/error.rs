//! Error types for Schemat operations.
//!
//! This module provides the main error type [`SchematError`] which wraps
//! the failures of diagram construction, configuration loading and export.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;

/// The main error type for Schemat operations.
#[derive(Debug, Error)]
pub enum SchematError {
    #[error(transparent)]
    Drawing(#[from] schemat_core::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Export error: {0}")]
    Export(#[from] crate::export::Error),
}
