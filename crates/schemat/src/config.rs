//! Configuration types and TOML loading.
//!
//! The configuration types themselves live in the core crate and are
//! re-exported here. This module adds [`SchematConfig`], the root of a TOML
//! configuration file, and the functions that load it.
//!
//! # File format
//!
//! ```toml
//! [global]
//! unit = 3.0
//! margin = 0.2
//!
//! [global.style]
//! color = "black"
//! lw = 1.5
//!
//! [global.class_defaults.Resistor]
//! color = "#aa3300"
//!
//! [drawing]
//! unit = 2.0
//! background = "white"
//!
//! [drawing.style]
//! font = "serif"
//! ```
//!
//! # Example
//!
//! ```
//! # use schemat::config::SchematConfig;
//! let config = SchematConfig::from_toml_str("[drawing]\nunit = 2.0\n").unwrap();
//! assert_eq!(config.drawing().unit(), Some(2.0));
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

pub use schemat_core::config::{
    DEFAULT_MARGIN, DEFAULT_UNIT, DrawingConfig, GlobalConfig, global_config, set_global_config,
    update_global_config, validate_margin, validate_unit,
};

use crate::{Drawing, SchematError};

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Root of a configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchematConfig {
    /// Process-wide section, installed with [`SchematConfig::apply_global`].
    global: Option<GlobalConfig>,

    /// Settings for drawings created from this configuration.
    drawing: DrawingConfig,
}

impl SchematConfig {
    /// Parses a configuration from TOML text.
    ///
    /// Colors, line styles and numeric style values are validated while
    /// parsing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or invalid values,
    /// and [`ConfigError::Validation`] for values that parse but make no sense
    /// (such as a non-positive unit length).
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let units = [
            self.global.as_ref().map(GlobalConfig::unit),
            self.drawing.unit(),
        ];
        for unit in units.into_iter().flatten() {
            validate_unit(unit).map_err(|e| ConfigError::Validation(e.to_string()))?;
        }

        let margins = [
            self.global.as_ref().map(GlobalConfig::margin),
            self.drawing.margin(),
        ];
        for margin in margins.into_iter().flatten() {
            validate_margin(margin).map_err(|e| ConfigError::Validation(e.to_string()))?;
        }
        Ok(())
    }

    /// Returns the global section, if present.
    pub fn global(&self) -> Option<&GlobalConfig> {
        self.global.as_ref()
    }

    /// Returns the drawing section.
    pub fn drawing(&self) -> &DrawingConfig {
        &self.drawing
    }

    /// Installs the global section as the process-wide configuration.
    ///
    /// Does nothing if the file has no global section. Elements placed before
    /// this call keep the style they were resolved with.
    pub fn apply_global(&self) {
        if let Some(global) = &self.global {
            set_global_config(global.clone());
            info!("Global configuration installed");
        }
    }

    /// Creates a drawing using the drawing section.
    pub fn new_drawing(&self) -> Drawing {
        Drawing::with_config(self.drawing.clone())
    }
}

/// Loads a configuration file.
///
/// # Errors
///
/// Returns error if:
/// - File doesn't exist
/// - File cannot be read
/// - TOML parsing or validation fails
pub fn load_config(path: impl AsRef<Path>) -> Result<SchematConfig, SchematError> {
    let path = path.as_ref();
    info!(path = path.display().to_string(); "Loading configuration");

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config = SchematConfig::from_toml_str(&content)?;

    debug!(
        has_global = config.global.is_some();
        "Configuration loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use schemat_core::{color::Color, style::LineStyle};

    use super::*;

    #[test]
    fn test_empty_config() {
        let config = SchematConfig::from_toml_str("").unwrap();
        assert!(config.global().is_none());
        assert_eq!(config.drawing().unit(), None);
    }

    #[test]
    fn test_full_config() {
        let config = SchematConfig::from_toml_str(
            r##"
            [global]
            unit = 4.0

            [global.style]
            ls = "--"

            [global.class_defaults.Resistor]
            color = "#aa3300"

            [drawing]
            margin = 0.5
            background = "white"

            [drawing.style]
            lw = 1.0
            "##,
        )
        .unwrap();

        let global = config.global().unwrap();
        assert_eq!(global.unit(), 4.0);
        assert_eq!(global.style().ls(), Some(&LineStyle::Dashed));
        assert_eq!(
            global.class_defaults("Resistor").unwrap().color(),
            Some(Color::new("#aa3300").unwrap())
        );
        // Unset global values keep their defaults
        assert_eq!(global.margin(), DEFAULT_MARGIN);

        assert_eq!(config.drawing().margin(), Some(0.5));
        assert_eq!(config.drawing().style().lw(), Some(1.0));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for content in [
            "[drawing.style]\ncolor = \"not-a-color\"\n",
            "[drawing.style]\nls = \"wavy\"\n",
            "[drawing.style]\nlw = -2.0\n",
            "[drawing]\nspacing = 1.0\n",
            "[drawing\n",
        ] {
            assert!(
                matches!(SchematConfig::from_toml_str(content), Err(ConfigError::Parse(_))),
                "should reject: {content}"
            );
        }
    }

    #[test]
    fn test_validation_errors() {
        assert!(matches!(
            SchematConfig::from_toml_str("[drawing]\nunit = 0.0\n"),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            SchematConfig::from_toml_str("[global]\nmargin = -1.0\n"),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = load_config("/nonexistent/schemat/config.toml");
        assert!(matches!(
            result,
            Err(SchematError::Config(ConfigError::MissingFile(_)))
        ));
    }
}
