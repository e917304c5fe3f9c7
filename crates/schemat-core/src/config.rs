//! Drawing-level and process-wide configuration.
//!
//! Two levels of configuration sit at the bottom of the style precedence chain
//! (see [`crate::style`]):
//!
//! - [`DrawingConfig`]: owned by a single [`Drawing`](crate::drawing::Drawing)
//! - [`GlobalConfig`]: process-wide, shared by every drawing
//!
//! Both implement [`serde::Deserialize`] so they can be loaded from external
//! sources such as TOML files.
//!
//! # Snapshot semantics
//!
//! The global configuration is stored as an immutable [`Arc`] snapshot.
//! [`global_config`] hands out the current snapshot; [`update_global_config`]
//! builds a modified copy and swaps it in. An element resolves its style
//! against the snapshot current at the moment it is placed, so changing the
//! global configuration later never alters elements that are already placed.
//!
//! ```
//! # use schemat_core::color::Color;
//! # use schemat_core::config::{global_config, update_global_config};
//! # use schemat_core::style::StyleAttrs;
//! let before = global_config();
//!
//! update_global_config(|config| {
//!     config.set_class_defaults(
//!         "DocExampleGauge",
//!         StyleAttrs::new().with_color(Color::new("teal").unwrap()),
//!     );
//! });
//!
//! assert!(before.class_defaults("DocExampleGauge").is_none());
//! assert!(global_config().class_defaults("DocExampleGauge").is_some());
//! ```

use std::{
    collections::HashMap,
    sync::{Arc, OnceLock, PoisonError, RwLock},
};

use log::debug;
use serde::Deserialize;

use crate::{
    color::Color,
    error::{Error, Result},
    style::StyleAttrs,
};

/// Default length of a two-terminal element, in drawing units.
pub const DEFAULT_UNIT: f32 = 3.0;
/// Default margin added around the drawing bounds, in drawing units.
pub const DEFAULT_MARGIN: f32 = 0.1;

/// Checks a unit length: it must be a positive finite number.
///
/// # Errors
///
/// Returns [`Error::InvalidValue`] otherwise.
pub fn validate_unit(unit: f32) -> Result<f32> {
    if unit.is_finite() && unit > 0.0 {
        Ok(unit)
    } else {
        Err(Error::InvalidValue(format!(
            "unit must be a positive finite number, got {unit}"
        )))
    }
}

/// Checks a margin: it must be a non-negative finite number.
///
/// # Errors
///
/// Returns [`Error::InvalidValue`] otherwise.
pub fn validate_margin(margin: f32) -> Result<f32> {
    if margin.is_finite() && margin >= 0.0 {
        Ok(margin)
    } else {
        Err(Error::InvalidValue(format!(
            "margin must be a non-negative finite number, got {margin}"
        )))
    }
}

/// Process-wide configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Default two-terminal element length.
    unit: f32,
    /// Margin around the drawing bounds.
    margin: f32,
    /// Background color handed to backends, transparent if unset.
    background: Option<Color>,
    /// Global style level of the precedence chain.
    style: StyleAttrs,
    /// User-overridable defaults keyed by element class name.
    class_defaults: HashMap<String, StyleAttrs>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            unit: DEFAULT_UNIT,
            margin: DEFAULT_MARGIN,
            background: None,
            style: StyleAttrs::default(),
            class_defaults: HashMap::new(),
        }
    }
}

impl GlobalConfig {
    pub fn unit(&self) -> f32 {
        self.unit
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    pub fn style(&self) -> &StyleAttrs {
        &self.style
    }

    /// Returns the defaults registered for an element class, if any.
    pub fn class_defaults(&self, class: &str) -> Option<&StyleAttrs> {
        self.class_defaults.get(class)
    }

    /// Sets the default two-terminal element length.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] unless `unit` is positive and finite.
    pub fn set_unit(&mut self, unit: f32) -> Result<()> {
        self.unit = validate_unit(unit)?;
        Ok(())
    }

    pub fn set_margin(&mut self, margin: f32) -> Result<()> {
        self.margin = validate_margin(margin)?;
        Ok(())
    }

    pub fn set_background(&mut self, background: Option<Color>) {
        self.background = background;
    }

    pub fn style_mut(&mut self) -> &mut StyleAttrs {
        &mut self.style
    }

    /// Registers (or replaces) the defaults for an element class.
    ///
    /// Subclasses are not affected by copying: the lookup walks the element's
    /// class chain, so a default registered for `"Element2Term"` applies to a
    /// resistor unless `"Resistor"` overrides the same attribute.
    pub fn set_class_defaults(&mut self, class: &str, attrs: StyleAttrs) {
        self.class_defaults.insert(class.to_string(), attrs);
    }

    /// Removes the defaults for an element class.
    pub fn clear_class_defaults(&mut self, class: &str) {
        self.class_defaults.remove(class);
    }
}

/// Configuration owned by one drawing.
///
/// Every field is optional; unset fields fall back to the [`GlobalConfig`]
/// snapshot in effect when the value is needed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DrawingConfig {
    unit: Option<f32>,
    margin: Option<f32>,
    background: Option<Color>,
    style: StyleAttrs,
}

impl DrawingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unit(&self) -> Option<f32> {
        self.unit
    }

    pub fn margin(&self) -> Option<f32> {
        self.margin
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    pub fn style(&self) -> &StyleAttrs {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut StyleAttrs {
        &mut self.style
    }

    /// Sets the default two-terminal element length.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] unless `unit` is positive and finite.
    pub fn with_unit(mut self, unit: f32) -> Result<Self> {
        self.unit = Some(validate_unit(unit)?);
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] for negative or non-finite margins.
    pub fn with_margin(mut self, margin: f32) -> Result<Self> {
        self.margin = Some(validate_margin(margin)?);
        Ok(self)
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = Some(background);
        self
    }

    pub fn with_style(mut self, style: StyleAttrs) -> Self {
        self.style = style;
        self
    }
}

static GLOBAL_CONFIG: OnceLock<RwLock<Arc<GlobalConfig>>> = OnceLock::new();

fn global_cell() -> &'static RwLock<Arc<GlobalConfig>> {
    GLOBAL_CONFIG.get_or_init(|| RwLock::new(Arc::new(GlobalConfig::default())))
}

/// Returns the current global configuration snapshot.
pub fn global_config() -> Arc<GlobalConfig> {
    let guard = global_cell()
        .read()
        .unwrap_or_else(PoisonError::into_inner);
    Arc::clone(&guard)
}

/// Replaces the global configuration.
pub fn set_global_config(config: GlobalConfig) {
    let mut guard = global_cell()
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    *guard = Arc::new(config);
    debug!("Global configuration replaced");
}

/// Applies `update` to a copy of the global configuration and installs the copy.
///
/// Snapshots handed out earlier are unaffected.
pub fn update_global_config(update: impl FnOnce(&mut GlobalConfig)) {
    let mut guard = global_cell()
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    let mut next = GlobalConfig::clone(&guard);
    update(&mut next);
    *guard = Arc::new(next);
    debug!("Global configuration updated");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_config_default() {
        let config = GlobalConfig::default();
        assert_eq!(config.unit(), DEFAULT_UNIT);
        assert_eq!(config.margin(), DEFAULT_MARGIN);
        assert!(config.background().is_none());
        assert!(config.style().is_empty());
    }

    #[test]
    fn test_class_defaults_roundtrip() {
        let mut config = GlobalConfig::default();
        let attrs = StyleAttrs::new().with_zorder(4);
        config.set_class_defaults("Capacitor", attrs.clone());
        assert_eq!(config.class_defaults("Capacitor"), Some(&attrs));

        config.clear_class_defaults("Capacitor");
        assert!(config.class_defaults("Capacitor").is_none());
    }

    #[test]
    fn test_snapshot_is_not_affected_by_later_updates() {
        let snapshot = global_config();
        update_global_config(|config| {
            config.set_class_defaults("ConfigSnapshotProbe", StyleAttrs::new().with_zorder(1));
        });

        assert!(snapshot.class_defaults("ConfigSnapshotProbe").is_none());
        assert!(global_config().class_defaults("ConfigSnapshotProbe").is_some());

        update_global_config(|config| config.clear_class_defaults("ConfigSnapshotProbe"));
    }

    #[test]
    fn test_drawing_config_builders() {
        let config = DrawingConfig::new()
            .with_unit(2.0)
            .and_then(|config| config.with_margin(0.5))
            .unwrap()
            .with_background(Color::new("white").unwrap());
        assert_eq!(config.unit(), Some(2.0));
        assert_eq!(config.margin(), Some(0.5));
        assert_eq!(config.background(), Some(Color::new("white").unwrap()));
    }

    #[test]
    fn test_unit_and_margin_are_validated() {
        let mut config = GlobalConfig::default();
        for unit in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(config.set_unit(unit), Err(Error::InvalidValue(_))));
            assert!(matches!(
                DrawingConfig::new().with_unit(unit),
                Err(Error::InvalidValue(_))
            ));
        }
        assert_eq!(config.unit(), DEFAULT_UNIT);

        assert!(matches!(config.set_margin(-0.1), Err(Error::InvalidValue(_))));
        assert!(matches!(
            DrawingConfig::new().with_margin(f32::NAN),
            Err(Error::InvalidValue(_))
        ));
        assert_eq!(config.margin(), DEFAULT_MARGIN);

        config.set_margin(0.0).unwrap();
        config.set_unit(1.5).unwrap();
        assert_eq!(config.margin(), 0.0);
        assert_eq!(config.unit(), 1.5);
    }
}
