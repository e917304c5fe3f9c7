//! Style attributes and their precedence chain.
//!
//! Every stylable attribute of an element (color, fill, line width, line style,
//! z-order, font, font size) is looked up through an ordered list of partial
//! style maps. The first map that defines an attribute wins; if none does, a
//! built-in hard default applies.
//!
//! # Overview
//!
//! - [`StyleAttrs`]: A partial set of style attributes (every field optional)
//! - [`ResolvedStyle`]: A complete set of style attributes after resolution
//! - [`StyleChain`]: The ordered lookup chain producing a [`ResolvedStyle`]
//! - [`StyleSource`]: Names the level of the chain an attribute came from
//! - [`LineStyle`], [`Fill`]: Validated attribute value types
//!
//! # Precedence
//!
//! The placement engine builds the chain in this order, nearest first:
//!
//! | Level | Source |
//! |-------|--------|
//! | 1 | post-construction setter ([`StyleSource::Setter`]) |
//! | 2 | construction argument ([`StyleSource::Argument`]) |
//! | 3 | user class defaults, nearest class first ([`StyleSource::ClassDefault`]) |
//! | 4 | element-defined defaults ([`StyleSource::Element`]) |
//! | 5 | drawing configuration ([`StyleSource::Drawing`]) |
//! | 6 | global configuration ([`StyleSource::Global`]) |
//!
//! # Example
//!
//! ```
//! # use schemat_core::color::Color;
//! # use schemat_core::style::{StyleAttrs, StyleChain, StyleSource};
//! let setter = StyleAttrs::new().with_color(Color::new("red").unwrap());
//! let argument = StyleAttrs::new()
//!     .with_color(Color::new("blue").unwrap())
//!     .with_lw(3.0)
//!     .unwrap();
//!
//! let resolved = StyleChain::new()
//!     .with_layer(StyleSource::Setter, &setter)
//!     .with_layer(StyleSource::Argument, &argument)
//!     .resolve();
//!
//! assert_eq!(resolved.color(), Color::new("red").unwrap());
//! assert_eq!(resolved.lw(), 3.0);
//! ```

use std::{fmt, str::FromStr};

use serde::Deserialize;

use crate::{
    color::Color,
    error::{Error, Result},
};

/// Hard default line width when no level of the chain defines one.
pub const DEFAULT_LINE_WIDTH: f32 = 2.0;
/// Hard default font family.
pub const DEFAULT_FONT: &str = "sans-serif";
/// Hard default font size in points.
pub const DEFAULT_FONT_SIZE: f32 = 14.0;

// =============================================================================
// Attribute value types
// =============================================================================

/// Defines the dash pattern of a stroked line.
///
/// # Parsing
///
/// Both names and the short matplotlib-style tokens are accepted:
/// `solid`/`-`, `dashed`/`--`, `dotted`/`:`, `dashdot`/`dash-dot`/`-.`.
/// Anything else must be a dash pattern of positive numbers separated by
/// commas or spaces (e.g. `"4,2"`); otherwise parsing fails.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub enum LineStyle {
    /// Solid continuous line (default)
    #[default]
    Solid,
    /// Dashed line with equal dash and gap lengths
    Dashed,
    /// Dotted line with small dots
    Dotted,
    /// Dash-dot pattern
    DashDot,
    /// Explicit dash/gap lengths, repeating
    Custom(Vec<f32>),
}

impl FromStr for LineStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "solid" | "-" => Ok(Self::Solid),
            "dashed" | "--" => Ok(Self::Dashed),
            "dotted" | ":" => Ok(Self::Dotted),
            "dashdot" | "dash-dot" | "-." => Ok(Self::DashDot),
            pattern => {
                let lengths = pattern
                    .split([',', ' '])
                    .filter(|part| !part.is_empty())
                    .map(|part| part.parse::<f32>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| Error::InvalidLineStyle(s.to_string()))?;

                if lengths.is_empty() || lengths.iter().any(|len| !len.is_finite() || *len <= 0.0) {
                    return Err(Error::InvalidLineStyle(s.to_string()));
                }
                Ok(Self::Custom(lengths))
            }
        }
    }
}

impl TryFrom<String> for LineStyle {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl LineStyle {
    /// Returns the dash pattern for this style, or `None` for solid lines.
    ///
    /// The values are in output units and follow SVG `stroke-dasharray` syntax.
    pub fn dash_pattern(&self) -> Option<String> {
        match self {
            Self::Solid => None,
            Self::Dashed => Some("5,5".to_string()),
            Self::Dotted => Some("2,3".to_string()),
            Self::DashDot => Some("10,5,2,5".to_string()),
            Self::Custom(lengths) => Some(
                lengths
                    .iter()
                    .map(|len| len.to_string())
                    .collect::<Vec<_>>()
                    .join(","),
            ),
        }
    }
}

/// Fill setting for closed primitives.
///
/// `Fill::None` explicitly disables filling, which is different from leaving
/// the attribute unset (and letting a lower level of the chain decide).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Fill {
    None,
    /// Same color as the stroke
    Stroke,
    Color(Color),
}

impl Fill {
    /// Returns the fill color given the stroke color, if any.
    pub fn resolve(self, stroke: Color) -> Option<Color> {
        match self {
            Self::None => None,
            Self::Stroke => Some(stroke),
            Self::Color(color) => Some(color),
        }
    }
}

impl From<Color> for Fill {
    fn from(color: Color) -> Self {
        Self::Color(color)
    }
}

impl FromStr for Fill {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "none" | "" => Ok(Self::None),
            "stroke" => Ok(Self::Stroke),
            color => Color::new(color).map(Self::Color),
        }
    }
}

impl TryFrom<String> for Fill {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

fn validate_non_negative(name: &str, value: f32) -> Result<f32> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(Error::InvalidValue(format!(
            "{name} must be a non-negative finite number, got {value}"
        )))
    }
}

// =============================================================================
// StyleAttrs
// =============================================================================

/// A partial set of style attributes.
///
/// Unset attributes are looked up further down the [`StyleChain`]. Numeric
/// attributes are validated when set.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleAttrs {
    color: Option<Color>,
    fill: Option<Fill>,
    #[serde(deserialize_with = "deserialize_non_negative")]
    lw: Option<f32>,
    ls: Option<LineStyle>,
    zorder: Option<i32>,
    font: Option<String>,
    #[serde(deserialize_with = "deserialize_non_negative")]
    fontsize: Option<f32>,
}

fn deserialize_non_negative<'de, D>(deserializer: D) -> Result<Option<f32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<f32>::deserialize(deserializer)?;
    value
        .map(|value| validate_non_negative("value", value))
        .transpose()
        .map_err(serde::de::Error::custom)
}

impl StyleAttrs {
    /// Creates an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn fill(&self) -> Option<Fill> {
        self.fill
    }

    pub fn lw(&self) -> Option<f32> {
        self.lw
    }

    pub fn ls(&self) -> Option<&LineStyle> {
        self.ls.as_ref()
    }

    pub fn zorder(&self) -> Option<i32> {
        self.zorder
    }

    pub fn font(&self) -> Option<&str> {
        self.font.as_deref()
    }

    pub fn fontsize(&self) -> Option<f32> {
        self.fontsize
    }

    /// Returns true if no attribute is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = Some(color);
    }

    pub fn set_fill(&mut self, fill: impl Into<Fill>) {
        self.fill = Some(fill.into());
    }

    /// Sets the line width.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] for negative or non-finite widths.
    pub fn set_lw(&mut self, lw: f32) -> Result<()> {
        self.lw = Some(validate_non_negative("line width", lw)?);
        Ok(())
    }

    pub fn set_ls(&mut self, ls: LineStyle) {
        self.ls = Some(ls);
    }

    pub fn set_zorder(&mut self, zorder: i32) {
        self.zorder = Some(zorder);
    }

    pub fn set_font(&mut self, font: &str) {
        self.font = Some(font.to_string());
    }

    /// Sets the font size in points.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] for negative or non-finite sizes.
    pub fn set_fontsize(&mut self, fontsize: f32) -> Result<()> {
        self.fontsize = Some(validate_non_negative("font size", fontsize)?);
        Ok(())
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.set_color(color);
        self
    }

    pub fn with_fill(mut self, fill: impl Into<Fill>) -> Self {
        self.set_fill(fill);
        self
    }

    pub fn with_lw(mut self, lw: f32) -> Result<Self> {
        self.set_lw(lw)?;
        Ok(self)
    }

    pub fn with_ls(mut self, ls: LineStyle) -> Self {
        self.set_ls(ls);
        self
    }

    pub fn with_zorder(mut self, zorder: i32) -> Self {
        self.set_zorder(zorder);
        self
    }

    pub fn with_font(mut self, font: &str) -> Self {
        self.set_font(font);
        self
    }

    pub fn with_fontsize(mut self, fontsize: f32) -> Result<Self> {
        self.set_fontsize(fontsize)?;
        Ok(self)
    }

    /// Field-wise merge: attributes set on `self` win, the rest come from `fallback`.
    pub fn or(&self, fallback: &StyleAttrs) -> StyleAttrs {
        StyleAttrs {
            color: self.color.or(fallback.color),
            fill: self.fill.or(fallback.fill),
            lw: self.lw.or(fallback.lw),
            ls: self.ls.clone().or_else(|| fallback.ls.clone()),
            zorder: self.zorder.or(fallback.zorder),
            font: self.font.clone().or_else(|| fallback.font.clone()),
            fontsize: self.fontsize.or(fallback.fontsize),
        }
    }
}

// =============================================================================
// ResolvedStyle
// =============================================================================

/// A complete set of style attributes, as handed to rendering backends.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    color: Color,
    fill: Option<Color>,
    lw: f32,
    ls: LineStyle,
    zorder: i32,
    font: String,
    fontsize: f32,
}

impl Default for ResolvedStyle {
    /// The built-in hard defaults.
    fn default() -> Self {
        Self {
            color: Color::default(),
            fill: None,
            lw: DEFAULT_LINE_WIDTH,
            ls: LineStyle::Solid,
            zorder: 0,
            font: DEFAULT_FONT.to_string(),
            fontsize: DEFAULT_FONT_SIZE,
        }
    }
}

impl ResolvedStyle {
    pub fn color(&self) -> Color {
        self.color
    }

    pub fn fill(&self) -> Option<Color> {
        self.fill
    }

    pub fn lw(&self) -> f32 {
        self.lw
    }

    pub fn ls(&self) -> &LineStyle {
        &self.ls
    }

    pub fn zorder(&self) -> i32 {
        self.zorder
    }

    pub fn font(&self) -> &str {
        &self.font
    }

    pub fn fontsize(&self) -> f32 {
        self.fontsize
    }

    /// Returns this style with every attribute set in `overrides` replaced.
    pub fn overridden_by(&self, overrides: &StyleAttrs) -> ResolvedStyle {
        let color = overrides.color.unwrap_or(self.color);
        ResolvedStyle {
            color,
            fill: overrides.fill.map_or(self.fill, |fill| fill.resolve(color)),
            lw: overrides.lw.unwrap_or(self.lw),
            ls: overrides.ls.clone().unwrap_or_else(|| self.ls.clone()),
            zorder: overrides.zorder.unwrap_or(self.zorder),
            font: overrides
                .font
                .clone()
                .unwrap_or_else(|| self.font.clone()),
            fontsize: overrides.fontsize.unwrap_or(self.fontsize),
        }
    }
}

// =============================================================================
// StyleChain
// =============================================================================

/// Identifies a level of the style precedence chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleSource {
    /// Value set through a setter after the element was constructed
    Setter,
    /// Value passed while constructing the element
    Argument,
    /// User-overridable defaults registered for an element class
    ClassDefault(String),
    /// Defaults computed by the element definition itself
    Element,
    /// The owning drawing's configuration
    Drawing,
    /// Process-wide configuration
    Global,
    /// Built-in fallback
    HardDefault,
}

impl fmt::Display for StyleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setter => write!(f, "setter"),
            Self::Argument => write!(f, "argument"),
            Self::ClassDefault(class) => write!(f, "class default ({class})"),
            Self::Element => write!(f, "element default"),
            Self::Drawing => write!(f, "drawing config"),
            Self::Global => write!(f, "global config"),
            Self::HardDefault => write!(f, "hard default"),
        }
    }
}

/// Names a single stylable attribute, used to ask where it was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleAttribute {
    Color,
    Fill,
    LineWidth,
    LineStyle,
    ZOrder,
    Font,
    FontSize,
}

impl StyleAttribute {
    fn is_set_in(self, attrs: &StyleAttrs) -> bool {
        match self {
            Self::Color => attrs.color.is_some(),
            Self::Fill => attrs.fill.is_some(),
            Self::LineWidth => attrs.lw.is_some(),
            Self::LineStyle => attrs.ls.is_some(),
            Self::ZOrder => attrs.zorder.is_some(),
            Self::Font => attrs.font.is_some(),
            Self::FontSize => attrs.fontsize.is_some(),
        }
    }
}

/// An ordered list of partial style maps consulted nearest first.
///
/// The chain borrows its layers, so building one per element is cheap and
/// nothing is cached across elements.
#[derive(Debug, Default, Clone)]
pub struct StyleChain<'a> {
    layers: Vec<(StyleSource, &'a StyleAttrs)>,
}

impl<'a> StyleChain<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a layer below all layers added so far.
    pub fn push(&mut self, source: StyleSource, attrs: &'a StyleAttrs) {
        self.layers.push((source, attrs));
    }

    /// Builder form of [`StyleChain::push`].
    pub fn with_layer(mut self, source: StyleSource, attrs: &'a StyleAttrs) -> Self {
        self.push(source, attrs);
        self
    }

    /// Returns the level an attribute resolves from.
    pub fn source_of(&self, attribute: StyleAttribute) -> StyleSource {
        self.layers
            .iter()
            .find(|(_, attrs)| attribute.is_set_in(attrs))
            .map(|(source, _)| source.clone())
            .unwrap_or(StyleSource::HardDefault)
    }

    /// Resolves every attribute: first layer that sets it wins, else the hard default.
    pub fn resolve(&self) -> ResolvedStyle {
        let merged = self
            .layers
            .iter()
            .fold(StyleAttrs::default(), |acc, (_, attrs)| acc.or(attrs));
        ResolvedStyle::default().overridden_by(&merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> Color {
        Color::new("red").unwrap()
    }

    fn blue() -> Color {
        Color::new("blue").unwrap()
    }

    #[test]
    fn test_line_style_from_str() {
        assert_eq!("solid".parse::<LineStyle>().unwrap(), LineStyle::Solid);
        assert_eq!("-".parse::<LineStyle>().unwrap(), LineStyle::Solid);
        assert_eq!("--".parse::<LineStyle>().unwrap(), LineStyle::Dashed);
        assert_eq!(":".parse::<LineStyle>().unwrap(), LineStyle::Dotted);
        assert_eq!("-.".parse::<LineStyle>().unwrap(), LineStyle::DashDot);
        assert_eq!("dash-dot".parse::<LineStyle>().unwrap(), LineStyle::DashDot);
        assert_eq!(
            "4,2".parse::<LineStyle>().unwrap(),
            LineStyle::Custom(vec![4.0, 2.0])
        );
        assert_eq!(
            "6 2 1 2".parse::<LineStyle>().unwrap(),
            LineStyle::Custom(vec![6.0, 2.0, 1.0, 2.0])
        );
    }

    #[test]
    fn test_line_style_rejects_invalid_tokens() {
        for token in ["wavy", "", "4,-2", "0", "1,x"] {
            let result = token.parse::<LineStyle>();
            assert!(
                matches!(result, Err(Error::InvalidLineStyle(_))),
                "`{token}` should be rejected"
            );
        }
    }

    #[test]
    fn test_line_style_dash_pattern() {
        assert_eq!(LineStyle::Solid.dash_pattern(), None);
        assert_eq!(LineStyle::Dashed.dash_pattern(), Some("5,5".to_string()));
        assert_eq!(
            LineStyle::Custom(vec![4.0, 1.5]).dash_pattern(),
            Some("4,1.5".to_string())
        );
    }

    #[test]
    fn test_fill_from_str() {
        assert_eq!("none".parse::<Fill>().unwrap(), Fill::None);
        assert_eq!("red".parse::<Fill>().unwrap(), Fill::Color(red()));
        assert_eq!("stroke".parse::<Fill>().unwrap(), Fill::Stroke);
        assert!("nonsense-color".parse::<Fill>().is_err());
    }

    #[test]
    fn test_stroke_fill_follows_resolved_color() {
        let argument = StyleAttrs::new().with_color(red());
        let element = StyleAttrs::new().with_fill(Fill::Stroke);

        let resolved = StyleChain::new()
            .with_layer(StyleSource::Argument, &argument)
            .with_layer(StyleSource::Element, &element)
            .resolve();
        assert_eq!(resolved.fill(), Some(red()));
    }

    #[test]
    fn test_numeric_attributes_are_validated_when_set() {
        let mut attrs = StyleAttrs::new();
        assert!(attrs.set_lw(1.5).is_ok());
        assert!(matches!(attrs.set_lw(-1.0), Err(Error::InvalidValue(_))));
        assert!(matches!(attrs.set_lw(f32::NAN), Err(Error::InvalidValue(_))));
        assert!(matches!(
            attrs.set_fontsize(f32::INFINITY),
            Err(Error::InvalidValue(_))
        ));
        // The failed calls left the earlier value in place
        assert_eq!(attrs.lw(), Some(1.5));
    }

    #[test]
    fn test_style_attrs_or() {
        let near = StyleAttrs::new().with_color(red());
        let far = StyleAttrs::new()
            .with_color(blue())
            .with_zorder(3)
            .with_ls(LineStyle::Dashed);

        let merged = near.or(&far);
        assert_eq!(merged.color(), Some(red()));
        assert_eq!(merged.zorder(), Some(3));
        assert_eq!(merged.ls(), Some(&LineStyle::Dashed));
        assert_eq!(merged.lw(), None);
    }

    #[test]
    fn test_empty_chain_resolves_to_hard_defaults() {
        let resolved = StyleChain::new().resolve();
        assert_eq!(resolved, ResolvedStyle::default());
        assert_eq!(resolved.lw(), DEFAULT_LINE_WIDTH);
        assert_eq!(resolved.fill(), None);
        assert_eq!(
            StyleChain::new().source_of(StyleAttribute::Color),
            StyleSource::HardDefault
        );
    }

    #[test]
    fn test_chain_precedence_is_first_match() {
        let setter = StyleAttrs::new().with_color(red());
        let argument = StyleAttrs::new().with_color(blue()).with_zorder(5);
        let class = StyleAttrs::new().with_zorder(9).with_lw(4.0).unwrap();
        let global = StyleAttrs::new().with_font("serif").with_lw(1.0).unwrap();

        let chain = StyleChain::new()
            .with_layer(StyleSource::Setter, &setter)
            .with_layer(StyleSource::Argument, &argument)
            .with_layer(StyleSource::ClassDefault("Resistor".to_string()), &class)
            .with_layer(StyleSource::Global, &global);

        let resolved = chain.resolve();
        assert_eq!(resolved.color(), red());
        assert_eq!(resolved.zorder(), 5);
        assert_eq!(resolved.lw(), 4.0);
        assert_eq!(resolved.font(), "serif");
        assert_eq!(resolved.fontsize(), DEFAULT_FONT_SIZE);

        assert_eq!(chain.source_of(StyleAttribute::Color), StyleSource::Setter);
        assert_eq!(chain.source_of(StyleAttribute::ZOrder), StyleSource::Argument);
        assert_eq!(
            chain.source_of(StyleAttribute::LineWidth),
            StyleSource::ClassDefault("Resistor".to_string())
        );
        assert_eq!(chain.source_of(StyleAttribute::Font), StyleSource::Global);
    }

    #[test]
    fn test_explicit_no_fill_blocks_lower_levels() {
        let near = StyleAttrs::new().with_fill(Fill::None);
        let far = StyleAttrs::new().with_fill(red());

        let resolved = StyleChain::new()
            .with_layer(StyleSource::Argument, &near)
            .with_layer(StyleSource::Drawing, &far)
            .resolve();
        assert_eq!(resolved.fill(), None);
    }

    #[test]
    fn test_overridden_by() {
        let base = ResolvedStyle::default();
        let overrides = StyleAttrs::new().with_fill(blue()).with_zorder(-1);
        let result = base.overridden_by(&overrides);
        assert_eq!(result.fill(), Some(blue()));
        assert_eq!(result.zorder(), -1);
        assert_eq!(result.color(), base.color());
    }
}
