//! Attribute Values
//!
//! Graph producers attach loosely typed values to node attributes. This
//! module turns them into the fixed shapes the buffers store.
//!
//! Coercion is deliberately lenient: missing trailing components become 0,
//! a lone number broadcasts across coordinates, and nothing is clamped. A
//! two-element array written to `xyz` therefore zeroes z. Out-of-range
//! colours are stored as given and reach the renderer unchanged.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

use crate::error::{BufferError, Result};

/// Name of the per-node colour attribute.
pub const COLOR_ATTRIBUTE: &str = "ui.color";
/// Name of the per-node size attribute.
pub const SIZE_ATTRIBUTE: &str = "ui.size";
/// Name of the graph attribute carrying stylesheet text.
pub const STYLESHEET_ATTRIBUTE: &str = "ui.stylesheet";

/// A loosely typed attribute payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Number(f64),
    Numbers(Vec<f64>),
    Text(String),
}

impl From<f32> for AttributeValue {
    fn from(value: f32) -> Self {
        AttributeValue::Number(f64::from(value))
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

impl From<&[f32]> for AttributeValue {
    fn from(values: &[f32]) -> Self {
        AttributeValue::Numbers(values.iter().copied().map(f64::from).collect())
    }
}

impl<const N: usize> From<[f32; N]> for AttributeValue {
    fn from(values: [f32; N]) -> Self {
        AttributeValue::from(&values[..])
    }
}

impl From<Vec<f64>> for AttributeValue {
    fn from(values: Vec<f64>) -> Self {
        AttributeValue::Numbers(values)
    }
}

impl From<&str> for AttributeValue {
    fn from(text: &str) -> Self {
        AttributeValue::Text(text.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(text: String) -> Self {
        AttributeValue::Text(text)
    }
}

/// The node attributes the buffers care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAttribute {
    Coords(Axes),
    Color,
    Size,
}

impl NodeAttribute {
    /// Classify an attribute name. Anything else belongs to external styling.
    pub fn classify(name: &str) -> Option<Self> {
        match name {
            COLOR_ATTRIBUTE => Some(NodeAttribute::Color),
            SIZE_ATTRIBUTE => Some(NodeAttribute::Size),
            _ => Axes::parse(name).map(NodeAttribute::Coords),
        }
    }
}

/// Which coordinate axes an attribute name writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axes {
    X,
    Y,
    Z,
    Xy,
    Xyz,
}

impl Axes {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "x" => Some(Axes::X),
            "y" => Some(Axes::Y),
            "z" => Some(Axes::Z),
            "xy" => Some(Axes::Xy),
            "xyz" => Some(Axes::Xyz),
            _ => None,
        }
    }

    /// Keep only the components this attribute writes.
    pub fn select(self, [x, y, z]: [f32; 3]) -> (Option<f32>, Option<f32>, Option<f32>) {
        match self {
            Axes::X => (Some(x), None, None),
            Axes::Y => (None, Some(y), None),
            Axes::Z => (None, None, Some(z)),
            Axes::Xy => (Some(x), Some(y), None),
            Axes::Xyz => (Some(x), Some(y), Some(z)),
        }
    }
}

/// Coerce a value to an `[x, y, z]` triple.
///
/// A number broadcasts to all three axes. Arrays of one to three numbers
/// fill missing trailing components with 0; longer arrays keep the first
/// three.
pub fn coords_from_value(attribute: &str, value: &AttributeValue) -> Result<[f32; 3]> {
    match value {
        AttributeValue::Number(v) => {
            let v = *v as f32;
            Ok([v, v, v])
        }
        AttributeValue::Numbers(values) => {
            let c = components::<3>(attribute, values);
            Ok([c[0], c[1], c[2]])
        }
        other => Err(BufferError::malformed(
            attribute,
            format!("expected a number or an array of numbers, got {}", shape(other)),
        )),
    }
}

/// Coerce a value to an `[r, g, b, a]` colour.
///
/// Arrays of up to four numbers fill missing components with 0, alpha
/// included. A lone number carries no channel information and yields opaque
/// black. `#rgb`, `#rrggbb` and `#rrggbbaa` strings are decoded with an
/// opaque default alpha.
pub fn color_from_value(attribute: &str, value: &AttributeValue) -> Result<[f32; 4]> {
    match value {
        AttributeValue::Number(v) => {
            debug!(attribute, value = *v, "scalar colour, using opaque black");
            Ok([0.0, 0.0, 0.0, 1.0])
        }
        AttributeValue::Numbers(values) => {
            let c = components::<4>(attribute, values);
            Ok([c[0], c[1], c[2], c[3]])
        }
        AttributeValue::Text(text) => parse_hex_color(text)
            .ok_or_else(|| BufferError::malformed(attribute, format!("`{text}` is not a hex colour"))),
        other => Err(BufferError::malformed(
            attribute,
            format!("expected a colour, got {}", shape(other)),
        )),
    }
}

/// Coerce a value to a size. Arrays use their first element.
pub fn size_from_value(attribute: &str, value: &AttributeValue) -> Result<f32> {
    match value {
        AttributeValue::Number(v) => Ok(*v as f32),
        AttributeValue::Numbers(values) if !values.is_empty() => Ok(values[0] as f32),
        other => Err(BufferError::malformed(
            attribute,
            format!("expected a number, got {}", shape(other)),
        )),
    }
}

fn components<const N: usize>(attribute: &str, values: &[f64]) -> SmallVec<[f32; 4]> {
    if values.len() > N {
        debug!(attribute, len = values.len(), expected = N, "ignoring extra components");
    }
    let mut out: SmallVec<[f32; 4]> = values.iter().take(N).map(|&v| v as f32).collect();
    out.resize(N, 0.0);
    out
}

fn shape(value: &AttributeValue) -> &'static str {
    match value {
        AttributeValue::Bool(_) => "a boolean",
        AttributeValue::Number(_) => "a number",
        AttributeValue::Numbers(_) => "an array",
        AttributeValue::Text(_) => "text",
    }
}

fn parse_hex_color(text: &str) -> Option<[f32; 4]> {
    let hex = text.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| -> Option<f32> {
        let v = u8::from_str_radix(hex.get(range)?, 16).ok()?;
        Some(f32::from(v) / 255.0)
    };

    match hex.len() {
        3 => {
            let nibble = |i: usize| -> Option<f32> {
                let v = u8::from_str_radix(hex.get(i..i + 1)?, 16).ok()?;
                Some(f32::from(v * 17) / 255.0)
            };
            Some([nibble(0)?, nibble(1)?, nibble(2)?, 1.0])
        }
        6 => Some([channel(0..2)?, channel(2..4)?, channel(4..6)?, 1.0]),
        8 => Some([channel(0..2)?, channel(2..4)?, channel(4..6)?, channel(6..8)?]),
        _ => None,
    }
}
