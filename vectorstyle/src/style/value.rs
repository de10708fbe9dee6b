//! Style property values and zoom stop resolution.
//!
//! A property is either a constant or a `stops` table:
//!
//! ```json
//! "line-width": 2
//! "line-width": { "stops": [[5, 1], [10, 2], [14, 6]] }
//! ```
//!
//! Stops are piecewise constant: the value of the last stop whose zoom
//! threshold is `<=` the current zoom applies. There is no interpolation
//! between stops, even for `exponential` functions; `base` and `type` are
//! accepted and ignored. Anything else (property functions, expressions)
//! is kept as [`ValueExpr::Unsupported`] and never resolves.

use serde::{Deserialize, Serialize};
use tiny_skia::Color;

use super::color::parse_color;

/// A concrete style value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<StyleValue>),
}

impl StyleValue {
    /// Numeric view; numeric strings are accepted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StyleValue::Number(n) => Some(*n),
            StyleValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        self.as_f64().map(|n| n as f32)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StyleValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Parse a color string. Non-strings and unknown colors yield `None`.
    pub fn as_color(&self) -> Option<Color> {
        self.as_str().and_then(parse_color)
    }

    /// Array of numbers (e.g. `line-dasharray`). Any non-numeric member
    /// rejects the whole array.
    pub fn as_f32_array(&self) -> Option<Vec<f32>> {
        match self {
            StyleValue::Array(items) => items.iter().map(StyleValue::as_f32).collect(),
            _ => None,
        }
    }

    /// Array of strings (e.g. `text-font`).
    pub fn as_string_array(&self) -> Option<Vec<String>> {
        match self {
            StyleValue::Array(items) => items
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => None,
        }
    }
}

impl From<&str> for StyleValue {
    fn from(s: &str) -> Self {
        StyleValue::String(s.to_string())
    }
}

impl From<f64> for StyleValue {
    fn from(n: f64) -> Self {
        StyleValue::Number(n)
    }
}

/// One `[zoom, value]` stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop(pub f64, pub StyleValue);

/// A zoom-indexed table of stops, in authored order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StopsTable {
    pub stops: Vec<Stop>,
}

/// A property expression: a constant or a zoom stops table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueExpr {
    Stops(StopsTable),
    Constant(StyleValue),
    /// A form the renderer does not evaluate; resolves to `None`.
    Unsupported(serde_json::Value),
}

impl ValueExpr {
    pub fn constant(value: impl Into<StyleValue>) -> Self {
        ValueExpr::Constant(value.into())
    }

    /// Build a stops table from `(zoom, value)` pairs.
    pub fn stops<V: Into<StyleValue>>(stops: impl IntoIterator<Item = (f64, V)>) -> Self {
        ValueExpr::Stops(StopsTable {
            stops: stops
                .into_iter()
                .map(|(z, v)| Stop(z, v.into()))
                .collect(),
        })
    }

    /// Resolve this expression at `zoom`. See [`resolve`].
    pub fn resolve(&self, zoom: f64) -> Option<&StyleValue> {
        resolve(self, zoom)
    }
}

/// Resolve a property expression to a concrete value at `zoom`.
///
/// Constants are returned unchanged. For a stops table the entries are
/// scanned from the highest threshold down and the first one with
/// `threshold <= zoom` wins; an empty table, or a zoom below every
/// threshold, resolves to `None`.
///
/// # Example
///
/// ```
/// use vectorstyle::style::{resolve, StyleValue, ValueExpr};
///
/// let width = ValueExpr::stops([(5.0, 1.0), (10.0, 4.0)]);
/// assert_eq!(resolve(&width, 4.0), None);
/// assert_eq!(resolve(&width, 7.0), Some(&StyleValue::Number(1.0)));
/// assert_eq!(resolve(&width, 12.0), Some(&StyleValue::Number(4.0)));
/// ```
pub fn resolve(expr: &ValueExpr, zoom: f64) -> Option<&StyleValue> {
    match expr {
        ValueExpr::Constant(value) => Some(value),
        ValueExpr::Stops(table) => table
            .stops
            .iter()
            .rev()
            .find(|stop| stop.0 <= zoom)
            .map(|stop| &stop.1),
        ValueExpr::Unsupported(_) => None,
    }
}

/// Resolve an optional property; an undeclared property is `None`.
pub fn resolve_opt(expr: Option<&ValueExpr>, zoom: f64) -> Option<&StyleValue> {
    expr.and_then(|e| resolve(e, zoom))
}
