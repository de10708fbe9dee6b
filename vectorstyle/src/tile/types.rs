//! Geometry and property types shared by every vector tile implementation.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A point in tile-extent space (e.g. `0..4096`).
///
/// Coordinates may fall outside `0..extent` for geometry that overlaps the
/// tile buffer, so they are signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise subtraction.
    pub fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

impl From<[i32; 2]> for Point {
    fn from([x, y]: [i32; 2]) -> Self {
        Point::new(x, y)
    }
}

impl From<Point> for [i32; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// One ring (polygon) or part (line string, multi-point member).
pub type Ring = Vec<Point>;

/// Geometry type code carried by a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeomType {
    Unknown,
    Point,
    LineString,
    Polygon,
}

impl From<u8> for GeomType {
    fn from(code: u8) -> Self {
        match code {
            1 => GeomType::Point,
            2 => GeomType::LineString,
            3 => GeomType::Polygon,
            _ => GeomType::Unknown,
        }
    }
}

impl From<GeomType> for u8 {
    fn from(t: GeomType) -> Self {
        match t {
            GeomType::Unknown => 0,
            GeomType::Point => 1,
            GeomType::LineString => 2,
            GeomType::Polygon => 3,
        }
    }
}

impl fmt::Display for GeomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeomType::Unknown => "unknown",
            GeomType::Point => "point",
            GeomType::LineString => "line",
            GeomType::Polygon => "polygon",
        };
        f.write_str(name)
    }
}

/// A typed feature property value.
///
/// Vector tiles distinguish several integer and float widths; they are all
/// folded into `Number` here since style comparisons never need the width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl PropertyValue {
    /// Numeric view: numbers as-is, strings parsed, bools as 0/1.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            PropertyValue::String(s) => s.trim().parse().ok(),
            PropertyValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        }
    }

    /// Boolean view: bools as-is, the strings `"true"`/`"false"`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            PropertyValue::String(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            PropertyValue::Number(_) => None,
        }
    }

    /// Returns the string slice when the value is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    /// Integral numbers print without a fractional part (`3`, not `3.0`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            PropertyValue::Number(n) => write!(f, "{}", n),
            PropertyValue::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<f64> for PropertyValue {
    fn from(n: f64) -> Self {
        PropertyValue::Number(n)
    }
}

impl From<i64> for PropertyValue {
    fn from(n: i64) -> Self {
        PropertyValue::Number(n as f64)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

/// String-keyed feature properties.
pub type Properties = HashMap<String, PropertyValue>;
