//! Layer filters.
//!
//! Only equality filters take part in rendering:
//!
//! ```json
//! "filter": ["==", "class", "water"]
//! ```
//!
//! A feature is excluded only when it *has* the property and the value
//! differs; a feature without the property passes. Any other filter shape is
//! kept as [`LayerFilter::Unsupported`] and lets every feature through.
//!
//! # Comparison rules
//!
//! The literal's JSON type decides how the feature value is read:
//!
//! | literal | feature value compared as |
//! |---------|---------------------------|
//! | string  | its string form (`3` → `"3"`) |
//! | number  | a number (`"3"` → `3.0`), unparseable strings differ |
//! | bool    | a bool (`"true"`/`"false"` accepted) |

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tile::{Properties, PropertyValue};

/// The right-hand side of an equality filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterLiteral {
    String(String),
    Number(f64),
    Bool(bool),
}

impl FilterLiteral {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(FilterLiteral::String(s.clone())),
            Value::Number(n) => n.as_f64().map(FilterLiteral::Number),
            Value::Bool(b) => Some(FilterLiteral::Bool(*b)),
            _ => None,
        }
    }

    /// Compare a feature value against this literal.
    pub fn matches(&self, value: &PropertyValue) -> bool {
        match self {
            FilterLiteral::String(expected) => value.to_string() == *expected,
            FilterLiteral::Number(expected) => value.as_f64() == Some(*expected),
            FilterLiteral::Bool(expected) => value.as_bool() == Some(*expected),
        }
    }
}

/// A parsed layer filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum LayerFilter {
    /// `["==", key, literal]`
    Equals { key: String, value: FilterLiteral },
    /// Any other filter expression, kept verbatim.
    Unsupported(Value),
}

impl LayerFilter {
    pub fn equals(key: impl Into<String>, value: FilterLiteral) -> Self {
        LayerFilter::Equals {
            key: key.into(),
            value,
        }
    }

    /// True when the feature passes the filter.
    pub fn accepts(&self, properties: &Properties) -> bool {
        match self {
            LayerFilter::Equals { key, value } => match properties.get(key) {
                Some(actual) => value.matches(actual),
                None => true,
            },
            LayerFilter::Unsupported(_) => true,
        }
    }
}

impl From<Value> for LayerFilter {
    fn from(value: Value) -> Self {
        let parsed = value.as_array().and_then(|items| match items.as_slice() {
            [Value::String(op), Value::String(key), literal] if op == "==" => {
                FilterLiteral::from_json(literal).map(|lit| LayerFilter::equals(key.clone(), lit))
            }
            _ => None,
        });
        parsed.unwrap_or(LayerFilter::Unsupported(value))
    }
}

impl From<LayerFilter> for Value {
    fn from(filter: LayerFilter) -> Self {
        match filter {
            LayerFilter::Equals { key, value } => {
                let literal = match value {
                    FilterLiteral::String(s) => Value::from(s),
                    FilterLiteral::Number(n) => Value::from(n),
                    FilterLiteral::Bool(b) => Value::from(b),
                };
                Value::Array(vec![Value::from("=="), Value::from(key), literal])
            }
            LayerFilter::Unsupported(value) => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(pairs: &[(&str, PropertyValue)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_equality_filter_semantics() {
        let filter = LayerFilter::from(json!(["==", "class", "water"]));

        assert!(filter.accepts(&props(&[("class", "water".into())])));
        assert!(filter.accepts(&props(&[])));
        assert!(!filter.accepts(&props(&[("class", "land".into())])));
    }

    #[test]
    fn test_numeric_literal_coercion() {
        let filter = LayerFilter::from(json!(["==", "admin_level", 2]));
        assert!(filter.accepts(&props(&[("admin_level", PropertyValue::Number(2.0))])));
        assert!(filter.accepts(&props(&[("admin_level", "2".into())])));
        assert!(!filter.accepts(&props(&[("admin_level", "two".into())])));
        assert!(!filter.accepts(&props(&[("admin_level", PropertyValue::Number(4.0))])));
    }

    #[test]
    fn test_string_literal_against_number() {
        let filter = LayerFilter::from(json!(["==", "rank", "3"]));
        assert!(filter.accepts(&props(&[("rank", PropertyValue::Number(3.0))])));
        assert!(!filter.accepts(&props(&[("rank", PropertyValue::Number(3.5))])));
    }

    #[test]
    fn test_bool_literal() {
        let filter = LayerFilter::from(json!(["==", "oneway", true]));
        assert!(filter.accepts(&props(&[("oneway", PropertyValue::Bool(true))])));
        assert!(filter.accepts(&props(&[("oneway", "true".into())])));
        assert!(!filter.accepts(&props(&[("oneway", PropertyValue::Bool(false))])));
    }

    #[test]
    fn test_unsupported_filters_pass_everything() {
        let filter = LayerFilter::from(json!(["all", ["==", "class", "a"], ["has", "name"]]));
        assert!(matches!(filter, LayerFilter::Unsupported(_)));
        assert!(filter.accepts(&props(&[("class", "b".into())])));

        let filter = LayerFilter::from(json!(["!=", "class", "a"]));
        assert!(matches!(filter, LayerFilter::Unsupported(_)));
    }

    #[test]
    fn test_deserialize_from_layer_json() {
        let filter: LayerFilter = serde_json::from_str(r#"["==", "_symbol", 4]"#).unwrap();
        assert_eq!(
            filter,
            LayerFilter::equals("_symbol", FilterLiteral::Number(4.0))
        );
    }
}
