//! Shared value vocabulary for the compiler, catalog and emitter.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Primary key of a vertex or edge row.
pub type ElementId = i64;

/// A value as it appears in a filter predicate, a property map or a result
/// row. Variant order matters for untagged deserialization: integers must be
/// tried before floats.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Null,
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// SQL comparison semantics: numerics compare across Integer/Float,
    /// everything else only within its own variant. Null compares to nothing.
    pub fn compare(&self, other: &SqlValue) -> Option<Ordering> {
        match (self, other) {
            (SqlValue::Integer(a), SqlValue::Integer(b)) => Some(a.cmp(b)),
            (SqlValue::Float(a), SqlValue::Float(b)) => a.partial_cmp(b),
            (SqlValue::Integer(a), SqlValue::Float(b)) => (*a as f64).partial_cmp(b),
            (SqlValue::Float(a), SqlValue::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (SqlValue::Text(a), SqlValue::Text(b)) => Some(a.cmp(b)),
            (SqlValue::Boolean(a), SqlValue::Boolean(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl PartialEq for SqlValue {
    fn eq(&self, other: &Self) -> bool {
        matches!(self.compare(other), Some(Ordering::Equal))
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Boolean(v)
    }
}

/// Traversal direction relative to a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Out,
    In,
    Both,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Out => f.write_str("out"),
            Direction::In => f.write_str("in"),
            Direction::Both => f.write_str("both"),
        }
    }
}

/// The kind of graph element a step produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementClass {
    Vertex,
    Edge,
}

impl fmt::Display for ElementClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementClass::Vertex => f.write_str("vertex"),
            ElementClass::Edge => f.write_str("edge"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_comparison_crosses_variants() {
        assert_eq!(
            SqlValue::Integer(3).compare(&SqlValue::Float(3.0)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            SqlValue::Float(2.5).compare(&SqlValue::Integer(3)),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn null_compares_to_nothing() {
        assert_eq!(SqlValue::Null.compare(&SqlValue::Null), None);
        assert_eq!(SqlValue::Null.compare(&SqlValue::Integer(1)), None);
        assert_ne!(SqlValue::Null, SqlValue::Null);
    }

    #[test]
    fn text_and_boolean_compare_within_variant() {
        assert_eq!(
            SqlValue::from("abc").compare(&SqlValue::from("abd")),
            Some(Ordering::Less)
        );
        assert_eq!(SqlValue::from("abc").compare(&SqlValue::Integer(1)), None);
        assert_eq!(SqlValue::Boolean(true), SqlValue::Boolean(true));
    }
}
