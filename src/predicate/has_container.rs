//! Filter clauses as they appear on host filter steps.

use std::collections::BTreeMap;

use crate::types::{ElementId, SqlValue};
use std::cmp::Ordering;

/// Reserved key selecting on the element label rather than a property column.
pub const RESERVED_LABEL: &str = "label";
/// Reserved key selecting on the element id rather than a property column.
pub const RESERVED_ID: &str = "id";

/// Binary comparison operators supported for pushdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compare {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Compare {
    pub fn sql_operator(&self) -> &'static str {
        match self {
            Compare::Eq => "=",
            Compare::Neq => "<>",
            Compare::Gt => ">",
            Compare::Gte => ">=",
            Compare::Lt => "<",
            Compare::Lte => "<=",
        }
    }

    fn test(&self, left: &SqlValue, right: &SqlValue) -> bool {
        match left.compare(right) {
            Some(ord) => match self {
                Compare::Eq => ord == Ordering::Equal,
                Compare::Neq => ord != Ordering::Equal,
                Compare::Gt => ord == Ordering::Greater,
                Compare::Gte => ord != Ordering::Less,
                Compare::Lt => ord == Ordering::Less,
                Compare::Lte => ord != Ordering::Greater,
            },
            None => false,
        }
    }
}

/// Text matching operators. The `Cis` variants are case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPredicate {
    Contains,
    NContains,
    ContainsCis,
    NContainsCis,
    StartsWith,
    NStartsWith,
    EndsWith,
    NEndsWith,
}

impl TextPredicate {
    pub fn is_negated(&self) -> bool {
        matches!(
            self,
            TextPredicate::NContains
                | TextPredicate::NContainsCis
                | TextPredicate::NStartsWith
                | TextPredicate::NEndsWith
        )
    }

    pub fn is_case_insensitive(&self) -> bool {
        matches!(self, TextPredicate::ContainsCis | TextPredicate::NContainsCis)
    }

    fn test(&self, haystack: &str, needle: &str) -> bool {
        let positive = match self {
            TextPredicate::Contains | TextPredicate::NContains => haystack.contains(needle),
            TextPredicate::ContainsCis | TextPredicate::NContainsCis => haystack
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            TextPredicate::StartsWith | TextPredicate::NStartsWith => haystack.starts_with(needle),
            TextPredicate::EndsWith | TextPredicate::NEndsWith => haystack.ends_with(needle),
        };
        positive != self.is_negated()
    }
}

/// A filter predicate attached to a key via a [`HasContainer`].
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare(Compare, SqlValue),
    Within(Vec<SqlValue>),
    Without(Vec<SqlValue>),
    Text(TextPredicate, String),
    Or(Vec<Predicate>),
    And(Vec<Predicate>),
}

impl Predicate {
    pub fn eq(value: impl Into<SqlValue>) -> Self {
        Predicate::Compare(Compare::Eq, value.into())
    }

    pub fn neq(value: impl Into<SqlValue>) -> Self {
        Predicate::Compare(Compare::Neq, value.into())
    }

    pub fn gt(value: impl Into<SqlValue>) -> Self {
        Predicate::Compare(Compare::Gt, value.into())
    }

    pub fn gte(value: impl Into<SqlValue>) -> Self {
        Predicate::Compare(Compare::Gte, value.into())
    }

    pub fn lt(value: impl Into<SqlValue>) -> Self {
        Predicate::Compare(Compare::Lt, value.into())
    }

    pub fn lte(value: impl Into<SqlValue>) -> Self {
        Predicate::Compare(Compare::Lte, value.into())
    }

    pub fn within<V: Into<SqlValue>>(values: impl IntoIterator<Item = V>) -> Self {
        Predicate::Within(values.into_iter().map(Into::into).collect())
    }

    pub fn without<V: Into<SqlValue>>(values: impl IntoIterator<Item = V>) -> Self {
        Predicate::Without(values.into_iter().map(Into::into).collect())
    }

    pub fn text(op: TextPredicate, needle: impl Into<String>) -> Self {
        Predicate::Text(op, needle.into())
    }

    /// `outside(low, high)`: true for values strictly below `low` or strictly
    /// above `high`.
    pub fn outside(low: impl Into<SqlValue>, high: impl Into<SqlValue>) -> Self {
        Predicate::Or(vec![
            Predicate::Compare(Compare::Lt, low.into()),
            Predicate::Compare(Compare::Gt, high.into()),
        ])
    }

    /// Evaluate against a concrete value, the way the host interpreter would.
    pub fn test(&self, value: &SqlValue) -> bool {
        match self {
            Predicate::Compare(op, expected) => op.test(value, expected),
            Predicate::Within(values) => values.iter().any(|v| v == value),
            Predicate::Without(values) => !values.iter().any(|v| v == value),
            Predicate::Text(op, needle) => match value {
                SqlValue::Text(haystack) => op.test(haystack, needle),
                _ => false,
            },
            Predicate::Or(predicates) => predicates.iter().any(|p| p.test(value)),
            Predicate::And(predicates) => predicates.iter().all(|p| p.test(value)),
        }
    }
}

/// One filter clause: `(key, predicate)`. The key is a property name or one
/// of the reserved symbols [`RESERVED_LABEL`] / [`RESERVED_ID`].
#[derive(Debug, Clone, PartialEq)]
pub struct HasContainer {
    pub key: String,
    pub predicate: Predicate,
}

impl HasContainer {
    pub fn new(key: impl Into<String>, predicate: Predicate) -> Self {
        HasContainer {
            key: key.into(),
            predicate,
        }
    }

    pub fn is_label_key(&self) -> bool {
        self.key == RESERVED_LABEL
    }

    pub fn is_id_key(&self) -> bool {
        self.key == RESERVED_ID
    }

    pub fn is_reserved_key(&self) -> bool {
        self.is_label_key() || self.is_id_key()
    }

    /// Evaluate against a materialized element.
    pub fn matches(
        &self,
        label: &str,
        id: ElementId,
        properties: &BTreeMap<String, SqlValue>,
    ) -> bool {
        if self.is_label_key() {
            self.predicate.test(&SqlValue::Text(label.to_string()))
        } else if self.is_id_key() {
            self.predicate.test(&SqlValue::Integer(id))
        } else {
            match properties.get(&self.key) {
                Some(value) => self.predicate.test(value),
                None => false,
            }
        }
    }
}
