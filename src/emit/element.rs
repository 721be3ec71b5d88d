//! Materialized graph elements and the emit unit the host consumes.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::predicate::HasContainer;
use crate::types::{ElementId, SqlValue};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlVertex {
    pub id: ElementId,
    pub label: String,
    pub properties: BTreeMap<String, SqlValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlEdge {
    pub id: ElementId,
    pub label: String,
    pub properties: BTreeMap<String, SqlValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SqlElement {
    Vertex(SqlVertex),
    Edge(SqlEdge),
}

impl SqlElement {
    pub fn id(&self) -> ElementId {
        match self {
            SqlElement::Vertex(v) => v.id,
            SqlElement::Edge(e) => e.id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            SqlElement::Vertex(v) => &v.label,
            SqlElement::Edge(e) => &e.label,
        }
    }

    pub fn properties(&self) -> &BTreeMap<String, SqlValue> {
        match self {
            SqlElement::Vertex(v) => &v.properties,
            SqlElement::Edge(e) => &e.properties,
        }
    }

    pub fn property(&self, key: &str) -> Option<&SqlValue> {
        self.properties().get(key)
    }

    /// Host-side filter evaluation against this element.
    pub fn matches(&self, container: &HasContainer) -> bool {
        container.matches(self.label(), self.id(), self.properties())
    }
}

/// One result unit: the elements along the traversal path, with the
/// traversal labels attached at each position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Emit {
    pub path: Vec<SqlElement>,
    pub labels: Vec<Vec<String>>,
}

impl Emit {
    /// The element the traverser ends on.
    pub fn head(&self) -> &SqlElement {
        self.path.last().expect("an emit path is never empty")
    }
}
