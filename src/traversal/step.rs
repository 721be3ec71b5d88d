//! Host pipeline steps.

use crate::predicate::HasContainer;
use crate::strategy::CompiledGraphStep;
use crate::traversal::Pipeline;
use crate::types::{Direction, ElementClass, ElementId};

/// Ordering criterion of an order step. Only `Property` comparators have a
/// SQL rendering; a `Custom` comparator keeps the step in the host pipeline
/// and ends the pushdown prefix.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderComparator {
    Property { key: String, descending: bool },
    Custom,
}

impl OrderComparator {
    pub fn asc(key: impl Into<String>) -> Self {
        OrderComparator::Property {
            key: key.into(),
            descending: false,
        }
    }

    pub fn desc(key: impl Into<String>) -> Self {
        OrderComparator::Property {
            key: key.into(),
            descending: true,
        }
    }
}

#[derive(Debug, Clone)]
pub enum StepKind {
    /// Source step: `V()` / `E()`, optionally restricted to ids.
    Graph {
        element: ElementClass,
        ids: Vec<ElementId>,
    },
    /// Filter step holding has-containers.
    Has { containers: Vec<HasContainer> },
    /// Edge navigation: `out`/`in`/`both` produce vertices, `outE`/`inE`/
    /// `bothE` produce edges. From an edge, `outV`/`inV` produce the
    /// endpoint vertices (with no label constraint).
    Navigate {
        direction: Direction,
        element: ElementClass,
        edge_labels: Vec<String>,
    },
    Identity,
    /// Path materialization; ends the pushdown prefix.
    Path,
    /// Tree materialization; ends the pushdown prefix.
    Tree,
    Order { comparators: Vec<OrderComparator> },
    /// Label consumer (`select('a')`); interpreted by the host.
    Select { keys: Vec<String> },
    /// Property projection (`values('name')`); interpreted by the host.
    Properties { keys: Vec<String> },
    /// Reducing barrier (`count()`); interpreted by the host.
    Count,
    /// Filter wrapper carrying a child pipeline (`where(...)`).
    FilterTraversal { pipeline: Pipeline },
    /// Barrier-backed replacement for a filter wrapper, produced by the
    /// traversal-filter strategy.
    FilterBarrier { pipeline: Pipeline },
    /// The folded source step carrying the replaced-step tree.
    Compiled(CompiledGraphStep),
}

/// One host step: a kind plus any traversal labels (`as('x')`) attached.
#[derive(Debug, Clone)]
pub struct Step {
    pub kind: StepKind,
    pub labels: Vec<String>,
}

impl Step {
    pub fn new(kind: StepKind) -> Self {
        Step {
            kind,
            labels: Vec::new(),
        }
    }

    pub fn with_labels(kind: StepKind, labels: Vec<String>) -> Self {
        Step { kind, labels }
    }

    /// Builder-style `as('x')`.
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn vertex_source() -> Self {
        Step::new(StepKind::Graph {
            element: ElementClass::Vertex,
            ids: Vec::new(),
        })
    }

    pub fn edge_source() -> Self {
        Step::new(StepKind::Graph {
            element: ElementClass::Edge,
            ids: Vec::new(),
        })
    }

    pub fn vertex_source_with_ids(ids: Vec<ElementId>) -> Self {
        Step::new(StepKind::Graph {
            element: ElementClass::Vertex,
            ids,
        })
    }

    pub fn has(containers: Vec<HasContainer>) -> Self {
        Step::new(StepKind::Has { containers })
    }

    pub fn out(edge_labels: &[&str]) -> Self {
        Step::navigate(Direction::Out, ElementClass::Vertex, edge_labels)
    }

    pub fn in_(edge_labels: &[&str]) -> Self {
        Step::navigate(Direction::In, ElementClass::Vertex, edge_labels)
    }

    pub fn both(edge_labels: &[&str]) -> Self {
        Step::navigate(Direction::Both, ElementClass::Vertex, edge_labels)
    }

    pub fn out_e(edge_labels: &[&str]) -> Self {
        Step::navigate(Direction::Out, ElementClass::Edge, edge_labels)
    }

    pub fn in_e(edge_labels: &[&str]) -> Self {
        Step::navigate(Direction::In, ElementClass::Edge, edge_labels)
    }

    pub fn in_v() -> Self {
        Step::navigate(Direction::In, ElementClass::Vertex, &[])
    }

    pub fn out_v() -> Self {
        Step::navigate(Direction::Out, ElementClass::Vertex, &[])
    }

    fn navigate(direction: Direction, element: ElementClass, edge_labels: &[&str]) -> Self {
        Step::new(StepKind::Navigate {
            direction,
            element,
            edge_labels: edge_labels.iter().map(|l| l.to_string()).collect(),
        })
    }

    pub fn identity() -> Self {
        Step::new(StepKind::Identity)
    }

    pub fn path() -> Self {
        Step::new(StepKind::Path)
    }

    pub fn order(comparators: Vec<OrderComparator>) -> Self {
        Step::new(StepKind::Order { comparators })
    }

    pub fn select(keys: &[&str]) -> Self {
        Step::new(StepKind::Select {
            keys: keys.iter().map(|k| k.to_string()).collect(),
        })
    }

    pub fn values(keys: &[&str]) -> Self {
        Step::new(StepKind::Properties {
            keys: keys.iter().map(|k| k.to_string()).collect(),
        })
    }

    pub fn filter_traversal(pipeline: Pipeline) -> Self {
        Step::new(StepKind::FilterTraversal { pipeline })
    }
}
