//! A plan node standing in for one or more folded host steps.

use crate::predicate::HasContainer;
use crate::types::{Direction, ElementClass, ElementId};

#[derive(Debug, Clone, PartialEq)]
pub enum ReplacedStepKind {
    /// The `V()` source step.
    VertexSource,
    /// The `E()` source step.
    EdgeSource,
    /// An edge navigation away from the current element.
    Navigation {
        direction: Direction,
        element: ElementClass,
    },
}

/// One node of the compilation plan: the folded step kind, the labels it
/// navigates to, the filters absorbed into it and the traversal labels that
/// must re-appear on the emitted path position.
#[derive(Debug, Clone)]
pub struct ReplacedStep {
    pub kind: ReplacedStepKind,
    /// Edge labels for navigations; empty means unconstrained.
    pub target_labels: Vec<String>,
    /// Element ids from the source step (`V(1, 2)`); source steps only.
    pub ids: Vec<ElementId>,
    /// Absorbed filter clauses, in the order they were folded.
    pub has_containers: Vec<HasContainer>,
    /// Traversal labels (`as('x')`) carried over from folded host steps,
    /// insertion-ordered and deduplicated.
    pub step_labels: Vec<String>,
    /// Distance from the source step; assigned by the tree.
    pub depth: usize,
}

impl ReplacedStep {
    pub fn vertex_source(ids: Vec<ElementId>) -> Self {
        ReplacedStep::new(ReplacedStepKind::VertexSource, Vec::new(), ids)
    }

    pub fn edge_source(ids: Vec<ElementId>) -> Self {
        ReplacedStep::new(ReplacedStepKind::EdgeSource, Vec::new(), ids)
    }

    pub fn navigation(
        direction: Direction,
        element: ElementClass,
        target_labels: Vec<String>,
    ) -> Self {
        ReplacedStep::new(
            ReplacedStepKind::Navigation { direction, element },
            target_labels,
            Vec::new(),
        )
    }

    fn new(kind: ReplacedStepKind, target_labels: Vec<String>, ids: Vec<ElementId>) -> Self {
        ReplacedStep {
            kind,
            target_labels,
            ids,
            has_containers: Vec::new(),
            step_labels: Vec::new(),
            depth: 0,
        }
    }

    pub fn is_source(&self) -> bool {
        matches!(
            self.kind,
            ReplacedStepKind::VertexSource | ReplacedStepKind::EdgeSource
        )
    }

    /// The element class this step leaves the traverser on.
    pub fn element(&self) -> ElementClass {
        match self.kind {
            ReplacedStepKind::VertexSource => ElementClass::Vertex,
            ReplacedStepKind::EdgeSource => ElementClass::Edge,
            ReplacedStepKind::Navigation { element, .. } => element,
        }
    }

    pub fn emits_edges(&self) -> bool {
        self.element() == ElementClass::Edge
    }

    pub fn add_label(&mut self, label: String) {
        if !self.step_labels.contains(&label) {
            self.step_labels.push(label);
        }
    }

    /// The absorbed `label`-keyed filter, if any; consumed structurally
    /// during table resolution.
    pub fn label_filter(&self) -> Option<&HasContainer> {
        self.has_containers.iter().find(|c| c.is_label_key())
    }
}
