//! Folds the eligible prefix of a pipeline into a compiled source step.
//!
//! Walking forward from the source step, adjacent foldable filter steps are
//! absorbed into the current replaced step and supported navigations open a
//! new one. The first step that can neither be absorbed nor skipped ends the
//! prefix; it is a pushdown boundary, not an error. Path- and
//! tree-materialization steps and custom-comparator ordering steps fall out
//! the same way: the compiled step reproduces path structure, so everything
//! before them is safe to fold.

use std::collections::VecDeque;

use log::debug;

use crate::plan::{ReplacedStep, ReplacedStepTree};
use crate::predicate::classify;
use crate::traversal::{GraphKind, OrderComparator, Pipeline, Step, StepKind};
use crate::types::{Direction, ElementClass};

use super::compiled_graph_step::CompiledGraphStep;

pub struct GraphStepStrategy;

impl GraphStepStrategy {
    pub fn apply(pipeline: &mut Pipeline) {
        if pipeline.graph() != GraphKind::Relational {
            return;
        }
        // an already-compiled pipeline falls out here, making re-application
        // a no-op
        let Some(first) = pipeline.steps().first() else {
            return;
        };
        if !matches!(first.kind, StepKind::Graph { .. }) {
            return;
        }

        let mut rest: VecDeque<Step> = pipeline.take_steps().into();
        let source = rest.pop_front().expect("first step checked above");
        let StepKind::Graph { element, ids } = source.kind else {
            unreachable!("first step checked above")
        };

        let mut root = match element {
            ElementClass::Vertex => ReplacedStep::vertex_source(ids),
            ElementClass::Edge => ReplacedStep::edge_source(ids),
        };
        for label in source.labels {
            root.add_label(label);
        }
        let mut tree = ReplacedStepTree::new(root);

        // steps preserved between the compiled step and the unfolded tail
        let mut retained: Vec<Step> = Vec::new();
        let mut current_element = element;

        loop {
            Self::collect_has_steps(&mut rest, &mut tree, &mut retained);
            let absorbable = match rest.front() {
                Some(step) => match &step.kind {
                    StepKind::Navigate {
                        direction,
                        element: target,
                        edge_labels,
                    } => Self::navigation_supported(
                        current_element,
                        *direction,
                        *target,
                        edge_labels,
                    ),
                    _ => false,
                },
                None => false,
            };
            if !absorbable {
                break;
            }
            let step = rest.pop_front().expect("peeked above");
            let StepKind::Navigate {
                direction,
                element: target,
                edge_labels,
            } = step.kind
            else {
                unreachable!("peeked above")
            };
            let mut replaced = ReplacedStep::navigation(direction, target, edge_labels);
            for label in step.labels {
                replaced.add_label(label);
            }
            tree.add_replaced(replaced);
            current_element = target;
        }

        // a trailing ordering over plain property comparators folds too
        if let Some(step) = rest.front() {
            if let StepKind::Order { comparators } = &step.kind {
                let all_plain = comparators
                    .iter()
                    .all(|c| matches!(c, OrderComparator::Property { .. }));
                if all_plain && step.labels.is_empty() {
                    let step = rest.pop_front().expect("peeked above");
                    let StepKind::Order { comparators } = step.kind else {
                        unreachable!("peeked above")
                    };
                    tree.set_order_by(comparators);
                }
            }
        }

        debug!(
            "folded {} replaced step(s), {} step(s) remain in the host pipeline",
            tree.len(),
            retained.len() + rest.len()
        );

        let mut rebuilt = Vec::with_capacity(1 + retained.len() + rest.len());
        rebuilt.push(Step::new(StepKind::Compiled(CompiledGraphStep::new(tree))));
        rebuilt.extend(retained);
        rebuilt.extend(rest);
        pipeline.set_steps(rebuilt);
    }

    /// Absorbs adjacent foldable filter steps into the cursor step and skips
    /// identity steps. A filter step that carried traversal labels leaves an
    /// identity step behind so downstream label consumers still find a step
    /// to bind to; the labels are also recorded on the replaced step for the
    /// emitter.
    fn collect_has_steps(
        rest: &mut VecDeque<Step>,
        tree: &mut ReplacedStepTree,
        retained: &mut Vec<Step>,
    ) {
        loop {
            match rest.front() {
                Some(step)
                    if matches!(
                        &step.kind,
                        StepKind::Has { containers } if classify(containers).is_some()
                    ) =>
                {
                    let step = rest.pop_front().expect("peeked above");
                    let StepKind::Has { containers } = step.kind else {
                        unreachable!("peeked above")
                    };
                    tree.add_filters(tree.cursor(), containers);
                    if !step.labels.is_empty() {
                        for label in &step.labels {
                            tree.add_label(tree.cursor(), label.clone());
                        }
                        retained.push(Step::with_labels(StepKind::Identity, step.labels));
                    }
                }
                Some(step) if matches!(step.kind, StepKind::Identity) => {
                    retained.push(rest.pop_front().expect("peeked above"));
                }
                _ => break,
            }
        }
    }

    /// From a vertex every navigation is supported; from an edge only the
    /// unlabelled `outV`/`inV` endpoint hops are.
    fn navigation_supported(
        current: ElementClass,
        direction: Direction,
        target: ElementClass,
        edge_labels: &[String],
    ) -> bool {
        match current {
            ElementClass::Vertex => true,
            ElementClass::Edge => {
                target == ElementClass::Vertex
                    && direction != Direction::Both
                    && edge_labels.is_empty()
            }
        }
    }
}
