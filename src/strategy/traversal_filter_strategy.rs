//! Inlines filter wrappers into barrier-backed equivalents so their child
//! pipelines become visible to later passes.

use crate::traversal::{GraphKind, Pipeline, StepKind};

pub struct TraversalFilterStrategy;

impl TraversalFilterStrategy {
    pub fn apply(pipeline: &mut Pipeline) {
        if pipeline.graph() != GraphKind::Relational {
            return;
        }
        for step in pipeline.steps_mut() {
            let StepKind::FilterTraversal { pipeline: child } = &step.kind else {
                continue;
            };
            // a reducing barrier inside the child changes its cardinality
            // semantics; leave those wrappers to the host
            if child.contains_reducing_barrier() {
                continue;
            }
            let kind = std::mem::replace(&mut step.kind, StepKind::Identity);
            let StepKind::FilterTraversal { pipeline: child } = kind else {
                unreachable!()
            };
            step.kind = StepKind::FilterBarrier { pipeline: child };
        }
    }
}
