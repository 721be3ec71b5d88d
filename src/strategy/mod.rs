//! Strategy-driven rewriting of host pipelines.
//!
//! `install_strategies` applies the traversal-filter inlining pass and the
//! graph-step folding pass to a pipeline and every child pipeline reachable
//! from it. Both passes are idempotent.

mod compiled_graph_step;
mod graph_step_strategy;
mod traversal_filter_strategy;

pub use compiled_graph_step::{CompileError, CompiledGraphStep};
pub use graph_step_strategy::GraphStepStrategy;
pub use traversal_filter_strategy::TraversalFilterStrategy;

use crate::traversal::{Pipeline, StepKind};

/// Applies the rewriter to the pipeline and every child pipeline reachable
/// from it. Idempotent: re-application leaves an already-rewritten pipeline
/// unchanged.
pub fn install_strategies(pipeline: &mut Pipeline) {
    TraversalFilterStrategy::apply(pipeline);
    GraphStepStrategy::apply(pipeline);
    for child in pipeline.child_pipelines_mut() {
        install_strategies(child);
    }
}

/// Eager planning entry point: rewrites the pipeline and hands back the
/// compiled source step, so callers can plan SQL up front (for example to
/// report `is_for_multiple_queries`).
pub fn compile(pipeline: &mut Pipeline) -> Option<&mut CompiledGraphStep> {
    install_strategies(pipeline);
    pipeline.steps_mut().first_mut().and_then(|step| match &mut step.kind {
        StepKind::Compiled(compiled) => Some(compiled),
        _ => None,
    })
}
