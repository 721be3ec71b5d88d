//! The folded source step: owns the replaced-step tree, plans SQL eagerly
//! on request and hands out the path-preserving result iterator.

use log::debug;
use thiserror::Error;

use crate::config::CompilerConfig;
use crate::emit::{CompiledResultIterator, ExecutionError, StatementExecutor};
use crate::plan::{ReplacedStep, ReplacedStepTree};
use crate::sql::{build_plans, RootPlan, SqlBuildError, SqlDialect};
use crate::topology::Topology;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CompileError {
    #[error("sql construction failed: {0}")]
    Build(#[from] SqlBuildError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

#[derive(Debug, Clone)]
pub struct CompiledGraphStep {
    tree: ReplacedStepTree,
    parsed: Option<Vec<RootPlan>>,
}

impl CompiledGraphStep {
    pub fn new(tree: ReplacedStepTree) -> Self {
        CompiledGraphStep { tree, parsed: None }
    }

    /// The absorbed steps, in fold order.
    pub fn replaced_steps(&self) -> Vec<&ReplacedStep> {
        self.tree.steps().collect()
    }

    pub fn replaced_step_tree(&self) -> &ReplacedStepTree {
        &self.tree
    }

    /// Eager planning: resolves the tree and constructs the statements,
    /// caching them on the step.
    pub fn parse_for_strategy(
        &mut self,
        topology: &dyn Topology,
        dialect: &dyn SqlDialect,
        config: &CompilerConfig,
    ) -> Result<(), SqlBuildError> {
        let plans = build_plans(&self.tree, topology, dialect, config)?;
        debug!(
            "parsed {} root plan(s) for a tree of {} replaced step(s)",
            plans.len(),
            self.tree.len()
        );
        self.parsed = Some(plans);
        Ok(())
    }

    /// The constructed plans, when `parse_for_strategy` has run.
    pub fn plans(&self) -> Option<&[RootPlan]> {
        self.parsed.as_deref()
    }

    /// Whether execution spans more than one statement: several root
    /// candidates, several paths under one root, or a path split at a join
    /// limit. Callers re-impose cross-statement ordering in memory when set.
    pub fn is_for_multiple_queries(&self) -> bool {
        match &self.parsed {
            Some(plans) => {
                plans.len() > 1
                    || plans.iter().any(|plan| {
                        plan.statements.len() > 1
                            || plan.statements.iter().any(|s| s.is_split())
                    })
            }
            None => false,
        }
    }

    /// Statement construction never touches the backend; scratch tables for
    /// large membership lists are materialized at execution time.
    pub fn may_query_during_build(&self) -> bool {
        false
    }

    /// Plans (if not already planned) and begins execution.
    pub fn elements<'a>(
        &mut self,
        topology: &dyn Topology,
        dialect: &dyn SqlDialect,
        config: &CompilerConfig,
        executor: &'a dyn StatementExecutor,
    ) -> Result<CompiledResultIterator<'a>, CompileError> {
        if executor.is_batch_streaming() {
            return Err(CompileError::Execution(ExecutionError::InvalidState));
        }
        if self.parsed.is_none() {
            self.parse_for_strategy(topology, dialect, config)?;
        }
        let plans = self.parsed.clone().expect("plans were just parsed");
        Ok(CompiledResultIterator::new(executor, plans))
    }
}
