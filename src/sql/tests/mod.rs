//! SQL generation tests: resolution, statement text, alias discipline and
//! splitting, against a small two-label topology.

mod resolution_tests;

use crate::config::CompilerConfig;
use crate::plan::ReplacedStepTree;
use crate::strategy::install_strategies;
use crate::topology::InMemoryTopology;
use crate::traversal::{Pipeline, Step, StepKind};

const MODERN_TOPOLOGY: &str = r#"
schema: public
vertices:
  - label: person
    columns:
      name: text
      age: integer
  - label: software
    columns:
      lang: text
edges:
  - label: knows
    out: person
    in: person
    columns:
      weight: float
  - label: created
    out: person
    in: software
    columns:
      weight: float
"#;

pub fn modern_topology() -> InMemoryTopology {
    InMemoryTopology::from_yaml_str(MODERN_TOPOLOGY).expect("fixture topology parses")
}

/// Folds a pipeline and hands back the replaced-step tree of its compiled
/// source step.
pub fn folded_tree(steps: Vec<Step>) -> ReplacedStepTree {
    let mut pipeline = Pipeline::relational(steps);
    install_strategies(&mut pipeline);
    match &pipeline.steps()[0].kind {
        StepKind::Compiled(compiled) => compiled.replaced_step_tree().clone(),
        other => panic!("pipeline did not compile, first step is {other:?}"),
    }
}

pub fn test_config() -> CompilerConfig {
    CompilerConfig::default()
}
