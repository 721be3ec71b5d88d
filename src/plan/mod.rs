//! The in-memory compilation plan: replaced steps and the tree that holds
//! them while the strategy folds the host pipeline.

mod replaced_step;
mod tree;

pub use replaced_step::{ReplacedStep, ReplacedStepKind};
pub use tree::{NodeIndex, ReplacedStepTree, TreeNode};
