//! Arena-backed tree of replaced steps with a construction cursor.
//!
//! The strategy appends nodes as it folds navigation steps; the SQL builder
//! later walks the finished tree. Nodes are addressed by stable indices so
//! the host pipeline can refer back to plan positions without owning them.

use crate::predicate::HasContainer;
use crate::traversal::OrderComparator;

use super::replaced_step::ReplacedStep;

pub type NodeIndex = usize;

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub step: ReplacedStep,
    pub parent: Option<NodeIndex>,
    pub children: Vec<NodeIndex>,
}

#[derive(Debug, Clone)]
pub struct ReplacedStepTree {
    nodes: Vec<TreeNode>,
    cursor: NodeIndex,
    order_by: Vec<OrderComparator>,
}

impl ReplacedStepTree {
    /// Establishes the root. The root is always the source step at depth 0.
    pub fn new(mut root: ReplacedStep) -> Self {
        debug_assert!(root.is_source(), "tree root must be a source step");
        root.depth = 0;
        ReplacedStepTree {
            nodes: vec![TreeNode {
                step: root,
                parent: None,
                children: Vec::new(),
            }],
            cursor: 0,
            order_by: Vec::new(),
        }
    }

    /// Appends a step as a child of the cursor and advances the cursor to
    /// the new node.
    pub fn add_replaced(&mut self, mut step: ReplacedStep) -> NodeIndex {
        debug_assert!(!step.is_source(), "only the root may be a source step");
        let parent = self.cursor;
        step.depth = self.nodes[parent].step.depth + 1;
        let index = self.nodes.len();
        self.nodes.push(TreeNode {
            step,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(index);
        self.cursor = index;
        index
    }

    pub fn add_filters(&mut self, node: NodeIndex, containers: Vec<HasContainer>) {
        self.nodes[node].step.has_containers.extend(containers);
    }

    pub fn add_label(&mut self, node: NodeIndex, label: String) {
        self.nodes[node].step.add_label(label);
    }

    pub fn cursor(&self) -> NodeIndex {
        self.cursor
    }

    pub fn node(&self, index: NodeIndex) -> &TreeNode {
        &self.nodes[index]
    }

    pub fn root(&self) -> &TreeNode {
        &self.nodes[0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Folded trailing ordering, applied to the cursor step's elements.
    pub fn set_order_by(&mut self, comparators: Vec<OrderComparator>) {
        self.order_by = comparators;
    }

    pub fn order_by(&self) -> &[OrderComparator] {
        &self.order_by
    }

    pub fn steps(&self) -> impl Iterator<Item = &ReplacedStep> {
        self.nodes.iter().map(|n| &n.step)
    }

    /// Pre-order walk.
    pub fn walk_depth_first(&self, visitor: &mut impl FnMut(NodeIndex, &TreeNode)) {
        self.walk_from(0, visitor);
    }

    fn walk_from(&self, index: NodeIndex, visitor: &mut impl FnMut(NodeIndex, &TreeNode)) {
        visitor(index, &self.nodes[index]);
        // children are cloned indices to keep the borrow local
        let children = self.nodes[index].children.clone();
        for child in children {
            self.walk_from(child, visitor);
        }
    }
}
