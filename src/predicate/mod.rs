//! Filter predicates and the pushdown-eligibility classifier.

mod foldable;
mod has_container;

pub use foldable::{classify, FoldableShape};
pub use has_container::{
    Compare, HasContainer, Predicate, TextPredicate, RESERVED_ID, RESERVED_LABEL,
};
