//! Classifier deciding whether the containers of a single filter step can be
//! absorbed into the SQL plan.

use super::has_container::{Compare, HasContainer, Predicate};

/// The filter shapes the SQL builder knows how to render. Anything that does
/// not classify stays in the host pipeline and terminates the pushdown
/// prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldableShape {
    /// One container with a plain comparison.
    SingleCompare,
    /// Two containers `(>=, <)` on the same key.
    Between,
    /// Two containers `(>, <)` on the same key.
    Inside,
    /// One container whose predicate is `lt OR gt`.
    Outside,
    /// One `within`/`without` container on a non-reserved key.
    Membership,
    /// One text container on a non-reserved key.
    Text,
}

/// Classify the containers of one filter step into exactly one foldable
/// shape, or `None` when the step must be left to the host interpreter.
pub fn classify(containers: &[HasContainer]) -> Option<FoldableShape> {
    if is_single_compare(containers) {
        Some(FoldableShape::SingleCompare)
    } else if is_between(containers) {
        Some(FoldableShape::Between)
    } else if is_inside(containers) {
        Some(FoldableShape::Inside)
    } else if is_outside(containers) {
        Some(FoldableShape::Outside)
    } else if is_membership(containers) {
        Some(FoldableShape::Membership)
    } else if is_text(containers) {
        Some(FoldableShape::Text)
    } else {
        None
    }
}

fn is_single_compare(containers: &[HasContainer]) -> bool {
    match containers {
        [c] => matches!(c.predicate, Predicate::Compare(_, _)),
        _ => false,
    }
}

fn compare_op(container: &HasContainer) -> Option<Compare> {
    match container.predicate {
        Predicate::Compare(op, _) => Some(op),
        _ => None,
    }
}

fn is_between(containers: &[HasContainer]) -> bool {
    match containers {
        [low, high] => {
            low.key == high.key
                && compare_op(low) == Some(Compare::Gte)
                && compare_op(high) == Some(Compare::Lt)
        }
        _ => false,
    }
}

fn is_inside(containers: &[HasContainer]) -> bool {
    match containers {
        [low, high] => {
            low.key == high.key
                && compare_op(low) == Some(Compare::Gt)
                && compare_op(high) == Some(Compare::Lt)
        }
        _ => false,
    }
}

fn is_outside(containers: &[HasContainer]) -> bool {
    match containers {
        [c] => match &c.predicate {
            Predicate::Or(predicates) => matches!(
                predicates.as_slice(),
                [Predicate::Compare(Compare::Lt, _), Predicate::Compare(Compare::Gt, _)]
            ),
            _ => false,
        },
        _ => false,
    }
}

fn is_membership(containers: &[HasContainer]) -> bool {
    match containers {
        [c] => {
            !c.is_reserved_key()
                && matches!(c.predicate, Predicate::Within(_) | Predicate::Without(_))
        }
        _ => false,
    }
}

fn is_text(containers: &[HasContainer]) -> bool {
    match containers {
        [c] => !c.is_reserved_key() && matches!(c.predicate, Predicate::Text(_, _)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{TextPredicate, RESERVED_ID, RESERVED_LABEL};

    fn has(key: &str, p: Predicate) -> HasContainer {
        HasContainer::new(key, p)
    }

    #[test]
    fn single_comparison_classifies() {
        let containers = [has("name", Predicate::eq("marko"))];
        assert_eq!(classify(&containers), Some(FoldableShape::SingleCompare));
    }

    #[test]
    fn label_comparison_still_classifies_as_single() {
        // Reserved keys are excluded from membership and text shapes only.
        let containers = [has(RESERVED_LABEL, Predicate::eq("person"))];
        assert_eq!(classify(&containers), Some(FoldableShape::SingleCompare));
    }

    #[test]
    fn between_requires_gte_then_lt_on_one_key() {
        let containers = [has("age", Predicate::gte(29)), has("age", Predicate::lt(35))];
        assert_eq!(classify(&containers), Some(FoldableShape::Between));

        let reversed = [has("age", Predicate::lt(35)), has("age", Predicate::gte(29))];
        assert_eq!(classify(&reversed), None);

        let split_keys = [has("age", Predicate::gte(29)), has("height", Predicate::lt(35))];
        assert_eq!(classify(&split_keys), None);
    }

    #[test]
    fn inside_requires_gt_then_lt() {
        let containers = [has("age", Predicate::gt(29)), has("age", Predicate::lt(35))];
        assert_eq!(classify(&containers), Some(FoldableShape::Inside));
    }

    #[test]
    fn outside_is_a_two_way_disjunction() {
        let containers = [has("age", Predicate::outside(10, 20))];
        assert_eq!(classify(&containers), Some(FoldableShape::Outside));

        let three_way = [has(
            "age",
            Predicate::Or(vec![
                Predicate::lt(1),
                Predicate::gt(2),
                Predicate::eq(5),
            ]),
        )];
        assert_eq!(classify(&three_way), None);
    }

    #[test]
    fn membership_excludes_reserved_keys() {
        let containers = [has("name", Predicate::within(["marko", "josh"]))];
        assert_eq!(classify(&containers), Some(FoldableShape::Membership));

        let on_label = [has(RESERVED_LABEL, Predicate::within(["person"]))];
        assert_eq!(classify(&on_label), None);
        let on_id = [has(RESERVED_ID, Predicate::without([1, 2]))];
        assert_eq!(classify(&on_id), None);
    }

    #[test]
    fn text_excludes_reserved_keys() {
        let containers = [has("name", Predicate::text(TextPredicate::StartsWith, "mar"))];
        assert_eq!(classify(&containers), Some(FoldableShape::Text));

        let on_label = [has(
            RESERVED_LABEL,
            Predicate::text(TextPredicate::Contains, "per"),
        )];
        assert_eq!(classify(&on_label), None);
    }

    #[test]
    fn unrecognized_shapes_do_not_classify() {
        let empty: [HasContainer; 0] = [];
        assert_eq!(classify(&empty), None);

        let conjunction = [has(
            "age",
            Predicate::And(vec![Predicate::gt(1), Predicate::lt(2)]),
        )];
        assert_eq!(classify(&conjunction), None);

        let three = [
            has("age", Predicate::gte(1)),
            has("age", Predicate::lt(2)),
            has("age", Predicate::neq(3)),
        ];
        assert_eq!(classify(&three), None);
    }
}
