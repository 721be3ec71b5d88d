//! Table-candidate enumeration, label narrowing and topology misses.

use super::{folded_tree, modern_topology, test_config};
use crate::config::CompilerConfig;
use crate::predicate::{HasContainer, Predicate};
use crate::sql::{build_plans, resolve, PostgresDialect, SqlBuildError};
use crate::traversal::{OrderComparator, Step};
use crate::types::ElementClass;

#[test]
fn a_label_filter_narrows_the_root_candidates() {
    let tree = folded_tree(vec![
        Step::vertex_source(),
        Step::has(vec![HasContainer::new("label", Predicate::eq("person"))]),
    ]);
    let trees = resolve(&tree, &modern_topology(), &test_config()).unwrap();
    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0].root.to_string(), "public.V_person");
    // the label filter is consumed structurally, not rendered
    assert!(trees[0].paths[0][0].filters.is_empty());
}

#[test]
fn a_label_membership_filter_keeps_every_named_candidate() {
    let tree = folded_tree(vec![
        Step::vertex_source(),
        Step::has(vec![HasContainer::new(
            "label",
            Predicate::within(["person", "software"]),
        )]),
    ]);
    let trees = resolve(&tree, &modern_topology(), &test_config()).unwrap();
    assert_eq!(trees.len(), 2);
}

#[test]
fn ignoring_label_optimization_reaches_the_same_tables() {
    let steps = || {
        vec![
            Step::vertex_source(),
            Step::has(vec![HasContainer::new("label", Predicate::eq("person"))]),
        ]
    };
    let narrowed = resolve(&folded_tree(steps()), &modern_topology(), &test_config()).unwrap();

    let config = CompilerConfig {
        ignore_label_optimization: true,
        ..CompilerConfig::default()
    };
    let enumerated = resolve(&folded_tree(steps()), &modern_topology(), &config).unwrap();

    assert_eq!(narrowed.len(), 1);
    assert_eq!(enumerated.len(), 1);
    assert_eq!(narrowed[0].root, enumerated[0].root);
}

#[test]
fn an_unknown_label_is_a_topology_miss_when_narrowing() {
    let tree = folded_tree(vec![
        Step::vertex_source(),
        Step::has(vec![HasContainer::new("label", Predicate::eq("ghost"))]),
    ]);
    let error = resolve(&tree, &modern_topology(), &test_config()).unwrap_err();
    assert_eq!(
        error,
        SqlBuildError::MissingLabel {
            label: "ghost".to_string()
        }
    );

    // without narrowing the filter simply admits no candidate
    let config = CompilerConfig {
        ignore_label_optimization: true,
        ..CompilerConfig::default()
    };
    let trees = resolve(&tree, &modern_topology(), &config).unwrap();
    assert!(trees.is_empty());
}

#[test]
fn an_unknown_edge_label_is_a_topology_miss() {
    let tree = folded_tree(vec![Step::vertex_source(), Step::out(&["dislikes"])]);
    let error = resolve(&tree, &modern_topology(), &test_config()).unwrap_err();
    assert_eq!(
        error,
        SqlBuildError::MissingLabel {
            label: "dislikes".to_string()
        }
    );
}

#[test]
fn a_column_absent_everywhere_is_a_topology_miss() {
    let tree = folded_tree(vec![
        Step::vertex_source(),
        Step::has(vec![HasContainer::new("height", Predicate::gt(180))]),
    ]);
    let error = resolve(&tree, &modern_topology(), &test_config()).unwrap_err();
    assert_eq!(
        error,
        SqlBuildError::MissingColumn {
            column: "height".to_string()
        }
    );

    let tree = folded_tree(vec![
        Step::vertex_source(),
        Step::order(vec![OrderComparator::asc("height")]),
    ]);
    let error = resolve(&tree, &modern_topology(), &test_config()).unwrap_err();
    assert!(matches!(error, SqlBuildError::MissingColumn { .. }));
}

#[test]
fn a_column_absent_from_one_table_prunes_that_candidate() {
    // lang exists only on software; person drops out, no error
    let tree = folded_tree(vec![
        Step::vertex_source(),
        Step::has(vec![HasContainer::new("lang", Predicate::eq("java"))]),
    ]);
    let trees = resolve(&tree, &modern_topology(), &test_config()).unwrap();
    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0].root.to_string(), "public.V_software");
}

#[test]
fn navigation_expands_into_edge_and_vertex_nodes() {
    let tree = folded_tree(vec![
        Step::vertex_source(),
        Step::has(vec![HasContainer::new("label", Predicate::eq("person"))]),
        Step::out(&["created"]),
    ]);
    let trees = resolve(&tree, &modern_topology(), &test_config()).unwrap();
    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0].paths.len(), 1);
    let path = &trees[0].paths[0];
    assert_eq!(path.len(), 3);
    assert_eq!(path[0].table.label(), "person");
    assert_eq!(path[1].table.label(), "created");
    assert_eq!(path[1].element, ElementClass::Edge);
    assert!(!path[1].emits);
    assert_eq!(path[2].table.label(), "software");
    assert!(path[2].emits);
}

#[test]
fn both_direction_expands_into_one_path_per_direction() {
    let tree = folded_tree(vec![
        Step::vertex_source(),
        Step::has(vec![HasContainer::new("label", Predicate::eq("person"))]),
        Step::both(&["knows"]),
    ]);
    let trees = resolve(&tree, &modern_topology(), &test_config()).unwrap();
    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0].paths.len(), 2);

    let out_path = &trees[0].paths[0];
    let in_path = &trees[0].paths[1];
    assert_eq!(out_path[1].join.as_ref().unwrap().child_column, "public.V_person__O");
    assert_eq!(in_path[1].join.as_ref().unwrap().child_column, "public.V_person__I");
}

#[test]
fn a_navigation_without_matching_edges_kills_the_candidate() {
    // software has no outgoing edges at all
    let tree = folded_tree(vec![
        Step::vertex_source(),
        Step::has(vec![HasContainer::new("label", Predicate::eq("software"))]),
        Step::out(&["knows"]),
    ]);
    let trees = resolve(&tree, &modern_topology(), &test_config()).unwrap();
    assert!(trees.is_empty());
}

#[test]
fn a_label_filter_on_a_navigation_restricts_the_opposite_vertex() {
    // person -created-> software, person -knows-> person; asking for person
    // targets keeps only the knows path
    let tree = folded_tree(vec![
        Step::vertex_source(),
        Step::has(vec![HasContainer::new("label", Predicate::eq("person"))]),
        Step::out(&[]),
        Step::has(vec![HasContainer::new("label", Predicate::eq("person"))]),
    ]);
    let trees = resolve(&tree, &modern_topology(), &test_config()).unwrap();
    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0].paths.len(), 1);
    assert_eq!(trees[0].paths[0][1].table.label(), "knows");
}

#[test]
fn build_plans_surfaces_misses_before_any_sql_exists() {
    let tree = folded_tree(vec![
        Step::vertex_source(),
        Step::has(vec![HasContainer::new("height", Predicate::gt(180))]),
    ]);
    let error = build_plans(&tree, &modern_topology(), &PostgresDialect, &test_config())
        .unwrap_err();
    assert!(matches!(error, SqlBuildError::MissingColumn { .. }));
}

#[test]
fn resolved_directions_are_concrete() {
    let tree = folded_tree(vec![
        Step::vertex_source(),
        Step::has(vec![HasContainer::new("label", Predicate::eq("person"))]),
        Step::in_(&["created"]),
    ]);
    // created points person -> software, so nothing arrives at person
    let trees = resolve(&tree, &modern_topology(), &test_config()).unwrap();
    assert!(trees.is_empty());

    let tree = folded_tree(vec![
        Step::vertex_source(),
        Step::has(vec![HasContainer::new("label", Predicate::eq("software"))]),
        Step::in_(&["created"]),
    ]);
    let trees = resolve(&tree, &modern_topology(), &test_config()).unwrap();
    assert_eq!(trees.len(), 1);
    let path = &trees[0].paths[0];
    assert_eq!(path[1].join.as_ref().unwrap().child_column, "public.V_software__I");
    assert_eq!(path[2].table.label(), "person");
    assert_eq!(path[1].step_depth, 1);
}
