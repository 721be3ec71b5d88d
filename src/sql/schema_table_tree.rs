//! Resolution of the replaced-step tree against the topology.
//!
//! Each replaced step binds to one or more concrete tables: the source to
//! its candidate vertex (or edge) tables, each navigation to the edge tables
//! matching its label constraint. Alternatives multiply out into root-to-leaf
//! paths; every complete path is a compilable sub-plan and becomes one
//! statement.

use log::debug;

use crate::config::CompilerConfig;
use crate::plan::{ReplacedStep, ReplacedStepKind, ReplacedStepTree};
use crate::predicate::{HasContainer, Predicate};
use crate::topology::{
    ColumnType, EdgeRelation, SchemaTable, Topology, VertexTable, ID_COLUMN,
};
use crate::types::{Direction, ElementClass, ElementId, SqlValue};

use super::errors::SqlBuildError;

/// The foreign-key pair linking a node to its parent in the path.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinColumns {
    pub parent_column: String,
    pub child_column: String,
}

/// One resolved table along a path.
#[derive(Debug, Clone)]
pub struct SchemaTableNode {
    pub table: SchemaTable,
    /// Property columns; the `ID` primary key is implicit.
    pub columns: Vec<(String, ColumnType)>,
    pub element: ElementClass,
    /// `None` for the root.
    pub join: Option<JoinColumns>,
    /// Absorbed filters narrowed to this table. Label-keyed filters are
    /// consumed by table selection and never appear here.
    pub filters: Vec<HasContainer>,
    pub step_labels: Vec<String>,
    /// Whether this node contributes an element to the emitted path.
    pub emits: bool,
    /// Depth of the replaced step this node was resolved from.
    pub step_depth: usize,
    /// Source-step id restriction (`V(1, 2)`); root nodes only.
    pub ids: Vec<ElementId>,
    /// The backing relation for edge nodes; used to resolve endpoint hops.
    pub relation: Option<EdgeRelation>,
}

pub type TablePath = Vec<SchemaTableNode>;

/// All complete paths sharing one root candidate table.
#[derive(Debug, Clone)]
pub struct SchemaTableTree {
    pub root: SchemaTable,
    pub paths: Vec<TablePath>,
}

/// Resolves a replaced-step tree into per-root-candidate table trees.
pub fn resolve(
    tree: &ReplacedStepTree,
    topology: &dyn Topology,
    config: &CompilerConfig,
) -> Result<Vec<SchemaTableTree>, SqlBuildError> {
    check_referenced_columns(tree, topology)?;

    let mut all_paths: Vec<TablePath> = Vec::new();
    for chain in step_chains(tree) {
        resolve_chain(&chain, topology, config, &mut all_paths)?;
    }

    // group by root candidate, keeping the stable catalog order
    let mut trees: Vec<SchemaTableTree> = Vec::new();
    for path in all_paths {
        let root = path[0].table.clone();
        match trees.iter_mut().find(|t| t.root == root) {
            Some(tree) => tree.paths.push(path),
            None => trees.push(SchemaTableTree {
                root,
                paths: vec![path],
            }),
        }
    }
    debug!(
        "resolved {} root candidate(s), {} path(s) total",
        trees.len(),
        trees.iter().map(|t| t.paths.len()).sum::<usize>()
    );
    Ok(trees)
}

/// Root-to-leaf step chains of the replaced-step tree.
fn step_chains(tree: &ReplacedStepTree) -> Vec<Vec<ReplacedStep>> {
    let mut chains = Vec::new();
    let mut stack: Vec<(usize, Vec<ReplacedStep>)> = vec![(0, Vec::new())];
    while let Some((index, mut prefix)) = stack.pop() {
        let node = tree.node(index);
        prefix.push(node.step.clone());
        if node.children.is_empty() {
            chains.push(prefix);
        } else {
            for child in node.children.iter().rev() {
                stack.push((*child, prefix.clone()));
            }
        }
    }
    chains
}

/// A column referenced by a filter or ordering must exist somewhere in the
/// catalog; a key that can never bind is a deterministic failure, not an
/// empty result.
fn check_referenced_columns(
    tree: &ReplacedStepTree,
    topology: &dyn Topology,
) -> Result<(), SqlBuildError> {
    for step in tree.steps() {
        for container in &step.has_containers {
            if !container.is_reserved_key() && !topology.column_exists_anywhere(&container.key) {
                return Err(SqlBuildError::MissingColumn {
                    column: container.key.clone(),
                });
            }
        }
    }
    for comparator in tree.order_by() {
        if let crate::traversal::OrderComparator::Property { key, .. } = comparator {
            if !topology.column_exists_anywhere(key) {
                return Err(SqlBuildError::MissingColumn {
                    column: key.clone(),
                });
            }
        }
    }
    Ok(())
}

fn resolve_chain(
    steps: &[ReplacedStep],
    topology: &dyn Topology,
    config: &CompilerConfig,
    out: &mut Vec<TablePath>,
) -> Result<(), SqlBuildError> {
    let source = &steps[0];
    match source.kind {
        ReplacedStepKind::VertexSource => {
            for table in root_vertex_candidates(source, topology, config)? {
                if !label_predicate_admits(source, table.label()) {
                    continue;
                }
                let Some(filters) = narrowed_filters(source, |c| table.has_column(c)) else {
                    continue;
                };
                let node = SchemaTableNode {
                    table: table.table.clone(),
                    columns: table.columns.clone(),
                    element: ElementClass::Vertex,
                    join: None,
                    filters,
                    step_labels: source.step_labels.clone(),
                    emits: true,
                    step_depth: source.depth,
                    ids: source.ids.clone(),
                    relation: None,
                };
                extend_path(vec![node], steps, 1, topology, config, out)?;
            }
        }
        ReplacedStepKind::EdgeSource => {
            for relation in root_edge_candidates(source, topology, config)? {
                if !label_predicate_admits(source, relation.label()) {
                    continue;
                }
                let Some(filters) = narrowed_filters(source, |c| relation.has_column(c)) else {
                    continue;
                };
                let node = SchemaTableNode {
                    table: relation.table.clone(),
                    columns: relation.columns.clone(),
                    element: ElementClass::Edge,
                    join: None,
                    filters,
                    step_labels: source.step_labels.clone(),
                    emits: true,
                    step_depth: source.depth,
                    ids: source.ids.clone(),
                    relation: Some(relation.clone()),
                };
                extend_path(vec![node], steps, 1, topology, config, out)?;
            }
        }
        ReplacedStepKind::Navigation { .. } => {
            unreachable!("chains start at the source step")
        }
    }
    Ok(())
}

fn extend_path(
    prefix: TablePath,
    steps: &[ReplacedStep],
    position: usize,
    topology: &dyn Topology,
    config: &CompilerConfig,
    out: &mut Vec<TablePath>,
) -> Result<(), SqlBuildError> {
    if position == steps.len() {
        out.push(prefix);
        return Ok(());
    }
    let step = &steps[position];
    let ReplacedStepKind::Navigation { direction, element } = step.kind else {
        unreachable!("non-root steps are navigations")
    };
    check_referenced_labels(step, element, topology, config)?;

    let last = prefix.last().expect("path prefix is never empty");
    match last.element {
        ElementClass::Vertex => {
            let resolved =
                topology.edge_relations_from(&last.table, direction, &step.target_labels);
            for edge in resolved {
                match element {
                    ElementClass::Edge => {
                        if !label_predicate_admits(step, edge.relation.label()) {
                            continue;
                        }
                        let Some(filters) =
                            narrowed_filters(step, |c| edge.relation.has_column(c))
                        else {
                            continue;
                        };
                        let node = SchemaTableNode {
                            table: edge.relation.table.clone(),
                            columns: edge.relation.columns.clone(),
                            element: ElementClass::Edge,
                            join: Some(JoinColumns {
                                parent_column: ID_COLUMN.to_string(),
                                child_column: edge.relation.fk_for(edge.direction).to_string(),
                            }),
                            filters,
                            step_labels: step.step_labels.clone(),
                            emits: true,
                            step_depth: step.depth,
                            ids: Vec::new(),
                            relation: Some(edge.relation.clone()),
                        };
                        let mut path = prefix.clone();
                        path.push(node);
                        extend_path(path, steps, position + 1, topology, config, out)?;
                    }
                    ElementClass::Vertex => {
                        if !label_predicate_admits(step, edge.opposite.label()) {
                            continue;
                        }
                        let Some(filters) =
                            narrowed_filters(step, |c| edge.opposite.has_column(c))
                        else {
                            continue;
                        };
                        let edge_node = SchemaTableNode {
                            table: edge.relation.table.clone(),
                            columns: edge.relation.columns.clone(),
                            element: ElementClass::Edge,
                            join: Some(JoinColumns {
                                parent_column: ID_COLUMN.to_string(),
                                child_column: edge.relation.fk_for(edge.direction).to_string(),
                            }),
                            filters: Vec::new(),
                            step_labels: Vec::new(),
                            emits: false,
                            step_depth: step.depth,
                            ids: Vec::new(),
                            relation: Some(edge.relation.clone()),
                        };
                        let vertex_node = SchemaTableNode {
                            table: edge.opposite.table.clone(),
                            columns: edge.opposite.columns.clone(),
                            element: ElementClass::Vertex,
                            join: Some(JoinColumns {
                                parent_column: edge
                                    .relation
                                    .fk_for(opposite(edge.direction))
                                    .to_string(),
                                child_column: ID_COLUMN.to_string(),
                            }),
                            filters,
                            step_labels: step.step_labels.clone(),
                            emits: true,
                            step_depth: step.depth,
                            ids: Vec::new(),
                            relation: None,
                        };
                        let mut path = prefix.clone();
                        path.push(edge_node);
                        path.push(vertex_node);
                        extend_path(path, steps, position + 1, topology, config, out)?;
                    }
                }
            }
        }
        ElementClass::Edge => {
            // outV / inV from an edge position
            if element != ElementClass::Vertex || direction == Direction::Both {
                return Ok(());
            }
            let relation = last
                .relation
                .clone()
                .expect("edge nodes carry their relation");
            let endpoint = match direction {
                Direction::Out => &relation.out_vertex,
                Direction::In => &relation.in_vertex,
                Direction::Both => unreachable!(),
            };
            let Some(vertex) = topology.resolve_vertex_table(endpoint.label()) else {
                return Ok(());
            };
            if !label_predicate_admits(step, vertex.label()) {
                return Ok(());
            }
            let Some(filters) = narrowed_filters(step, |c| vertex.has_column(c)) else {
                return Ok(());
            };
            let node = SchemaTableNode {
                table: vertex.table.clone(),
                columns: vertex.columns.clone(),
                element: ElementClass::Vertex,
                join: Some(JoinColumns {
                    parent_column: relation.fk_for(direction).to_string(),
                    child_column: ID_COLUMN.to_string(),
                }),
                filters,
                step_labels: step.step_labels.clone(),
                emits: true,
                step_depth: step.depth,
                ids: Vec::new(),
                relation: None,
            };
            let mut path = prefix;
            path.push(node);
            extend_path(path, steps, position + 1, topology, config, out)?;
        }
    }
    Ok(())
}

fn opposite(direction: Direction) -> Direction {
    match direction {
        Direction::Out => Direction::In,
        Direction::In => Direction::Out,
        Direction::Both => Direction::Both,
    }
}

fn root_vertex_candidates(
    step: &ReplacedStep,
    topology: &dyn Topology,
    config: &CompilerConfig,
) -> Result<Vec<VertexTable>, SqlBuildError> {
    if !config.ignore_label_optimization {
        if let Some(labels) = narrowing_labels(step) {
            let mut tables = Vec::new();
            for label in labels {
                match topology.resolve_vertex_table(&label) {
                    Some(table) => tables.push(table),
                    None => return Err(SqlBuildError::MissingLabel { label }),
                }
            }
            return Ok(tables);
        }
    }
    Ok(topology.vertex_tables())
}

fn root_edge_candidates(
    step: &ReplacedStep,
    topology: &dyn Topology,
    config: &CompilerConfig,
) -> Result<Vec<EdgeRelation>, SqlBuildError> {
    if !config.ignore_label_optimization {
        if let Some(labels) = narrowing_labels(step) {
            for label in &labels {
                if topology.edge_relations(std::slice::from_ref(label)).is_empty() {
                    return Err(SqlBuildError::MissingLabel {
                        label: label.clone(),
                    });
                }
            }
            return Ok(topology.edge_relations(&labels));
        }
    }
    Ok(topology.edge_relations(&[]))
}

/// Navigation label constraints must name labels the catalog knows.
fn check_referenced_labels(
    step: &ReplacedStep,
    element: ElementClass,
    topology: &dyn Topology,
    config: &CompilerConfig,
) -> Result<(), SqlBuildError> {
    for label in &step.target_labels {
        if topology
            .edge_relations(std::slice::from_ref(label))
            .is_empty()
        {
            return Err(SqlBuildError::MissingLabel {
                label: label.clone(),
            });
        }
    }
    if !config.ignore_label_optimization && element == ElementClass::Vertex {
        if let Some(labels) = narrowing_labels(step) {
            for label in labels {
                if topology.resolve_vertex_table(&label).is_none() {
                    return Err(SqlBuildError::MissingLabel { label });
                }
            }
        }
    }
    Ok(())
}

/// The labels a `label`-keyed equality or membership filter pins down, when
/// there is one to narrow by.
fn narrowing_labels(step: &ReplacedStep) -> Option<Vec<String>> {
    let container = step.label_filter()?;
    match &container.predicate {
        Predicate::Compare(crate::predicate::Compare::Eq, SqlValue::Text(label)) => {
            Some(vec![label.clone()])
        }
        Predicate::Within(values) => {
            let labels: Vec<String> = values
                .iter()
                .filter_map(|v| match v {
                    SqlValue::Text(label) => Some(label.clone()),
                    _ => None,
                })
                .collect();
            (labels.len() == values.len()).then_some(labels)
        }
        _ => None,
    }
}

/// Every label-keyed filter must admit the candidate's label.
fn label_predicate_admits(step: &ReplacedStep, label: &str) -> bool {
    step.has_containers
        .iter()
        .filter(|c| c.is_label_key())
        .all(|c| c.predicate.test(&SqlValue::Text(label.to_string())))
}

/// Drops label-keyed filters (consumed structurally) and prunes the
/// candidate when a property filter names a column its table lacks.
fn narrowed_filters(
    step: &ReplacedStep,
    has_column: impl Fn(&str) -> bool,
) -> Option<Vec<HasContainer>> {
    let mut filters = Vec::new();
    for container in &step.has_containers {
        if container.is_label_key() {
            continue;
        }
        if !container.is_id_key() && !has_column(&container.key) {
            return None;
        }
        filters.push(container.clone());
    }
    Some(filters)
}
