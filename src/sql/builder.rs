//! Projection of resolved table paths into SELECT statements.

use log::debug;

use crate::config::CompilerConfig;
use crate::plan::ReplacedStepTree;
use crate::topology::{ColumnType, SchemaTable, Topology, ID_COLUMN};
use crate::traversal::OrderComparator;
use crate::types::ElementClass;

use super::alias_map::AliasMap;
use super::dialect::SqlDialect;
use super::errors::SqlBuildError;
use super::predicate_sql::{render_container, render_literal, render_order_key};
use super::schema_table_tree::{resolve, SchemaTableNode};
use super::statement::{DecodeNode, PathStatement, RootPlan, SqlPartition};
use crate::types::SqlValue;

/// Resolves the replaced-step tree and constructs one statement per
/// root-to-leaf path, split into partitions where the join limit requires.
pub fn build_plans(
    tree: &ReplacedStepTree,
    topology: &dyn Topology,
    dialect: &dyn SqlDialect,
    config: &CompilerConfig,
) -> Result<Vec<RootPlan>, SqlBuildError> {
    if tree.is_empty() {
        return Err(SqlBuildError::EmptyPlan);
    }
    let resolved = resolve(tree, topology, config)?;
    let max_joins = config
        .max_joins_per_statement
        .unwrap_or_else(|| dialect.max_joins_per_select()) as usize;

    let mut plans = Vec::new();
    for table_tree in resolved {
        let mut statements = Vec::new();
        for path in &table_tree.paths {
            statements.push(build_path_statement(
                path,
                tree.order_by(),
                max_joins,
                dialect,
                config,
            )?);
        }
        debug!(
            "root {} compiled into {} statement(s)",
            table_tree.root,
            statements.len()
        );
        plans.push(RootPlan {
            root: table_tree.root,
            statements,
        });
    }
    Ok(plans)
}

fn build_path_statement(
    path: &[SchemaTableNode],
    order_by: &[OrderComparator],
    max_joins: usize,
    dialect: &dyn SqlDialect,
    config: &CompilerConfig,
) -> Result<PathStatement, SqlBuildError> {
    let ranges =
        split_ranges(path, max_joins).ok_or_else(|| SqlBuildError::DialectRejection {
            dialect: dialect.name().to_string(),
            message: format!(
                "plan needs {} joins, the limit is {} per statement and no vertex boundary allows a split",
                path.len() - 1,
                max_joins
            ),
        })?;
    let partitions = ranges
        .iter()
        .enumerate()
        .map(|(k, &(start, end))| {
            build_partition(
                path,
                start,
                end,
                k,
                end < path.len() - 1,
                order_by,
                dialect,
                config,
            )
        })
        .collect();
    Ok(PathStatement { partitions })
}

/// Chunks the path into inclusive node ranges of at most `max_joins` joins
/// each, cutting only at vertex nodes so adjacent partitions can be merged
/// on an element id. `None` when no legal cut exists.
fn split_ranges(path: &[SchemaTableNode], max_joins: usize) -> Option<Vec<(usize, usize)>> {
    let last = path.len() - 1;
    if last <= max_joins {
        return Some(vec![(0, last)]);
    }
    let mut ranges = Vec::new();
    let mut start = 0;
    while start < last {
        let cap = (start + max_joins).min(last);
        let end = (start + 1..=cap)
            .rev()
            .find(|&i| i == last || path[i].element == ElementClass::Vertex)?;
        ranges.push((start, end));
        start = end;
        if end == last {
            break;
        }
    }
    Some(ranges)
}

#[allow(clippy::too_many_arguments)]
fn build_partition(
    path: &[SchemaTableNode],
    start: usize,
    end: usize,
    partition_index: usize,
    has_next: bool,
    order_by: &[OrderComparator],
    dialect: &dyn SqlDialect,
    config: &CompilerConfig,
) -> SqlPartition {
    let max_len = dialect.max_identifier_length();
    let local = |i: usize| format!("t{}", i - start);

    let mut alias_map = AliasMap::new();
    let mut select_items: Vec<String> = Vec::new();
    let mut decode_nodes = Vec::new();
    let mut scratch_tables = Vec::new();

    // a re-rooted partition leads with the boundary id it is merged on
    let mut boundary_in_alias = None;
    if partition_index > 0 {
        let alias = alias_map.assign(start, ID_COLUMN, max_len);
        select_items.push(select_item(&local(start), ID_COLUMN, &alias, dialect));
        boundary_in_alias = Some(alias);
    }

    let first_full_node = if partition_index > 0 { start + 1 } else { start };
    for (i, node) in path.iter().enumerate().take(end + 1).skip(first_full_node) {
        let id_alias = alias_map.assign(i, ID_COLUMN, max_len);
        select_items.push(select_item(&local(i), ID_COLUMN, &id_alias, dialect));
        let mut column_aliases = Vec::new();
        for (column, _) in &node.columns {
            let alias = alias_map.assign(i, column, max_len);
            select_items.push(select_item(&local(i), column, &alias, dialect));
            column_aliases.push((column.clone(), alias));
        }
        if node.emits {
            decode_nodes.push(DecodeNode {
                position: i,
                table: node.table.clone(),
                element: node.element,
                step_labels: node.step_labels.clone(),
                id_alias,
                column_aliases,
            });
        }
    }

    let mut sql = format!(
        "SELECT {} FROM {} AS {}",
        select_items.join(", "),
        quote_table(&path[start].table, dialect),
        dialect.quote(&local(start))
    );
    for (i, node) in path.iter().enumerate().take(end + 1).skip(start + 1) {
        let join = node.join.as_ref().expect("non-root nodes carry a join");
        sql.push_str(&format!(
            " INNER JOIN {} AS {} ON {}.{} = {}.{}",
            quote_table(&node.table, dialect),
            dialect.quote(&local(i)),
            dialect.quote(&local(i - 1)),
            dialect.quote(&join.parent_column),
            dialect.quote(&local(i)),
            dialect.quote(&join.child_column)
        ));
    }

    // filters of the boundary node were applied by the previous partition
    let mut clauses: Vec<String> = Vec::new();
    for (i, node) in path.iter().enumerate().take(end + 1).skip(first_full_node) {
        if !node.ids.is_empty() {
            clauses.push(render_id_restriction(&local(i), &node.ids, dialect));
        }
        for container in &node.filters {
            let column_type = if container.is_id_key() {
                ColumnType::Integer
            } else {
                node.columns
                    .iter()
                    .find(|(name, _)| name == &container.key)
                    .map(|(_, ty)| *ty)
                    .unwrap_or(ColumnType::Text)
            };
            clauses.push(render_container(
                &local(i),
                container,
                column_type,
                dialect,
                config,
                &mut scratch_tables,
            ));
        }
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }

    // foldable ordering lands on the leaf partition
    if end == path.len() - 1 && !order_by.is_empty() {
        let leaf = &path[end];
        let keys: Vec<String> = order_by
            .iter()
            .filter_map(|comparator| match comparator {
                OrderComparator::Property { key, descending }
                    if leaf.columns.iter().any(|(name, _)| name == key) =>
                {
                    Some(render_order_key(&local(end), key, *descending, dialect))
                }
                _ => None,
            })
            .collect();
        if !keys.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&keys.join(", "));
        }
    }

    if dialect.needs_semicolon() {
        sql.push(';');
    }

    let boundary_out_alias = if has_next {
        alias_map.alias_of(end, ID_COLUMN).map(str::to_string)
    } else {
        None
    };

    SqlPartition {
        sql,
        alias_map,
        decode_nodes,
        scratch_tables,
        boundary_out_alias,
        boundary_in_alias,
    }
}

fn select_item(table_alias: &str, column: &str, alias: &str, dialect: &dyn SqlDialect) -> String {
    format!(
        "{}.{} AS {}",
        dialect.quote(table_alias),
        dialect.quote(column),
        dialect.quote(alias)
    )
}

fn quote_table(table: &SchemaTable, dialect: &dyn SqlDialect) -> String {
    format!(
        "{}.{}",
        dialect.quote(&table.schema),
        dialect.quote(&table.table)
    )
}

fn render_id_restriction(
    table_alias: &str,
    ids: &[crate::types::ElementId],
    dialect: &dyn SqlDialect,
) -> String {
    let column = format!(
        "{}.{}",
        dialect.quote(table_alias),
        dialect.quote(ID_COLUMN)
    );
    match ids {
        [id] => format!("{} = {}", column, render_literal(&SqlValue::Integer(*id))),
        _ => {
            let items: Vec<String> = ids
                .iter()
                .map(|id| render_literal(&SqlValue::Integer(*id)))
                .collect();
            format!("{} IN ({})", column, items.join(", "))
        }
    }
}
