//! Rendering of absorbed filters into WHERE expressions.
//!
//! The mapping is fixed: comparisons use their operator, ranges compound
//! with AND, exterior shapes with OR, membership becomes IN/NOT IN (or a
//! scratch-table subselect past the configured threshold) and text becomes
//! LIKE/ILIKE patterns.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::CompilerConfig;
use crate::predicate::{HasContainer, Predicate, TextPredicate};
use crate::topology::{ColumnType, ID_COLUMN};
use crate::types::SqlValue;

use super::dialect::SqlDialect;
use super::statement::ScratchTable;

static SCRATCH_SEQ: AtomicUsize = AtomicUsize::new(0);

/// Column used inside scratch tables.
pub const SCRATCH_VALUE_COLUMN: &str = "value";

pub fn render_literal(value: &SqlValue) -> String {
    match value {
        SqlValue::Integer(i) => i.to_string(),
        SqlValue::Float(f) => f.to_string(),
        SqlValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
        SqlValue::Boolean(true) => "TRUE".to_string(),
        SqlValue::Boolean(false) => "FALSE".to_string(),
        SqlValue::Null => "NULL".to_string(),
    }
}

/// Renders one filter clause against a table alias. Membership predicates
/// past the temp-table threshold register a scratch table and render as a
/// subselect against it.
pub fn render_container(
    table_alias: &str,
    container: &HasContainer,
    column_type: ColumnType,
    dialect: &dyn SqlDialect,
    config: &CompilerConfig,
    scratch_out: &mut Vec<ScratchTable>,
) -> String {
    let column = if container.is_id_key() {
        ID_COLUMN
    } else {
        container.key.as_str()
    };
    let column_sql = format!("{}.{}", dialect.quote(table_alias), dialect.quote(column));
    render_predicate(
        &column_sql,
        &container.predicate,
        column_type,
        dialect,
        config,
        scratch_out,
    )
}

fn render_predicate(
    column_sql: &str,
    predicate: &Predicate,
    column_type: ColumnType,
    dialect: &dyn SqlDialect,
    config: &CompilerConfig,
    scratch_out: &mut Vec<ScratchTable>,
) -> String {
    match predicate {
        Predicate::Compare(op, value) => {
            format!("{} {} {}", column_sql, op.sql_operator(), render_literal(value))
        }
        Predicate::Within(values) => render_membership(
            column_sql,
            values,
            false,
            column_type,
            dialect,
            config,
            scratch_out,
        ),
        Predicate::Without(values) => render_membership(
            column_sql,
            values,
            true,
            column_type,
            dialect,
            config,
            scratch_out,
        ),
        Predicate::Text(op, needle) => render_text(column_sql, *op, needle, dialect),
        Predicate::Or(predicates) => {
            let parts: Vec<String> = predicates
                .iter()
                .map(|p| {
                    render_predicate(column_sql, p, column_type, dialect, config, scratch_out)
                })
                .collect();
            format!("({})", parts.join(" OR "))
        }
        Predicate::And(predicates) => {
            let parts: Vec<String> = predicates
                .iter()
                .map(|p| {
                    render_predicate(column_sql, p, column_type, dialect, config, scratch_out)
                })
                .collect();
            format!("({})", parts.join(" AND "))
        }
    }
}

fn render_membership(
    column_sql: &str,
    values: &[SqlValue],
    negated: bool,
    column_type: ColumnType,
    dialect: &dyn SqlDialect,
    config: &CompilerConfig,
    scratch_out: &mut Vec<ScratchTable>,
) -> String {
    let operator = if negated { "NOT IN" } else { "IN" };
    if values.len() >= config.temp_table_threshold {
        let scratch = new_scratch_table(values, column_type, dialect);
        let subselect = format!(
            "SELECT {} FROM {}",
            dialect.quote(SCRATCH_VALUE_COLUMN),
            dialect.quote(&scratch.name)
        );
        let rendered = format!("{column_sql} {operator} ({subselect})");
        scratch_out.push(scratch);
        rendered
    } else {
        let items: Vec<String> = values.iter().map(render_literal).collect();
        format!("{} {} ({})", column_sql, operator, items.join(", "))
    }
}

fn new_scratch_table(
    values: &[SqlValue],
    column_type: ColumnType,
    dialect: &dyn SqlDialect,
) -> ScratchTable {
    let name = format!("tmp_in_{}", SCRATCH_SEQ.fetch_add(1, Ordering::Relaxed));
    let create_sql = dialect.create_temp_table(&name, SCRATCH_VALUE_COLUMN, column_type);
    let rows: Vec<String> = values
        .iter()
        .map(|v| format!("({})", render_literal(v)))
        .collect();
    let insert_sql = format!(
        "INSERT INTO {} ({}) VALUES {}",
        dialect.quote(&name),
        dialect.quote(SCRATCH_VALUE_COLUMN),
        rows.join(", ")
    );
    let drop_sql = dialect.drop_temp_table(&name);
    ScratchTable {
        name,
        column_type,
        values: values.to_vec(),
        create_sql,
        insert_sql,
        drop_sql,
    }
}

fn render_text(
    column_sql: &str,
    op: TextPredicate,
    needle: &str,
    dialect: &dyn SqlDialect,
) -> String {
    let escaped = escape_like(needle);
    let pattern = match op {
        TextPredicate::Contains
        | TextPredicate::NContains
        | TextPredicate::ContainsCis
        | TextPredicate::NContainsCis => format!("%{escaped}%"),
        TextPredicate::StartsWith | TextPredicate::NStartsWith => format!("{escaped}%"),
        TextPredicate::EndsWith | TextPredicate::NEndsWith => format!("%{escaped}"),
    };
    let pattern_literal = render_literal(&SqlValue::Text(pattern));
    let escape = dialect.like_escape_clause();
    if op.is_case_insensitive() {
        match dialect.case_insensitive_like() {
            Some(ilike) => {
                let operator = if op.is_negated() {
                    format!("NOT {ilike}")
                } else {
                    ilike.to_string()
                };
                format!("{column_sql} {operator} {pattern_literal}{escape}")
            }
            None => {
                let operator = if op.is_negated() { "NOT LIKE" } else { "LIKE" };
                format!("LOWER({column_sql}) {operator} LOWER({pattern_literal}){escape}")
            }
        }
    } else {
        let operator = if op.is_negated() { "NOT LIKE" } else { "LIKE" };
        format!("{column_sql} {operator} {pattern_literal}{escape}")
    }
}

/// Backslash-escapes LIKE metacharacters in the needle.
fn escape_like(needle: &str) -> String {
    needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

pub fn render_order_key(
    table_alias: &str,
    key: &str,
    descending: bool,
    dialect: &dyn SqlDialect,
) -> String {
    format!(
        "{}.{} {}",
        dialect.quote(table_alias),
        dialect.quote(key),
        if descending { "DESC" } else { "ASC" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::dialect::{HsqldbDialect, PostgresDialect};

    fn render(container: &HasContainer, config: &CompilerConfig) -> (String, Vec<ScratchTable>) {
        let mut scratch = Vec::new();
        let sql = render_container(
            "t0",
            container,
            ColumnType::Text,
            &PostgresDialect,
            config,
            &mut scratch,
        );
        (sql, scratch)
    }

    #[test]
    fn comparison_renders_operator_and_literal() {
        let config = CompilerConfig::default();
        let (sql, _) = render(&HasContainer::new("name", Predicate::eq("marko")), &config);
        assert_eq!(sql, "\"t0\".\"name\" = 'marko'");

        let (sql, _) = render(&HasContainer::new("name", Predicate::neq("o'l")), &config);
        assert_eq!(sql, "\"t0\".\"name\" <> 'o''l'");
    }

    #[test]
    fn id_key_renders_against_the_primary_key_column() {
        let config = CompilerConfig::default();
        let (sql, _) = render(&HasContainer::new("id", Predicate::eq(7)), &config);
        assert_eq!(sql, "\"t0\".\"ID\" = 7");
    }

    #[test]
    fn outside_renders_as_reversed_bounds_disjunction() {
        let config = CompilerConfig::default();
        let (sql, _) = render(&HasContainer::new("age", Predicate::outside(10, 20)), &config);
        assert_eq!(sql, "(\"t0\".\"age\" < 10 OR \"t0\".\"age\" > 20)");
    }

    #[test]
    fn small_membership_renders_inline() {
        let config = CompilerConfig::default();
        let (sql, scratch) = render(
            &HasContainer::new("name", Predicate::within(["marko", "josh"])),
            &config,
        );
        assert_eq!(sql, "\"t0\".\"name\" IN ('marko', 'josh')");
        assert!(scratch.is_empty());

        let (sql, _) = render(
            &HasContainer::new("name", Predicate::without(["marko"])),
            &config,
        );
        assert_eq!(sql, "\"t0\".\"name\" NOT IN ('marko')");
    }

    #[test]
    fn membership_past_threshold_uses_a_scratch_table() {
        let config = CompilerConfig {
            temp_table_threshold: 2,
            ..CompilerConfig::default()
        };
        let (sql, scratch) = render(
            &HasContainer::new("name", Predicate::within(["marko", "josh", "peter"])),
            &config,
        );
        assert_eq!(scratch.len(), 1);
        let table = &scratch[0];
        assert!(sql.contains(&format!(
            "IN (SELECT \"value\" FROM \"{}\")",
            table.name
        )));
        assert!(table.create_sql.starts_with("CREATE TEMPORARY TABLE"));
        assert!(table.insert_sql.contains("VALUES ('marko'), ('josh'), ('peter')"));
        assert!(table.drop_sql.starts_with("DROP TABLE"));
        assert_eq!(table.values.len(), 3);
    }

    #[test]
    fn text_predicates_render_like_patterns() {
        let config = CompilerConfig::default();
        let (sql, _) = render(
            &HasContainer::new("name", Predicate::text(TextPredicate::StartsWith, "mar")),
            &config,
        );
        assert_eq!(sql, "\"t0\".\"name\" LIKE 'mar%'");

        let (sql, _) = render(
            &HasContainer::new("name", Predicate::text(TextPredicate::NContains, "ark")),
            &config,
        );
        assert_eq!(sql, "\"t0\".\"name\" NOT LIKE '%ark%'");

        let (sql, _) = render(
            &HasContainer::new("name", Predicate::text(TextPredicate::ContainsCis, "ARK")),
            &config,
        );
        assert_eq!(sql, "\"t0\".\"name\" ILIKE '%ARK%'");
    }

    #[test]
    fn case_insensitive_text_falls_back_to_lower_without_ilike() {
        let config = CompilerConfig::default();
        let mut scratch = Vec::new();
        let sql = render_container(
            "t0",
            &HasContainer::new("name", Predicate::text(TextPredicate::ContainsCis, "ark")),
            ColumnType::Text,
            &HsqldbDialect,
            &config,
            &mut scratch,
        );
        assert_eq!(
            sql,
            "LOWER(\"t0\".\"name\") LIKE LOWER('%ark%') ESCAPE '\\'"
        );
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        let config = CompilerConfig::default();
        let (sql, _) = render(
            &HasContainer::new("name", Predicate::text(TextPredicate::Contains, "100%_a")),
            &config,
        );
        assert_eq!(sql, "\"t0\".\"name\" LIKE '%100\\%\\_a%'");
    }
}
