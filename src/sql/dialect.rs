//! The narrow SQL-dialect contract the builder compiles against.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::topology::ColumnType;

use super::errors::SqlBuildError;

pub trait SqlDialect: Send + Sync {
    fn name(&self) -> &'static str;

    fn quote(&self, identifier: &str) -> String {
        format!("\"{}\"", identifier.replace('"', "\"\""))
    }

    fn needs_semicolon(&self) -> bool {
        true
    }

    fn limit_clause(&self, n: u64) -> String {
        format!(" LIMIT {n}")
    }

    fn supports_cascade(&self) -> bool {
        true
    }

    fn max_joins_per_select(&self) -> u32 {
        64
    }

    fn max_identifier_length(&self) -> usize;

    /// The case-insensitive LIKE operator, when the dialect has one. Without
    /// it the builder wraps both sides in `LOWER()`.
    fn case_insensitive_like(&self) -> Option<&'static str> {
        None
    }

    /// Appended to LIKE patterns so backslash escapes are honored.
    fn like_escape_clause(&self) -> &'static str {
        ""
    }

    fn sql_type(&self, column_type: ColumnType) -> &'static str;

    fn create_temp_table(&self, name: &str, column: &str, column_type: ColumnType) -> String;

    fn drop_temp_table(&self, name: &str) -> String {
        format!("DROP TABLE IF EXISTS {}", self.quote(name))
    }
}

pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn max_identifier_length(&self) -> usize {
        63
    }

    fn case_insensitive_like(&self) -> Option<&'static str> {
        Some("ILIKE")
    }

    fn sql_type(&self, column_type: ColumnType) -> &'static str {
        match column_type {
            ColumnType::Integer => "BIGINT",
            ColumnType::Float => "DOUBLE PRECISION",
            ColumnType::Text => "TEXT",
            ColumnType::Boolean => "BOOLEAN",
        }
    }

    fn create_temp_table(&self, name: &str, column: &str, column_type: ColumnType) -> String {
        format!(
            "CREATE TEMPORARY TABLE {} ({} {})",
            self.quote(name),
            self.quote(column),
            self.sql_type(column_type)
        )
    }
}

pub struct HsqldbDialect;

impl SqlDialect for HsqldbDialect {
    fn name(&self) -> &'static str {
        "hsqldb"
    }

    fn max_identifier_length(&self) -> usize {
        128
    }

    fn supports_cascade(&self) -> bool {
        false
    }

    fn like_escape_clause(&self) -> &'static str {
        " ESCAPE '\\'"
    }

    fn sql_type(&self, column_type: ColumnType) -> &'static str {
        match column_type {
            ColumnType::Integer => "BIGINT",
            ColumnType::Float => "DOUBLE",
            ColumnType::Text => "LONGVARCHAR",
            ColumnType::Boolean => "BOOLEAN",
        }
    }

    fn create_temp_table(&self, name: &str, column: &str, column_type: ColumnType) -> String {
        format!(
            "DECLARE LOCAL TEMPORARY TABLE {} ({} {})",
            self.quote(name),
            self.quote(column),
            self.sql_type(column_type)
        )
    }
}

type DialectFactory = fn() -> Box<dyn SqlDialect>;

lazy_static! {
    static ref DIALECTS: HashMap<&'static str, DialectFactory> = {
        let mut registry: HashMap<&'static str, DialectFactory> = HashMap::new();
        registry.insert("postgres", || Box::new(PostgresDialect));
        registry.insert("hsqldb", || Box::new(HsqldbDialect));
        registry
    };
}

/// Resolves the dialect named in the compiler configuration.
pub fn dialect_for(name: &str) -> Result<Box<dyn SqlDialect>, SqlBuildError> {
    DIALECTS
        .get(name)
        .map(|factory| factory())
        .ok_or_else(|| SqlBuildError::UnknownDialect {
            name: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_resolves_known_dialects() {
        assert_eq!(dialect_for("postgres").unwrap().name(), "postgres");
        assert_eq!(dialect_for("hsqldb").unwrap().name(), "hsqldb");
        assert!(matches!(
            dialect_for("oracle"),
            Err(SqlBuildError::UnknownDialect { .. })
        ));
    }

    #[test]
    fn quoting_doubles_embedded_quotes() {
        let dialect = PostgresDialect;
        assert_eq!(dialect.quote("na\"me"), "\"na\"\"me\"");
    }

    #[test]
    fn dialect_defaults_cover_the_builder_contract() {
        let postgres = PostgresDialect;
        assert!(postgres.needs_semicolon());
        assert!(postgres.supports_cascade());
        assert_eq!(postgres.limit_clause(10), " LIMIT 10");
        assert_eq!(postgres.max_identifier_length(), 63);
        assert_eq!(postgres.case_insensitive_like(), Some("ILIKE"));

        let hsqldb = HsqldbDialect;
        assert!(!hsqldb.supports_cascade());
        assert_eq!(hsqldb.case_insensitive_like(), None);
        assert!(hsqldb
            .create_temp_table("tmp_in_0", "value", ColumnType::Integer)
            .starts_with("DECLARE LOCAL TEMPORARY TABLE"));
        assert_eq!(hsqldb.drop_temp_table("tmp_in_0"), "DROP TABLE IF EXISTS \"tmp_in_0\"");
    }
}
