//! SQL construction: dialect contract, plan resolution, alias bookkeeping
//! and statement generation.

mod alias_map;
mod builder;
mod dialect;
mod errors;
mod predicate_sql;
mod schema_table_tree;
mod statement;

#[cfg(test)]
mod tests;

pub use alias_map::AliasMap;
pub use builder::build_plans;
pub use dialect::{dialect_for, HsqldbDialect, PostgresDialect, SqlDialect};
pub use errors::SqlBuildError;
pub use predicate_sql::SCRATCH_VALUE_COLUMN;
pub use schema_table_tree::{resolve, JoinColumns, SchemaTableNode, SchemaTableTree, TablePath};
pub use statement::{DecodeNode, PathStatement, RootPlan, ScratchTable, SqlPartition};
