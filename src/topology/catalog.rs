//! Read-side catalog contract consumed by the SQL builder.

use serde::{Deserialize, Serialize};

use crate::types::{Direction, SqlValue};

use super::schema_table::SchemaTable;

/// Column types the adapter maps property values onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Float,
    Text,
    Boolean,
}

impl ColumnType {
    /// Whether a predicate value is type-compatible with this column.
    pub fn matches(&self, value: &SqlValue) -> bool {
        match (self, value) {
            (_, SqlValue::Null) => true,
            (ColumnType::Integer, SqlValue::Integer(_)) => true,
            (ColumnType::Float, SqlValue::Float(_) | SqlValue::Integer(_)) => true,
            (ColumnType::Text, SqlValue::Text(_)) => true,
            (ColumnType::Boolean, SqlValue::Boolean(_)) => true,
            _ => false,
        }
    }
}

/// A vertex table and its property columns, in declaration order. The `ID`
/// primary key column is implicit and not listed here.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexTable {
    pub table: SchemaTable,
    pub columns: Vec<(String, ColumnType)>,
}

impl VertexTable {
    pub fn label(&self) -> &str {
        self.table.label()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|(name, _)| name == column)
    }

    pub fn column_type(&self, column: &str) -> Option<ColumnType> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, ty)| *ty)
    }
}

/// An edge table together with the foreign-key pair that links it to its
/// endpoint vertex tables.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRelation {
    pub table: SchemaTable,
    pub columns: Vec<(String, ColumnType)>,
    pub out_vertex: SchemaTable,
    pub in_vertex: SchemaTable,
    /// Column holding the id of the out-endpoint vertex.
    pub out_fk: String,
    /// Column holding the id of the in-endpoint vertex.
    pub in_fk: String,
}

impl EdgeRelation {
    pub fn label(&self) -> &str {
        self.table.label()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|(name, _)| name == column)
    }

    /// The fk column on this edge table that points at the given endpoint.
    pub fn fk_for(&self, direction: Direction) -> &str {
        match direction {
            Direction::Out => &self.out_fk,
            Direction::In => &self.in_fk,
            Direction::Both => unreachable!("Both is expanded before fk lookup"),
        }
    }
}

/// One edge table matched during navigation resolution: the relation, the
/// concrete direction it was matched in (`Out`/`In`, never `Both`), and the
/// opposite endpoint table.
#[derive(Debug, Clone)]
pub struct ResolvedEdge {
    pub relation: EdgeRelation,
    pub direction: Direction,
    pub opposite: VertexTable,
}

/// Read operations the compiler needs from the catalog.
pub trait Topology: Send + Sync {
    fn resolve_vertex_table(&self, label: &str) -> Option<VertexTable>;

    /// All vertex tables, in a stable order.
    fn vertex_tables(&self) -> Vec<VertexTable>;

    /// All edge relations, in a stable order, optionally restricted by label.
    fn edge_relations(&self, label_constraint: &[String]) -> Vec<EdgeRelation>;

    /// Edge tables touching `vertex` in the given direction, restricted by
    /// the label constraint (empty = unconstrained). `Both` returns the out-
    /// and in-direction matches in that order.
    fn edge_relations_from(
        &self,
        vertex: &SchemaTable,
        direction: Direction,
        label_constraint: &[String],
    ) -> Vec<ResolvedEdge>;

    fn column_type(&self, table: &SchemaTable, column: &str) -> Option<ColumnType>;

    /// Whether any table in the catalog carries the column. Supports the
    /// distinction between a filter that prunes some candidate tables and a
    /// filter that can never bind anywhere.
    fn column_exists_anywhere(&self, column: &str) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_types_accept_compatible_values() {
        assert!(ColumnType::Integer.matches(&SqlValue::Integer(1)));
        assert!(!ColumnType::Integer.matches(&SqlValue::from("x")));
        assert!(ColumnType::Float.matches(&SqlValue::Integer(1)));
        assert!(ColumnType::Float.matches(&SqlValue::Float(0.5)));
        assert!(ColumnType::Text.matches(&SqlValue::from("x")));
        assert!(ColumnType::Boolean.matches(&SqlValue::Boolean(true)));
        assert!(ColumnType::Text.matches(&SqlValue::Null));
    }

    #[test]
    fn vertex_table_lookups() {
        let table = VertexTable {
            table: SchemaTable::for_vertex("public", "person"),
            columns: vec![
                ("name".to_string(), ColumnType::Text),
                ("age".to_string(), ColumnType::Integer),
            ],
        };
        assert_eq!(table.label(), "person");
        assert!(table.has_column("age"));
        assert!(!table.has_column("lang"));
        assert_eq!(table.column_type("age"), Some(ColumnType::Integer));
        assert_eq!(table.column_type("lang"), None);
    }
}
