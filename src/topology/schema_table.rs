//! The concrete `(schema, table)` pair backing a vertex- or edge-label.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Vertex tables are named `V_<label>`.
pub const VERTEX_PREFIX: &str = "V_";
/// Edge tables are named `E_<label>`.
pub const EDGE_PREFIX: &str = "E_";
/// Every vertex and edge table carries its primary key in this column.
pub const ID_COLUMN: &str = "ID";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaTable {
    pub schema: String,
    pub table: String,
}

impl SchemaTable {
    pub fn of(schema: impl Into<String>, table: impl Into<String>) -> Self {
        SchemaTable {
            schema: schema.into(),
            table: table.into(),
        }
    }

    pub fn for_vertex(schema: impl Into<String>, label: &str) -> Self {
        SchemaTable::of(schema, format!("{VERTEX_PREFIX}{label}"))
    }

    pub fn for_edge(schema: impl Into<String>, label: &str) -> Self {
        SchemaTable::of(schema, format!("{EDGE_PREFIX}{label}"))
    }

    pub fn is_vertex_table(&self) -> bool {
        self.table.starts_with(VERTEX_PREFIX)
    }

    pub fn is_edge_table(&self) -> bool {
        self.table.starts_with(EDGE_PREFIX)
    }

    /// The label this table backs, with the `V_`/`E_` prefix stripped.
    pub fn label(&self) -> &str {
        self.table
            .strip_prefix(VERTEX_PREFIX)
            .or_else(|| self.table.strip_prefix(EDGE_PREFIX))
            .unwrap_or(&self.table)
    }
}

impl fmt::Display for SchemaTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}
