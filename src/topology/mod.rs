//! The topology catalog: which tables back which vertex and edge labels.
//!
//! Compilation only reads the catalog. Mutation is external and follows a
//! single-writer contract: uncommitted additions are visible to the writer
//! thread alone until committed.

mod catalog;
mod config;
mod errors;
mod in_memory;
mod schema_table;

pub use catalog::{ColumnType, EdgeRelation, ResolvedEdge, Topology, VertexTable};
pub use config::{EdgeDefinition, TopologyDefinition, VertexDefinition};
pub use errors::TopologyError;
pub use in_memory::InMemoryTopology;
pub use schema_table::{SchemaTable, EDGE_PREFIX, ID_COLUMN, VERTEX_PREFIX};
