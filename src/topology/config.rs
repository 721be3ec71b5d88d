//! Declarative topology definition, loadable from YAML.
//!
//! ```yaml
//! schema: public
//! vertices:
//!   - label: person
//!     columns:
//!       name: text
//!       age: integer
//! edges:
//!   - label: knows
//!     out: person
//!     in: person
//!     columns:
//!       weight: float
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::catalog::{ColumnType, EdgeRelation, VertexTable};
use super::errors::TopologyError;
use super::in_memory::InMemoryTopology;
use super::schema_table::SchemaTable;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexDefinition {
    pub label: String,
    #[serde(default)]
    pub columns: BTreeMap<String, ColumnType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeDefinition {
    pub label: String,
    #[serde(rename = "out")]
    pub out_label: String,
    #[serde(rename = "in")]
    pub in_label: String,
    #[serde(default)]
    pub columns: BTreeMap<String, ColumnType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyDefinition {
    pub schema: String,
    #[serde(default)]
    pub vertices: Vec<VertexDefinition>,
    #[serde(default)]
    pub edges: Vec<EdgeDefinition>,
}

impl TopologyDefinition {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, TopologyError> {
        serde_yaml::from_str(yaml).map_err(|e| TopologyError::ParseError {
            message: e.to_string(),
        })
    }

    /// Every edge endpoint must name a defined vertex label.
    pub fn validate(&self) -> Result<(), TopologyError> {
        for edge in &self.edges {
            for endpoint in [&edge.out_label, &edge.in_label] {
                if !self.vertices.iter().any(|v| &v.label == endpoint) {
                    return Err(TopologyError::InvalidDefinition {
                        message: format!(
                            "edge `{}` references undefined vertex label `{}`",
                            edge.label, endpoint
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

impl InMemoryTopology {
    /// Builds a committed catalog from a YAML definition.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, TopologyError> {
        let definition = TopologyDefinition::from_yaml_str(yaml)?;
        InMemoryTopology::from_definition(&definition)
    }

    pub fn from_definition(definition: &TopologyDefinition) -> Result<Self, TopologyError> {
        definition.validate()?;
        let topology = InMemoryTopology::new();
        topology.begin_write().expect("fresh topology has no writer");
        for vertex in &definition.vertices {
            topology.add_vertex_table(VertexTable {
                table: SchemaTable::for_vertex(&definition.schema, &vertex.label),
                columns: vertex
                    .columns
                    .iter()
                    .map(|(name, ty)| (name.clone(), *ty))
                    .collect(),
            })?;
        }
        for edge in &definition.edges {
            let out_vertex = SchemaTable::for_vertex(&definition.schema, &edge.out_label);
            let in_vertex = SchemaTable::for_vertex(&definition.schema, &edge.in_label);
            let out_fk = format!("{}.{}__O", out_vertex.schema, out_vertex.table);
            let in_fk = format!("{}.{}__I", in_vertex.schema, in_vertex.table);
            topology.add_edge_relation(EdgeRelation {
                table: SchemaTable::for_edge(&definition.schema, &edge.label),
                columns: edge.columns.iter().map(|(name, ty)| (name.clone(), *ty)).collect(),
                out_vertex,
                in_vertex,
                out_fk,
                in_fk,
            })?;
        }
        topology.commit()?;
        Ok(topology)
    }
}
