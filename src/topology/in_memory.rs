//! Process-wide catalog with committed/uncommitted state.
//!
//! Readers take the shared lock on committed state only. A single writer
//! thread stages additions in the uncommitted maps; those are merged into
//! the committed state on `commit` and discarded on `rollback`. Reads from
//! the writer thread itself see the staged additions.

use std::collections::BTreeMap;
use std::sync::{Mutex, RwLock};
use std::thread::{self, ThreadId};

use log::debug;

use crate::types::Direction;

use super::catalog::{ColumnType, EdgeRelation, ResolvedEdge, Topology, VertexTable};
use super::errors::TopologyError;
use super::schema_table::SchemaTable;

#[derive(Debug, Default, Clone)]
struct TopologyState {
    /// vertex label -> table
    vertex_tables: BTreeMap<String, VertexTable>,
    /// edge label -> relations (an edge label may link several vertex pairs)
    edge_relations: BTreeMap<String, Vec<EdgeRelation>>,
}

impl TopologyState {
    fn merge_from(&mut self, other: TopologyState) {
        self.vertex_tables.extend(other.vertex_tables);
        for (label, relations) in other.edge_relations {
            self.edge_relations.entry(label).or_default().extend(relations);
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTopology {
    committed: RwLock<TopologyState>,
    uncommitted: Mutex<TopologyState>,
    writer: Mutex<Option<ThreadId>>,
}

impl InMemoryTopology {
    pub fn new() -> Self {
        InMemoryTopology::default()
    }

    /// Claims the single-writer role for the current thread. Fails when a
    /// different thread already holds it; reentrant for the same thread.
    pub fn begin_write(&self) -> Result<(), TopologyError> {
        let mut writer = self.writer.lock().expect("topology writer lock poisoned");
        match *writer {
            Some(id) if id != thread::current().id() => Err(TopologyError::WriterConflict),
            _ => {
                *writer = Some(thread::current().id());
                Ok(())
            }
        }
    }

    fn ensure_writer(&self) -> Result<(), TopologyError> {
        let writer = self.writer.lock().expect("topology writer lock poisoned");
        match *writer {
            Some(id) if id == thread::current().id() => Ok(()),
            _ => Err(TopologyError::NotWriter),
        }
    }

    fn is_writer(&self) -> bool {
        let writer = self.writer.lock().expect("topology writer lock poisoned");
        *writer == Some(thread::current().id())
    }

    /// Stages a vertex table; visible to the writer thread only until commit.
    pub fn add_vertex_table(&self, table: VertexTable) -> Result<(), TopologyError> {
        self.ensure_writer()?;
        let mut staged = self.uncommitted.lock().expect("topology staging lock poisoned");
        debug!("staging vertex table {}", table.table);
        staged.vertex_tables.insert(table.label().to_string(), table);
        Ok(())
    }

    /// Stages an edge relation; visible to the writer thread only until
    /// commit.
    pub fn add_edge_relation(&self, relation: EdgeRelation) -> Result<(), TopologyError> {
        self.ensure_writer()?;
        let mut staged = self.uncommitted.lock().expect("topology staging lock poisoned");
        debug!("staging edge relation {}", relation.table);
        staged
            .edge_relations
            .entry(relation.label().to_string())
            .or_default()
            .push(relation);
        Ok(())
    }

    /// Publishes staged additions atomically and releases the writer role.
    pub fn commit(&self) -> Result<(), TopologyError> {
        self.ensure_writer()?;
        let staged = {
            let mut staged = self.uncommitted.lock().expect("topology staging lock poisoned");
            std::mem::take(&mut *staged)
        };
        {
            let mut committed = self.committed.write().expect("topology lock poisoned");
            committed.merge_from(staged);
        }
        *self.writer.lock().expect("topology writer lock poisoned") = None;
        Ok(())
    }

    /// Discards staged additions and releases the writer role.
    pub fn rollback(&self) -> Result<(), TopologyError> {
        self.ensure_writer()?;
        let mut staged = self.uncommitted.lock().expect("topology staging lock poisoned");
        *staged = TopologyState::default();
        drop(staged);
        *self.writer.lock().expect("topology writer lock poisoned") = None;
        Ok(())
    }

    /// Runs `read` over the state this thread may observe: committed state,
    /// plus staged additions when the current thread is the writer.
    fn with_visible_state<T>(&self, read: impl FnOnce(&TopologyState) -> T) -> T {
        let committed = self.committed.read().expect("topology lock poisoned");
        if self.is_writer() {
            let staged = self.uncommitted.lock().expect("topology staging lock poisoned");
            let mut merged = committed.clone();
            merged.merge_from(staged.clone());
            read(&merged)
        } else {
            read(&committed)
        }
    }
}

impl Topology for InMemoryTopology {
    fn resolve_vertex_table(&self, label: &str) -> Option<VertexTable> {
        self.with_visible_state(|state| state.vertex_tables.get(label).cloned())
    }

    fn vertex_tables(&self) -> Vec<VertexTable> {
        self.with_visible_state(|state| state.vertex_tables.values().cloned().collect())
    }

    fn edge_relations(&self, label_constraint: &[String]) -> Vec<EdgeRelation> {
        self.with_visible_state(|state| {
            state
                .edge_relations
                .iter()
                .filter(|(label, _)| {
                    label_constraint.is_empty() || label_constraint.contains(label)
                })
                .flat_map(|(_, relations)| relations.iter().cloned())
                .collect()
        })
    }

    fn edge_relations_from(
        &self,
        vertex: &SchemaTable,
        direction: Direction,
        label_constraint: &[String],
    ) -> Vec<ResolvedEdge> {
        let directions: &[Direction] = match direction {
            Direction::Out => &[Direction::Out],
            Direction::In => &[Direction::In],
            Direction::Both => &[Direction::Out, Direction::In],
        };
        self.with_visible_state(|state| {
            let mut resolved = Vec::new();
            for dir in directions {
                for relations in state.edge_relations.iter().filter_map(|(label, relations)| {
                    (label_constraint.is_empty() || label_constraint.contains(label))
                        .then_some(relations)
                }) {
                    for relation in relations {
                        let (near, far) = match dir {
                            Direction::Out => (&relation.out_vertex, &relation.in_vertex),
                            Direction::In => (&relation.in_vertex, &relation.out_vertex),
                            Direction::Both => unreachable!(),
                        };
                        if near != vertex {
                            continue;
                        }
                        let Some(opposite) = state.vertex_tables.get(far.label()).cloned() else {
                            continue;
                        };
                        resolved.push(ResolvedEdge {
                            relation: relation.clone(),
                            direction: *dir,
                            opposite,
                        });
                    }
                }
            }
            resolved
        })
    }

    fn column_type(&self, table: &SchemaTable, column: &str) -> Option<ColumnType> {
        self.with_visible_state(|state| {
            if table.is_vertex_table() {
                state
                    .vertex_tables
                    .get(table.label())
                    .and_then(|t| t.column_type(column))
            } else {
                state
                    .edge_relations
                    .get(table.label())
                    .and_then(|relations| {
                        relations
                            .iter()
                            .find(|r| &r.table == table)
                            .and_then(|r| {
                                r.columns
                                    .iter()
                                    .find(|(name, _)| name == column)
                                    .map(|(_, ty)| *ty)
                            })
                    })
            }
        })
    }

    fn column_exists_anywhere(&self, column: &str) -> bool {
        self.with_visible_state(|state| {
            state
                .vertex_tables
                .values()
                .any(|t| t.has_column(column))
                || state
                    .edge_relations
                    .values()
                    .flatten()
                    .any(|r| r.has_column(column))
        })
    }
}
