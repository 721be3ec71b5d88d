//! Streaming reconstruction of emits from executed statements.
//!
//! The iterator drives one statement at a time. Split statements execute
//! their re-rooted partitions eagerly into id-keyed lookup maps, then stream
//! the driving partition and merge on the boundary element id. Each `next()`
//! performs bounded work: at most one driver row is consumed per call once
//! a statement is active.

use std::collections::{BTreeMap, HashMap, VecDeque};

use log::{debug, warn};

use crate::sql::{DecodeNode, RootPlan, SqlPartition};
use crate::types::{ElementClass, ElementId, SqlValue};

use super::element::{Emit, SqlEdge, SqlElement, SqlVertex};
use super::errors::ExecutionError;
use super::executor::{Row, RowStream, StatementExecutor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IteratorState {
    Init,
    Streaming,
    Done,
    Failed,
}

type DecodedElement = (usize, SqlElement, Vec<String>);

struct ActiveStatement {
    driver: RowStream,
    driver_partition: SqlPartition,
    lookups: Vec<(SqlPartition, HashMap<ElementId, Vec<Row>>)>,
    pending: VecDeque<Emit>,
}

enum StepOutcome {
    Joined(Result<Vec<Emit>, ExecutionError>),
    Error(ExecutionError),
    Exhausted,
    NeedStatement,
}

pub struct CompiledResultIterator<'a> {
    executor: &'a dyn StatementExecutor,
    plans: Vec<RootPlan>,
    state: IteratorState,
    root_index: usize,
    statement_index: usize,
    active: Option<ActiveStatement>,
    /// Drop statements for scratch tables created so far.
    pending_drops: Vec<String>,
}

impl<'a> std::fmt::Debug for CompiledResultIterator<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledResultIterator")
            .field("state", &self.state)
            .field("root_index", &self.root_index)
            .field("statement_index", &self.statement_index)
            .field("pending_drops", &self.pending_drops)
            .finish()
    }
}

impl<'a> CompiledResultIterator<'a> {
    pub fn new(executor: &'a dyn StatementExecutor, plans: Vec<RootPlan>) -> Self {
        CompiledResultIterator {
            executor,
            plans,
            state: IteratorState::Init,
            root_index: 0,
            statement_index: 0,
            active: None,
            pending_drops: Vec::new(),
        }
    }

    /// Returns to the initial state, releasing result-set state and scratch
    /// tables. The next `next()` re-executes from scratch.
    pub fn reset(&mut self) {
        self.active = None;
        self.drop_scratch_tables();
        self.state = IteratorState::Init;
        self.root_index = 0;
        self.statement_index = 0;
    }

    fn drop_scratch_tables(&mut self) {
        for drop_sql in self.pending_drops.drain(..) {
            if let Err(error) = self.executor.execute_statement(&drop_sql) {
                warn!("failed to drop scratch table: {error}");
            }
        }
    }

    fn fail(&mut self, error: ExecutionError) -> Option<Result<Emit, ExecutionError>> {
        self.active = None;
        self.drop_scratch_tables();
        self.state = IteratorState::Failed;
        Some(Err(error))
    }

    /// Loads the next statement, creating its scratch tables and the lookup
    /// maps for any re-rooted partitions. `Ok(false)` when none are left.
    fn activate_next(&mut self) -> Result<bool, ExecutionError> {
        loop {
            let Some(plan) = self.plans.get(self.root_index) else {
                return Ok(false);
            };
            let Some(statement) = plan.statements.get(self.statement_index) else {
                self.root_index += 1;
                self.statement_index = 0;
                continue;
            };
            let statement = statement.clone();
            self.statement_index += 1;

            for partition in &statement.partitions {
                for scratch in &partition.scratch_tables {
                    debug!("creating scratch table {}", scratch.name);
                    self.executor.execute_statement(&scratch.create_sql)?;
                    self.pending_drops.push(scratch.drop_sql.clone());
                    self.executor.execute_statement(&scratch.insert_sql)?;
                }
            }

            let mut lookups = Vec::new();
            for partition in statement.partitions.iter().skip(1) {
                let boundary_alias = partition
                    .boundary_in_alias
                    .clone()
                    .expect("re-rooted partitions carry a boundary alias");
                let mut keyed: HashMap<ElementId, Vec<Row>> = HashMap::new();
                for row in self.executor.execute_query(&partition.sql)? {
                    let row = row?;
                    let key = integer_column(&row, &boundary_alias)?;
                    keyed.entry(key).or_default().push(row);
                }
                lookups.push((partition.clone(), keyed));
            }

            let driver_partition = statement.partitions[0].clone();
            let driver = self.executor.execute_query(&driver_partition.sql)?;
            self.active = Some(ActiveStatement {
                driver,
                driver_partition,
                lookups,
                pending: VecDeque::new(),
            });
            return Ok(true);
        }
    }
}

impl Iterator for CompiledResultIterator<'_> {
    type Item = Result<Emit, ExecutionError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            IteratorState::Done | IteratorState::Failed => return None,
            IteratorState::Init => {
                self.state = IteratorState::Streaming;
                self.root_index = 0;
                self.statement_index = 0;
            }
            IteratorState::Streaming => {}
        }
        loop {
            let outcome = if let Some(active) = self.active.as_mut() {
                if let Some(emit) = active.pending.pop_front() {
                    return Some(Ok(emit));
                }
                match active.driver.next() {
                    Some(Ok(row)) => StepOutcome::Joined(join_row(active, &row)),
                    Some(Err(error)) => StepOutcome::Error(error),
                    None => StepOutcome::Exhausted,
                }
            } else {
                StepOutcome::NeedStatement
            };

            match outcome {
                StepOutcome::Joined(Ok(emits)) => {
                    let active = self.active.as_mut().expect("statement is active");
                    active.pending.extend(emits);
                }
                StepOutcome::Joined(Err(error)) | StepOutcome::Error(error) => {
                    return self.fail(error)
                }
                StepOutcome::Exhausted => {
                    // the alias maps of a consumed statement are reset
                    let mut finished = self.active.take().expect("statement is active");
                    finished.driver_partition.alias_map.reset();
                    for (partition, _) in finished.lookups.iter_mut() {
                        partition.alias_map.reset();
                    }
                }
                StepOutcome::NeedStatement => match self.activate_next() {
                    Ok(true) => {}
                    Ok(false) => {
                        self.drop_scratch_tables();
                        self.state = IteratorState::Done;
                        return None;
                    }
                    Err(error) => return self.fail(error),
                },
            }
        }
    }
}

impl Drop for CompiledResultIterator<'_> {
    fn drop(&mut self) {
        self.drop_scratch_tables();
    }
}

fn join_row(active: &ActiveStatement, row: &Row) -> Result<Vec<Emit>, ExecutionError> {
    let base = decode_nodes(&active.driver_partition.decode_nodes, row)?;
    if active.lookups.is_empty() {
        return Ok(vec![assemble(base)]);
    }
    let boundary_alias = active
        .driver_partition
        .boundary_out_alias
        .as_ref()
        .expect("split driver carries a boundary alias");
    let boundary = integer_column(row, boundary_alias)?;
    let mut emits = Vec::new();
    expand_chain(&active.lookups, 0, boundary, &base, &mut emits)?;
    Ok(emits)
}

fn expand_chain(
    lookups: &[(SqlPartition, HashMap<ElementId, Vec<Row>>)],
    depth: usize,
    boundary: ElementId,
    prefix: &[DecodedElement],
    out: &mut Vec<Emit>,
) -> Result<(), ExecutionError> {
    let (partition, keyed) = &lookups[depth];
    let Some(rows) = keyed.get(&boundary) else {
        return Ok(());
    };
    for row in rows {
        let mut chain = prefix.to_vec();
        chain.extend(decode_nodes(&partition.decode_nodes, row)?);
        if depth + 1 == lookups.len() {
            out.push(assemble(chain));
        } else {
            let next_alias = partition
                .boundary_out_alias
                .as_ref()
                .expect("middle partitions carry a boundary alias");
            let next = integer_column(row, next_alias)?;
            expand_chain(lookups, depth + 1, next, &chain, out)?;
        }
    }
    Ok(())
}

fn assemble(mut decoded: Vec<DecodedElement>) -> Emit {
    decoded.sort_by_key(|(position, _, _)| *position);
    let mut path = Vec::with_capacity(decoded.len());
    let mut labels = Vec::with_capacity(decoded.len());
    for (_, element, step_labels) in decoded {
        path.push(element);
        labels.push(step_labels);
    }
    Emit { path, labels }
}

fn decode_nodes(nodes: &[DecodeNode], row: &Row) -> Result<Vec<DecodedElement>, ExecutionError> {
    nodes
        .iter()
        .map(|node| {
            let id = integer_column(row, &node.id_alias)?;
            let mut properties = BTreeMap::new();
            for (column, alias) in &node.column_aliases {
                match row.get(alias) {
                    Some(SqlValue::Null) | None => {}
                    Some(value) => {
                        properties.insert(column.clone(), value.clone());
                    }
                }
            }
            let label = node.table.label().to_string();
            let element = match node.element {
                ElementClass::Vertex => SqlElement::Vertex(SqlVertex {
                    id,
                    label,
                    properties,
                }),
                ElementClass::Edge => SqlElement::Edge(SqlEdge {
                    id,
                    label,
                    properties,
                }),
            };
            Ok((node.position, element, node.step_labels.clone()))
        })
        .collect()
}

fn integer_column(row: &Row, alias: &str) -> Result<ElementId, ExecutionError> {
    match row.get(alias) {
        Some(SqlValue::Integer(id)) => Ok(*id),
        Some(_) => Err(ExecutionError::UnexpectedType {
            alias: alias.to_string(),
        }),
        None => Err(ExecutionError::MissingColumn {
            alias: alias.to_string(),
        }),
    }
}
