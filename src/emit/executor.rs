//! The narrow execution boundary to the backend.

use std::collections::HashMap;

use crate::types::SqlValue;

use super::errors::ExecutionError;

/// One result row, keyed by column alias.
pub type Row = HashMap<String, SqlValue>;

/// Rows streamed from one statement.
pub type RowStream = Box<dyn Iterator<Item = Result<Row, ExecutionError>> + Send>;

/// Connection and transaction management live outside this crate; the
/// emitter only needs to run a query, run a side-effecting statement
/// (scratch-table DDL/DML) and observe the batch-stream state of the owning
/// transaction.
#[cfg_attr(test, mockall::automock)]
pub trait StatementExecutor: Send + Sync {
    fn execute_query(&self, sql: &str) -> Result<RowStream, ExecutionError>;

    fn execute_statement(&self, sql: &str) -> Result<(), ExecutionError>;

    fn is_batch_streaming(&self) -> bool {
        false
    }
}
