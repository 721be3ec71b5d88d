//! Result emission: decoding rows into graph elements and streaming them
//! back as path-preserving emits.

mod element;
mod errors;
mod executor;
mod result_iterator;

pub use element::{Emit, SqlEdge, SqlElement, SqlVertex};
pub use errors::ExecutionError;
pub use executor::{Row, RowStream, StatementExecutor};
pub use result_iterator::CompiledResultIterator;

#[cfg(test)]
pub use executor::MockStatementExecutor;
