use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExecutionError {
    #[error("streaming is in progress, first flush or commit before querying")]
    InvalidState,

    #[error("backend error: {0}")]
    Backend(String),

    #[error("row decode failed: missing column `{alias}`")]
    MissingColumn { alias: String },

    #[error("row decode failed: column `{alias}` has an unexpected type")]
    UnexpectedType { alias: String },
}
