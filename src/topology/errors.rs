use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TopologyError {
    #[error("another thread holds the topology write lock")]
    WriterConflict,

    #[error("the current thread does not hold the topology write lock")]
    NotWriter,

    #[error("no vertex table for label `{label}`")]
    UnknownVertexLabel { label: String },

    #[error("invalid topology definition: {message}")]
    InvalidDefinition { message: String },

    #[error("failed to parse topology definition: {message}")]
    ParseError { message: String },
}
