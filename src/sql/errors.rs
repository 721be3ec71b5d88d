use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SqlBuildError {
    #[error("label `{label}` is not present in the topology")]
    MissingLabel { label: String },

    #[error("column `{column}` is not present in any table the plan can bind to")]
    MissingColumn { column: String },

    #[error("unknown dialect `{name}`")]
    UnknownDialect { name: String },

    #[error("dialect `{dialect}` cannot satisfy the plan: {message}")]
    DialectRejection { dialect: String, message: String },

    #[error("the plan has no replaced steps")]
    EmptyPlan,
}
