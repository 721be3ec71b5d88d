//! Compiler configuration with validation.

use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::Validate;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Knobs the compiler recognizes.
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Identifier of the SQL dialect implementation
    #[validate(length(min = 1, message = "Dialect cannot be empty"))]
    pub dialect: String,

    /// Overrides the dialect's join-count limit per statement
    #[validate(range(
        min = 1,
        max = 1000,
        message = "Max joins per statement must be between 1 and 1000"
    ))]
    pub max_joins_per_statement: Option<u32>,

    /// Minimum membership-list size that triggers scratch-table
    /// materialization
    #[validate(range(
        min = 2,
        max = 1_000_000,
        message = "Temp table threshold must be between 2 and 1000000"
    ))]
    pub temp_table_threshold: usize,

    /// When true, label-keyed filters do not narrow table enumeration at
    /// resolution time
    pub ignore_label_optimization: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            dialect: "postgres".to_string(),
            max_joins_per_statement: None,
            temp_table_threshold: 1000,
            ignore_label_optimization: false,
        }
    }
}

impl CompilerConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            dialect: env::var("RELGRAPH_DIALECT").unwrap_or_else(|_| "postgres".to_string()),
            max_joins_per_statement: parse_optional_env_var("RELGRAPH_MAX_JOINS")?,
            temp_table_threshold: parse_env_var("RELGRAPH_TEMP_TABLE_THRESHOLD", "1000")?,
            ignore_label_optimization: parse_env_var(
                "RELGRAPH_IGNORE_LABEL_OPTIMIZATION",
                "false",
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: yaml.to_string(),
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}

/// Parse an optional environment variable; absent or empty means `None`
fn parse_optional_env_var<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) if !value.is_empty() => {
            let parsed = value.parse().map_err(|e| ConfigError::Parse {
                field: key.to_string(),
                value,
                source: Box::new(e),
            })?;
            Ok(Some(parsed))
        }
        _ => Ok(None),
    }
}
