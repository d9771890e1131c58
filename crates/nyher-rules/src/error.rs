//! Error types for rule configuration and rule evaluation.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to load or check a rule configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("rule configuration not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read rule configuration {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse rule configuration {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("answer code '{code}' is listed as both positive and negative")]
    OverlappingPolarity { code: String },

    #[error("unknown rule '{id}' in enabledRules")]
    UnknownRule { id: String },

    #[error("question code '{question}' has no permitted answer codes")]
    EmptyAnswerSet { question: String },
}

/// Failure of a single rule on a single row.
///
/// The engine turns these into findings; they never abort a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("field '{field}' could not be read")]
    UnreadableField { field: String },

    #[error("{0}")]
    Failed(String),
}

/// Result type for configuration loading.
pub type Result<T> = std::result::Result<T, ConfigError>;
