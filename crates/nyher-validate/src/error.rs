//! Error types for binding input files to package resources.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("unknown binding profile '{name}' (expected one of: three-file, four-file, seven-file)")]
    UnknownProfile { name: String },

    #[error(
        "Invalid number of arguments. Please provide the following arguments: <spec_path> {usage} [output_path]"
    )]
    FileCount {
        expected: usize,
        actual: usize,
        usage: String,
    },

    #[error("no binding profile takes {count} input files (expected 3, 4 or 7)")]
    NoProfileForCount { count: usize },
}

/// Result type for binding operations.
pub type Result<T> = std::result::Result<T, BindingError>;
