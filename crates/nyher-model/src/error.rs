use thiserror::Error;

/// Structural problems in a package descriptor.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpecError {
    #[error("package declares no resources")]
    NoResources,
    #[error("resource at position {index} has an empty name")]
    EmptyResourceName { index: usize },
    #[error("duplicate resource name '{name}'")]
    DuplicateResource { name: String },
    #[error("duplicate field '{field}' in resource '{resource}'")]
    DuplicateField { resource: String, field: String },
    #[error("primary key field '{field}' is not declared in resource '{resource}'")]
    UnknownPrimaryKey { resource: String, field: String },
}
