//! Structural (table schema) validation.
//!
//! The resource validator talks to structural checking only through
//! [`StructuralValidator`], so the built-in [`SchemaChecker`] can be replaced
//! by another engine.

mod checker;
pub mod types;

pub use checker::SchemaChecker;

use nyher_ingest::CsvTable;
use nyher_model::{ResourceDescriptor, ResourceTask, Row};

pub trait StructuralValidator: Send + Sync {
    /// Check one loaded resource. `rows` are the normalized rows of `table`,
    /// in the same order as `table.records`.
    fn validate(&self, resource: &ResourceDescriptor, table: &CsvTable, rows: &[Row]) -> ResourceTask;
}
