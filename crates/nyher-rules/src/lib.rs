//! Field normalization and row-level business rules.
//!
//! [`RuleConfig`] carries the static tables; [`AliasTable`] and
//! [`RuleEngine`] are built from it once and shared read-only between runs.

pub mod config;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod rules;

pub use config::{RuleConfig, RuleFields};
pub use engine::{RowRule, RuleContext, RuleEngine, evaluate};
pub use error::{ConfigError, Result, RuleError};
pub use normalize::{
    AliasTable, NormalizedRow, Normalization, Normalizer, normalize_row, normalize_rows,
};
pub use rules::RULE_IDS;
