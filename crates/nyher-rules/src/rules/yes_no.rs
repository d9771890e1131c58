//! Optional Yes/No flags.

use nyher_model::{Finding, Row};

use super::answer_code::read;
use crate::engine::{RowRule, RuleContext};
use crate::error::RuleError;

pub const ID: &str = "yes-no-flag";

/// A flag field that, when filled in, must read "yes" or "no" in any case.
#[derive(Debug, Clone)]
pub struct YesNoRule {
    reads: Vec<String>,
}

impl YesNoRule {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            reads: vec![field.into()],
        }
    }
}

impl RowRule for YesNoRule {
    fn id(&self) -> &str {
        ID
    }

    fn reads(&self) -> &[String] {
        &self.reads
    }

    fn check(&self, row: &Row, ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleError> {
        let [field] = self.reads.as_slice() else {
            return Err(RuleError::Failed("rule reads one field".to_string()));
        };
        let value = read(row, field)?;
        if value.eq_ignore_ascii_case("yes") || value.eq_ignore_ascii_case("no") {
            return Ok(Vec::new());
        }
        let value = ctx.raw_value(row, field).unwrap_or(value);
        Ok(vec![
            Finding::rule_violation(
                ID,
                format!("Invalid {field} '{value}': expected 'Yes' or 'No'"),
            )
            .with_field(field.as_str()),
        ])
    }
}
