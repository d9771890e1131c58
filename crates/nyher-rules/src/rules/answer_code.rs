//! Answer codes must be permitted for their question code.

use std::collections::{BTreeMap, HashMap};

use nyher_model::{CaseInsensitiveSet, Finding, Row, fold};

use crate::engine::{RowRule, RuleContext};
use crate::error::RuleError;

pub const ID: &str = "answer-code-membership";

/// Checks the answer code of a row against the permitted set for its
/// question code. Question codes missing from the map are not checked.
#[derive(Debug, Clone)]
pub struct AnswerCodeRule {
    reads: Vec<String>,
    permitted: HashMap<String, CaseInsensitiveSet>,
}

impl AnswerCodeRule {
    pub fn new(
        question_field: impl Into<String>,
        answer_field: impl Into<String>,
        answer_codes: &BTreeMap<String, Vec<String>>,
    ) -> Self {
        let permitted = answer_codes
            .iter()
            .map(|(question, answers)| (fold(question), CaseInsensitiveSet::new(answers)))
            .collect();
        Self {
            reads: vec![question_field.into(), answer_field.into()],
            permitted,
        }
    }
}

impl RowRule for AnswerCodeRule {
    fn id(&self) -> &str {
        ID
    }

    fn reads(&self) -> &[String] {
        &self.reads
    }

    fn check(&self, row: &Row, ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleError> {
        let [question_field, answer_field] = self.reads.as_slice() else {
            return Err(RuleError::Failed("rule reads two fields".to_string()));
        };
        let question = read(row, question_field)?;
        let answer = read(row, answer_field)?;

        let Some(permitted) = self.permitted.get(&fold(question)) else {
            return Ok(Vec::new());
        };
        if permitted.contains(answer) {
            return Ok(Vec::new());
        }
        let question = ctx.raw_value(row, question_field).unwrap_or(question);
        let answer = ctx.raw_value(row, answer_field).unwrap_or(answer);
        Ok(vec![
            Finding::rule_violation(
                ID,
                format!("Invalid {answer_field} '{answer}' for {question_field} '{question}'"),
            )
            .with_field(answer_field.as_str()),
        ])
    }
}

pub(crate) fn read<'r>(row: &'r Row, field: &str) -> Result<&'r str, RuleError> {
    row.get(field).ok_or_else(|| RuleError::UnreadableField {
        field: field.to_string(),
    })
}
