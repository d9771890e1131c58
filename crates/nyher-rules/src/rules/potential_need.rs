//! Potential-need polarity must agree with the answer code.

use nyher_model::{CaseInsensitiveSet, Finding, Row};

use super::answer_code::read;
use crate::engine::{RowRule, RuleContext};
use crate::error::RuleError;

pub const ID: &str = "potential-need-polarity";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    fn marker(self) -> &'static str {
        match self {
            Self::Positive => "pos",
            Self::Negative => "neg",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

/// A row whose answer code is in the positive set must flag a positive
/// need (the indicator contains "pos"); the negative set requires "neg".
#[derive(Debug, Clone)]
pub struct PotentialNeedRule {
    reads: Vec<String>,
    positive: CaseInsensitiveSet,
    negative: CaseInsensitiveSet,
}

impl PotentialNeedRule {
    pub fn new(
        answer_field: impl Into<String>,
        indicator_field: impl Into<String>,
        positive: &[String],
        negative: &[String],
    ) -> Self {
        Self {
            reads: vec![answer_field.into(), indicator_field.into()],
            positive: CaseInsensitiveSet::new(positive),
            negative: CaseInsensitiveSet::new(negative),
        }
    }

    fn polarity(&self, answer: &str) -> Option<Polarity> {
        if self.positive.contains(answer) {
            Some(Polarity::Positive)
        } else if self.negative.contains(answer) {
            Some(Polarity::Negative)
        } else {
            None
        }
    }
}

impl RowRule for PotentialNeedRule {
    fn id(&self) -> &str {
        ID
    }

    fn reads(&self) -> &[String] {
        &self.reads
    }

    fn check(&self, row: &Row, ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleError> {
        let [answer_field, indicator_field] = self.reads.as_slice() else {
            return Err(RuleError::Failed("rule reads two fields".to_string()));
        };
        let answer = read(row, answer_field)?;
        let indicator = read(row, indicator_field)?;

        let Some(polarity) = self.polarity(answer) else {
            return Ok(Vec::new());
        };
        if indicator.to_lowercase().contains(polarity.marker()) {
            return Ok(Vec::new());
        }
        let indicator = ctx.raw_value(row, indicator_field).unwrap_or(indicator);
        let answer = ctx.raw_value(row, answer_field).unwrap_or(answer);
        Ok(vec![
            Finding::rule_violation(
                ID,
                format!(
                    "Invalid {indicator_field} '{indicator}' for {answer_field} '{answer}': expected a {} need",
                    polarity.label()
                ),
            )
            .with_field(indicator_field.as_str()),
        ])
    }
}
