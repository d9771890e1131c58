//! Row rule engine.
//!
//! Rules are evaluated in registration order against every row of the
//! resources they apply to. A rule that errors or panics on a row is
//! reported as a finding tagged with its id; evaluation continues with the
//! next rule and the next row.

use std::panic::{self, AssertUnwindSafe};

use nyher_model::{Finding, ResourceDescriptor, Row};
use tracing::{trace, warn};

use crate::error::RuleError;

/// Where the rows under evaluation come from.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub resource: &'a ResourceDescriptor,
    pub file_name: &'a str,
    /// Rows as read, before normalization, ordered by row number.
    pub raw_rows: &'a [Row],
}

impl<'a> RuleContext<'a> {
    pub fn new(resource: &'a ResourceDescriptor, file_name: &'a str) -> Self {
        Self {
            resource,
            file_name,
            raw_rows: &[],
        }
    }

    #[must_use]
    pub fn with_raw_rows(mut self, raw_rows: &'a [Row]) -> Self {
        self.raw_rows = raw_rows;
        self
    }

    /// Value of `field` as it was read, for quoting in messages. Falls back
    /// to the evaluated row when no raw row has the same number.
    pub fn raw_value<'r>(&'r self, row: &'r Row, field: &str) -> Option<&'r str> {
        self.raw_rows
            .binary_search_by_key(&row.number(), Row::number)
            .ok()
            .and_then(|index| self.raw_rows.get(index))
            .and_then(|raw| raw.get(field))
            .or_else(|| row.get(field))
    }
}

/// A row-level business rule.
///
/// `check` is only called for rows where every field in `reads` is present
/// and non-empty; other rows are not applicable.
pub trait RowRule: Send + Sync {
    /// Stable identifier, used as the finding code.
    fn id(&self) -> &str;

    /// Field names the rule reads.
    fn reads(&self) -> &[String];

    /// Whether the rule runs on this resource at all.
    fn applies_to(&self, resource: &ResourceDescriptor) -> bool {
        self.reads().iter().all(|field| resource.has_field(field))
    }

    fn check(&self, row: &Row, ctx: &RuleContext<'_>) -> Result<Vec<Finding>, RuleError>;
}

#[derive(Default)]
pub struct RuleEngine {
    rules: Vec<Box<dyn RowRule>>,
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field("rules", &self.rule_ids().collect::<Vec<_>>())
            .finish()
    }
}

impl RuleEngine {
    pub fn new(rules: Vec<Box<dyn RowRule>>) -> Self {
        Self { rules }
    }

    pub fn register(&mut self, rule: Box<dyn RowRule>) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rule_ids(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.id())
    }

    /// Rules that run on `resource`, in registration order.
    pub fn applicable(&self, resource: &ResourceDescriptor) -> Vec<&dyn RowRule> {
        self.rules
            .iter()
            .map(Box::as_ref)
            .filter(|rule| rule.applies_to(resource))
            .collect()
    }

    /// Evaluate every applicable rule against every row.
    pub fn run<'r, I>(&self, ctx: &RuleContext<'_>, rows: I) -> Vec<Finding>
    where
        I: IntoIterator<Item = &'r Row>,
    {
        let rules = self.applicable(ctx.resource);
        if rules.is_empty() {
            return Vec::new();
        }
        let mut findings = Vec::new();
        for row in rows {
            for rule in &rules {
                findings.extend(evaluate(*rule, row, ctx));
            }
        }
        findings
    }
}

/// Run one rule on one row, isolating errors and panics.
pub fn evaluate(rule: &dyn RowRule, row: &Row, ctx: &RuleContext<'_>) -> Vec<Finding> {
    if !rule.reads().iter().all(|field| row.is_present_non_empty(field)) {
        trace!(rule = rule.id(), row = row.number(), "rule not applicable");
        return Vec::new();
    }

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| rule.check(row, ctx)));
    let findings = match outcome {
        Ok(Ok(findings)) => findings,
        Ok(Err(err)) => {
            warn!(rule = rule.id(), row = row.number(), error = %err, "rule failed");
            vec![Finding::rule_fault(rule.id(), &err)]
        }
        Err(payload) => {
            let detail = panic_message(payload.as_ref());
            warn!(rule = rule.id(), row = row.number(), detail, "rule panicked");
            vec![Finding::rule_fault(rule.id(), detail)]
        }
    };

    findings
        .into_iter()
        .map(|mut finding| {
            if finding.file_name.is_none() {
                finding.file_name = Some(ctx.file_name.to_string());
            }
            if finding.row_number.is_none() {
                finding.row_number = Some(row.number());
            }
            finding
        })
        .collect()
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "panic"
    }
}
