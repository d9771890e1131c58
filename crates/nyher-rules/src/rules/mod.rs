//! Concrete screening rules and their registration from configuration.

pub mod answer_code;
pub mod dates;
pub mod potential_need;
pub mod yes_no;

use tracing::debug;

pub use answer_code::AnswerCodeRule;
pub use dates::{DateKind, DateRule};
pub use potential_need::PotentialNeedRule;
pub use yes_no::YesNoRule;

use crate::config::RuleConfig;
use crate::engine::{RowRule, RuleEngine};

/// Every known rule id, in default registration order.
pub const RULE_IDS: &[&str] = &[
    answer_code::ID,
    potential_need::ID,
    yes_no::ID,
    dates::ID,
];

fn build(id: &str, config: &RuleConfig) -> Vec<Box<dyn RowRule>> {
    let fields = &config.fields;
    match id {
        answer_code::ID => vec![Box::new(AnswerCodeRule::new(
            fields.question_code.as_str(),
            fields.answer_code.as_str(),
            &config.answer_codes,
        )) as Box<dyn RowRule>],
        potential_need::ID => vec![Box::new(PotentialNeedRule::new(
            fields.answer_code.as_str(),
            fields.potential_need_indicated.as_str(),
            &config.positive_answer_codes,
            &config.negative_answer_codes,
        )) as Box<dyn RowRule>],
        yes_no::ID => config
            .yes_no_fields
            .iter()
            .map(|field| Box::new(YesNoRule::new(field.as_str())) as Box<dyn RowRule>)
            .collect(),
        dates::ID => config
            .datetime_fields
            .iter()
            .map(|field| DateRule::new(field.as_str(), DateKind::Datetime))
            .chain(
                config
                    .date_fields
                    .iter()
                    .map(|field| DateRule::new(field.as_str(), DateKind::Date)),
            )
            .map(|rule| Box::new(rule) as Box<dyn RowRule>)
            .collect(),
        _ => Vec::new(),
    }
}

impl RuleEngine {
    /// Register the enabled rules of `config`, in configured order.
    pub fn from_config(config: &RuleConfig) -> Self {
        let ids: Vec<&str> = match &config.enabled_rules {
            Some(enabled) => enabled.iter().map(String::as_str).collect(),
            None => RULE_IDS.to_vec(),
        };
        let mut engine = Self::default();
        for id in ids {
            for rule in build(id, config) {
                engine.register(rule);
            }
        }
        debug!(rules = engine.len(), "rule engine ready");
        engine
    }
}
