//! Rule configuration.
//!
//! Every static table the normalizer and the rules consult lives here: the
//! alias table, the answer-code map, the polarity sets and the field lists.
//! A default NYHER screening configuration is compiled into the binary and
//! can be replaced by a JSON file of the same shape.

use std::collections::BTreeMap;
use std::path::Path;

use nyher_model::{CaseInsensitiveSet, Dialect};
use serde::Deserialize;
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::normalize::{AliasTable, Normalization};
use crate::rules::RULE_IDS;

const EMBEDDED_RULES: &str = include_str!("../data/nyher_rules.json");

/// Column names the cross-field rules read.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleFields {
    pub question_code: String,
    pub answer_code: String,
    pub potential_need_indicated: String,
}

impl Default for RuleFields {
    fn default() -> Self {
        Self {
            question_code: "QUESTION_CODE".to_string(),
            answer_code: "ANSWER_CODE".to_string(),
            potential_need_indicated: "POTENTIAL_NEED_INDICATED".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RuleConfig {
    /// Canonical field name to value normalization.
    #[serde(default)]
    pub aliases: BTreeMap<String, Normalization>,
    #[serde(default)]
    pub fields: RuleFields,
    /// Question code to permitted answer codes.
    #[serde(default)]
    pub answer_codes: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub positive_answer_codes: Vec<String>,
    #[serde(default)]
    pub negative_answer_codes: Vec<String>,
    #[serde(default)]
    pub yes_no_fields: Vec<String>,
    #[serde(default)]
    pub datetime_fields: Vec<String>,
    #[serde(default)]
    pub date_fields: Vec<String>,
    /// Rule ids to register, in order. `None` registers every rule.
    #[serde(default)]
    pub enabled_rules: Option<Vec<String>>,
    /// Per-resource CSV dialect used when the package spec declares none.
    #[serde(default)]
    pub dialects: BTreeMap<String, Dialect>,
}

impl RuleConfig {
    /// The compiled-in NYHER screening configuration.
    pub fn embedded() -> Result<Self> {
        Self::parse(EMBEDDED_RULES, "<embedded>")
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text, &path.display().to_string())?;
        debug!(path = %path.display(), "loaded rule configuration");
        Ok(config)
    }

    /// Load `path` when given, otherwise the embedded default.
    pub fn load_or_embedded(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::embedded(),
        }
    }

    pub fn parse(text: &str, origin: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let negative = CaseInsensitiveSet::new(&self.negative_answer_codes);
        if let Some(code) = self
            .positive_answer_codes
            .iter()
            .find(|code| negative.contains(code))
        {
            return Err(ConfigError::OverlappingPolarity { code: code.clone() });
        }
        if let Some((question, _)) = self.answer_codes.iter().find(|(_, codes)| codes.is_empty()) {
            return Err(ConfigError::EmptyAnswerSet {
                question: question.clone(),
            });
        }
        if let Some(enabled) = &self.enabled_rules
            && let Some(id) = enabled.iter().find(|id| !RULE_IDS.contains(&id.as_str()))
        {
            return Err(ConfigError::UnknownRule { id: id.clone() });
        }
        Ok(())
    }

    pub fn alias_table(&self) -> AliasTable {
        AliasTable::new(self.aliases.iter().map(|(field, norm)| (field.clone(), *norm)))
    }

    pub fn dialect_for(&self, resource: &str) -> Option<&Dialect> {
        self.dialects.get(resource)
    }
}
