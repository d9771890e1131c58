//! Validation findings.
//!
//! A finding is one reported issue, structural or rule-based. Findings are
//! immutable once built and never carry wall-clock data, so two runs over the
//! same inputs serialize identically.

use serde::{Deserialize, Serialize};

/// Error class reported in the `type` key of a serialized finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingKind {
    /// A declared input file does not exist.
    FileMissingError,
    /// Malformed command-line invocation.
    ArgumentError,
    /// Reported by the structural (table schema) checker.
    SchemaViolation,
    /// A business rule failed on a row.
    RuleViolation,
    /// A field expected by normalization or a rule is absent, or a rule faulted.
    DataProcessingErrors,
    /// Anything else.
    UnexpectedError,
}

impl FindingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FileMissingError => "file-missing-error",
            Self::ArgumentError => "argument-error",
            Self::SchemaViolation => "schema-violation",
            Self::RuleViolation => "rule-violation",
            Self::DataProcessingErrors => "data-processing-errors",
            Self::UnexpectedError => "unexpected-error",
        }
    }
}

/// Structured cause attached to a finding. Not serialized; used by the
/// report assembler to decide which findings collapse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindingReason {
    /// A field is missing or incorrectly named in the input.
    MissingField,
    /// A rule returned an error or panicked.
    RuleFault,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub field_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_number: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_number: Option<usize>,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: FindingKind,
    /// Structural error type or rule identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip)]
    pub reason: Option<FindingReason>,
}

impl Finding {
    pub fn new(kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            field_name: None,
            file_name: None,
            row_number: None,
            field_number: None,
            message: message.into(),
            kind,
            code: None,
            reason: None,
        }
    }

    pub fn file_missing(resource: &str, path: impl std::fmt::Display) -> Self {
        Self::new(
            FindingKind::FileMissingError,
            format!("File for resource '{resource}' not found: {path}"),
        )
        .with_field(resource)
    }

    pub fn argument_error(message: impl Into<String>) -> Self {
        Self::new(FindingKind::ArgumentError, message)
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(FindingKind::UnexpectedError, message)
    }

    /// A field that normalization or a structural check expected is not in
    /// the input under that name.
    pub fn missing_field(field: &str, resource: &str) -> Self {
        let mut finding = Self::new(
            FindingKind::DataProcessingErrors,
            format!(
                "The field '{field}' is missing or incorrectly named in resource '{resource}'. \
                 Please check if it exists in the CSV file and matches the expected schema."
            ),
        )
        .with_field(field);
        finding.reason = Some(FindingReason::MissingField);
        finding
    }

    pub fn rule_violation(rule_id: &str, message: impl Into<String>) -> Self {
        Self::new(FindingKind::RuleViolation, message).with_code(rule_id)
    }

    pub fn rule_fault(rule_id: &str, detail: impl std::fmt::Display) -> Self {
        let mut finding = Self::new(
            FindingKind::DataProcessingErrors,
            format!("Rule '{rule_id}' failed: {detail}"),
        )
        .with_code(rule_id);
        finding.reason = Some(FindingReason::RuleFault);
        finding
    }

    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field_name = Some(field.into());
        self
    }

    #[must_use]
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file_name = Some(file.into());
        self
    }

    #[must_use]
    pub fn with_row(mut self, row_number: usize) -> Self {
        self.row_number = Some(row_number);
        self
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn is_missing_field(&self) -> bool {
        self.reason == Some(FindingReason::MissingField)
    }
}
