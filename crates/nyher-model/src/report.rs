//! Report types serialized as the externally consumed JSON result.

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::finding::Finding;
use crate::row::Row;

/// Result of one validation invocation.
///
/// `errorsSummary` is omitted when empty so that a clean run is
/// distinguishable from one that never produced a summary; `report` is null
/// when structural validation did not run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors_summary: Vec<Finding>,
    pub report: Option<StructuralReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_data: Option<OriginalData>,
}

impl ValidationReport {
    pub fn with_findings(findings: Vec<Finding>) -> Self {
        Self {
            errors_summary: findings,
            ..Self::default()
        }
    }

    pub fn is_clean(&self) -> bool {
        self.errors_summary.is_empty() && self.report.as_ref().is_none_or(|r| r.valid)
    }
}

/// Raw rows per resource, in spec order, kept for audit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginalData {
    resources: Vec<(String, Vec<Row>)>,
}

impl OriginalData {
    pub fn insert(&mut self, resource: impl Into<String>, rows: Vec<Row>) {
        let resource = resource.into();
        match self.resources.iter_mut().find(|(name, _)| *name == resource) {
            Some((_, existing)) => *existing = rows,
            None => self.resources.push((resource, rows)),
        }
    }

    pub fn get(&self, resource: &str) -> Option<&[Row]> {
        self.resources
            .iter()
            .find(|(name, _)| name == resource)
            .map(|(_, rows)| rows.as_slice())
    }

    pub fn resource_names(&self) -> impl Iterator<Item = &str> {
        self.resources.iter().map(|(name, _)| name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl Serialize for OriginalData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.resources.len()))?;
        for (name, rows) in &self.resources {
            map.serialize_entry(name, rows)?;
        }
        map.end()
    }
}

/// Package-level structural validation result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralReport {
    pub valid: bool,
    pub stats: ReportStats,
    pub errors: Vec<StructuralError>,
    pub tasks: Vec<ResourceTask>,
}

impl StructuralReport {
    /// Combine per-resource tasks into one package report.
    pub fn from_tasks(tasks: Vec<ResourceTask>) -> Self {
        let errors = tasks.iter().map(|task| task.errors.len()).sum();
        Self {
            valid: tasks.iter().all(|task| task.valid),
            stats: ReportStats {
                tasks: tasks.len(),
                errors,
            },
            errors: Vec::new(),
            tasks,
        }
    }

    /// Row-level view of every task error as
    /// `(task name, place, error)` in task order.
    pub fn flatten(&self) -> impl Iterator<Item = (&str, &str, &StructuralError)> {
        self.tasks.iter().flat_map(|task| {
            task.errors
                .iter()
                .map(move |error| (task.name.as_str(), task.place.as_str(), error))
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportStats {
    pub tasks: usize,
    pub errors: usize,
}

/// Structural validation result for one resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTask {
    pub name: String,
    pub place: String,
    pub valid: bool,
    pub labels: Vec<String>,
    pub stats: TaskStats,
    pub errors: Vec<StructuralError>,
}

impl ResourceTask {
    pub fn new(name: impl Into<String>, place: impl Into<String>, labels: Vec<String>) -> Self {
        Self {
            name: name.into(),
            place: place.into(),
            valid: true,
            labels,
            stats: TaskStats::default(),
            errors: Vec::new(),
        }
    }

    pub fn push(&mut self, error: StructuralError) {
        self.valid = false;
        self.stats.errors += 1;
        self.errors.push(error);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    pub errors: usize,
    pub rows: usize,
    pub fields: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StructuralErrorKind {
    SourceError,
    BlankLabel,
    DuplicateLabel,
    MissingLabel,
    ExtraLabel,
    IncorrectLabel,
    BlankRow,
    MissingCell,
    ExtraCell,
    TypeError,
    ConstraintError,
    UniqueError,
    PrimaryKey,
}

impl StructuralErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SourceError => "source-error",
            Self::BlankLabel => "blank-label",
            Self::DuplicateLabel => "duplicate-label",
            Self::MissingLabel => "missing-label",
            Self::ExtraLabel => "extra-label",
            Self::IncorrectLabel => "incorrect-label",
            Self::BlankRow => "blank-row",
            Self::MissingCell => "missing-cell",
            Self::ExtraCell => "extra-cell",
            Self::TypeError => "type-error",
            Self::ConstraintError => "constraint-error",
            Self::UniqueError => "unique-error",
            Self::PrimaryKey => "primary-key",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::SourceError => "Source Error",
            Self::BlankLabel => "Blank Label",
            Self::DuplicateLabel => "Duplicate Label",
            Self::MissingLabel => "Missing Label",
            Self::ExtraLabel => "Extra Label",
            Self::IncorrectLabel => "Incorrect Label",
            Self::BlankRow => "Blank Row",
            Self::MissingCell => "Missing Cell",
            Self::ExtraCell => "Extra Cell",
            Self::TypeError => "Type Error",
            Self::ConstraintError => "Constraint Error",
            Self::UniqueError => "Unique Error",
            Self::PrimaryKey => "Primary Key Error",
        }
    }

    /// Header-level errors signal a field that is absent or misnamed.
    pub fn is_missing_field(self) -> bool {
        matches!(self, Self::MissingLabel | Self::IncorrectLabel)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralError {
    #[serde(rename = "type")]
    pub kind: StructuralErrorKind,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_number: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_number: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,
}

impl StructuralError {
    pub fn new(kind: StructuralErrorKind, note: impl Into<String>) -> Self {
        Self {
            kind,
            title: kind.title().to_string(),
            message: String::new(),
            row_number: None,
            field_number: None,
            field_name: None,
            cell: None,
            note: note.into(),
        }
        .render()
    }

    #[must_use]
    pub fn at_row(mut self, row_number: usize) -> Self {
        self.row_number = Some(row_number);
        self.render()
    }

    #[must_use]
    pub fn at_field(mut self, field_number: usize, field_name: impl Into<String>) -> Self {
        self.field_number = Some(field_number);
        self.field_name = Some(field_name.into());
        self.render()
    }

    #[must_use]
    pub fn with_cell(mut self, cell: impl Into<String>) -> Self {
        self.cell = Some(cell.into());
        self.render()
    }

    fn render(mut self) -> Self {
        let mut message = self.kind.title().to_string();
        match (self.row_number, self.field_number) {
            (Some(row), Some(field)) => {
                message.push_str(&format!(" at row {row}, field {field}"));
            }
            (Some(row), None) => message.push_str(&format!(" at row {row}")),
            (None, Some(field)) => message.push_str(&format!(" at field {field}")),
            (None, None) => {}
        }
        if let Some(name) = &self.field_name {
            message.push_str(&format!(" (\"{name}\")"));
        }
        if !self.note.is_empty() {
            message.push_str(": ");
            message.push_str(&self.note);
        }
        self.message = message;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_error_renders_message() {
        let error = StructuralError::new(StructuralErrorKind::ConstraintError, "constraint \"required\" is \"True\"")
            .at_row(3)
            .at_field(2, "ANSWER_CODE");
        assert_eq!(
            error.message,
            "Constraint Error at row 3, field 2 (\"ANSWER_CODE\"): constraint \"required\" is \"True\""
        );
        let json = serde_json::to_value(&error).expect("serialize");
        assert_eq!(json["type"], "constraint-error");
        assert_eq!(json["rowNumber"], 3);
    }

    #[test]
    fn package_report_aggregates_tasks() {
        let mut bad = ResourceTask::new("screening_observation_data", "obs.csv", vec![]);
        bad.push(StructuralError::new(StructuralErrorKind::BlankRow, "").at_row(4));
        let good = ResourceTask::new("qe_admin_data", "qe.csv", vec![]);
        let report = StructuralReport::from_tasks(vec![good, bad]);
        assert!(!report.valid);
        assert_eq!(report.stats.tasks, 2);
        assert_eq!(report.stats.errors, 1);
        let flat: Vec<_> = report.flatten().collect();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].0, "screening_observation_data");
    }
}
