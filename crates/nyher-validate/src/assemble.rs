//! Report assembly.
//!
//! Findings are kept in arrival order by source: missing files, then
//! normalization, then structural errors, then rule findings, then anything
//! unexpected. Only missing-field findings are deduplicated.

use std::collections::HashSet;
use std::path::Path;

use nyher_model::{
    Finding, FindingKind, OriginalData, StructuralError, StructuralReport, ValidationReport,
};

/// Accumulates findings for one run and shapes the final report.
#[derive(Debug, Default)]
pub struct ReportAssembler {
    file_missing: Vec<Finding>,
    normalization: Vec<Finding>,
    rules: Vec<Finding>,
    unexpected: Vec<Finding>,
    structural: Option<StructuralReport>,
    original_data: Option<OriginalData>,
}

impl ReportAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_missing(&mut self, finding: Finding) {
        self.file_missing.push(finding);
    }

    pub fn normalization(&mut self, findings: impl IntoIterator<Item = Finding>) {
        self.normalization.extend(findings);
    }

    pub fn rules(&mut self, findings: impl IntoIterator<Item = Finding>) {
        self.rules.extend(findings);
    }

    pub fn unexpected(&mut self, finding: Finding) {
        self.unexpected.push(finding);
    }

    pub fn structural(&mut self, report: StructuralReport) {
        self.structural = Some(report);
    }

    pub fn original_data(&mut self, data: OriginalData) {
        self.original_data = Some(data);
    }

    pub fn finish(self) -> ValidationReport {
        let structural = self
            .structural
            .as_ref()
            .map(structural_findings)
            .unwrap_or_default();
        let findings = self
            .file_missing
            .into_iter()
            .chain(self.normalization)
            .chain(structural)
            .chain(self.rules)
            .chain(self.unexpected)
            .collect();
        ValidationReport {
            errors_summary: dedupe_missing_fields(findings),
            report: self.structural,
            original_data: self.original_data,
        }
    }
}

/// Collapse missing-field findings to the first per field name. Every other
/// finding is kept as is.
pub fn dedupe_missing_fields(findings: Vec<Finding>) -> Vec<Finding> {
    let mut seen = HashSet::new();
    findings
        .into_iter()
        .filter(|finding| !finding.is_missing_field() || seen.insert(finding.field_name.clone()))
        .collect()
}

/// Flatten a structural report into findings.
pub fn structural_findings(report: &StructuralReport) -> Vec<Finding> {
    report
        .flatten()
        .map(|(resource, place, error)| structural_finding(resource, place, error))
        .collect()
}

fn structural_finding(resource: &str, place: &str, error: &StructuralError) -> Finding {
    let file_name = Path::new(place)
        .file_name()
        .map_or_else(|| place.to_string(), |name| name.to_string_lossy().into_owned());

    let mut finding = match (&error.field_name, error.kind.is_missing_field()) {
        (Some(field), true) => Finding::missing_field(field, resource),
        _ => {
            let mut finding = Finding::new(FindingKind::SchemaViolation, error.message.clone());
            finding.field_name = error.field_name.clone();
            finding
        }
    };
    finding.file_name = Some(file_name);
    finding.row_number = error.row_number;
    finding.field_number = error.field_number;
    finding.with_code(error.kind.as_str())
}
