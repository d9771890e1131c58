//! Shared types for screening package validation: the package descriptor,
//! rows, findings and the assembled report.

pub mod error;
pub mod finding;
pub mod lookup;
pub mod report;
pub mod row;
pub mod spec;

pub use error::SpecError;
pub use finding::{Finding, FindingKind, FindingReason};
pub use lookup::{CaseInsensitiveSet, fold};
pub use report::{
    OriginalData, ReportStats, ResourceTask, StructuralError, StructuralErrorKind,
    StructuralReport, TaskStats, ValidationReport,
};
pub use row::Row;
pub use spec::{Constraints, Dialect, FieldSpec, FieldType, PrimaryKey, ResourceDescriptor, Schema, Spec};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_omits_empty_summary() {
        let report = ValidationReport::default();
        let json = serde_json::to_value(&report).expect("serialize report");
        let object = json.as_object().expect("object");
        assert!(!object.contains_key("errorsSummary"));
        assert!(!object.contains_key("originalData"));
        assert!(object["report"].is_null());
    }

    #[test]
    fn finding_serializes_with_type_key() {
        let finding = Finding::file_missing("qe_admin_data", "/tmp/QE_ADMIN_DATA_x.csv");
        let json = serde_json::to_value(&finding).expect("serialize finding");
        assert_eq!(json["type"], "file-missing-error");
        assert_eq!(json["fieldName"], "qe_admin_data");
        assert_eq!(
            json["message"],
            "File for resource 'qe_admin_data' not found: /tmp/QE_ADMIN_DATA_x.csv"
        );
        assert!(json.get("rowNumber").is_none());
    }
}
