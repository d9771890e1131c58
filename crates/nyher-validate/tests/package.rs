//! End-to-end package validation over temporary CSV fixtures.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use nyher_ingest::CsvTable;
use nyher_model::{
    FieldSpec, FindingKind, ResourceDescriptor, ResourceTask, Row, Schema, Spec,
};
use nyher_validate::{
    BindingProfile, ResourceBindings, SchemaChecker, StructuralValidator, Validator,
};
use tempfile::TempDir;

const QE_ADMIN: &[&str] = &["PATIENT_MR_ID_VALUE", "ORGANIZATION_TYPE", "FACILITY_STATE"];
const PROFILE: &[&str] = &["PATIENT_MR_ID_VALUE", "SCREENING_STATUS_CODE", "VISIT_OMH_FLAG"];
const OBSERVATION: &[&str] = &[
    "PATIENT_MR_ID_VALUE",
    "QUESTION_CODE",
    "ANSWER_CODE",
    "POTENTIAL_NEED_INDICATED",
    "SCREENING_START_DATETIME",
];
const DEMOGRAPHIC: &[&str] = &["PATIENT_MR_ID_VALUE", "GENDER", "PATIENT_BIRTH_DATE"];

fn resource(name: &str, fields: &[&str]) -> ResourceDescriptor {
    ResourceDescriptor::new(
        name,
        Schema::with_fields(fields.iter().map(|f| FieldSpec::named(*f)).collect()),
    )
}

fn four_file_spec() -> Spec {
    Spec::new(
        Some("nyher-fhir-ig-equivalent".to_string()),
        vec![
            resource("qe_admin_data", QE_ADMIN),
            resource("screening_profile_data", PROFILE),
            resource("screening_observation_data", OBSERVATION),
            resource("demographic_data", DEMOGRAPHIC),
        ],
    )
}

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Four valid files bound with the four-file profile.
    fn valid_package(&self) -> ResourceBindings {
        let files = [
            self.write(
                "QE_ADMIN_DATA_partner1.csv",
                "PATIENT_MR_ID_VALUE,ORGANIZATION_TYPE,FACILITY_STATE\n1,hospital,ny\n",
            ),
            self.write(
                "SCREENING_PROFILE_DATA_partner1.csv",
                "PATIENT_MR_ID_VALUE,SCREENING_STATUS_CODE,VISIT_OMH_FLAG\n1,final,Yes\n",
            ),
            self.write(
                "SCREENING_OBSERVATION_DATA_partner1.csv",
                "PATIENT_MR_ID_VALUE,QUESTION_CODE,ANSWER_CODE,POTENTIAL_NEED_INDICATED,SCREENING_START_DATETIME\n\
                 1,71802-3,LA31994-9,POS,2024-02-29T10:00:00Z\n",
            ),
            self.write(
                "DEMOGRAPHIC_DATA_partner1.csv",
                "PATIENT_MR_ID_VALUE,GENDER,PATIENT_BIRTH_DATE\n1,female,1980-05-17\n",
            ),
        ];
        BindingProfile::FourFile.bind(&files).unwrap()
    }
}

/// Structural engine that only counts how often it is called.
#[derive(Clone, Default)]
struct CountingValidator {
    calls: Arc<AtomicUsize>,
}

impl StructuralValidator for CountingValidator {
    fn validate(&self, resource: &ResourceDescriptor, table: &CsvTable, _rows: &[Row]) -> ResourceTask {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ResourceTask::new(
            resource.name.clone(),
            table.path.display().to_string(),
            table.headers.to_vec(),
        )
    }
}

/// Structural engine that fails hard on one resource.
struct FailsOn(&'static str);

impl StructuralValidator for FailsOn {
    fn validate(&self, resource: &ResourceDescriptor, table: &CsvTable, rows: &[Row]) -> ResourceTask {
        if resource.name == self.0 {
            panic!("engine blew up");
        }
        SchemaChecker::new().validate(resource, table, rows)
    }
}

#[test]
fn missing_file_stops_before_structural_validation() {
    let fixture = Fixture::new();
    let mut bindings = fixture.valid_package();
    let missing = fixture.path("DEMOGRAPHIC_DATA_absent.csv");
    bindings.bind("demographic_data", &missing);

    let counter = CountingValidator::default();
    let validator = Validator::embedded()
        .unwrap()
        .with_structural(counter.clone());
    let report = validator.validate_package(&four_file_spec(), &bindings);

    assert_eq!(counter.calls.load(Ordering::SeqCst), 0);
    assert!(report.report.is_none());
    assert!(report.original_data.is_none());
    assert_eq!(report.errors_summary.len(), 1);
    let finding = &report.errors_summary[0];
    assert_eq!(finding.kind, FindingKind::FileMissingError);
    assert_eq!(finding.field_name.as_deref(), Some("demographic_data"));
    assert_eq!(
        finding.message,
        format!(
            "File for resource 'demographic_data' not found: {}",
            missing.display()
        )
    );
}

#[test]
fn every_present_resource_reaches_the_structural_engine() {
    let fixture = Fixture::new();
    let counter = CountingValidator::default();
    let validator = Validator::embedded()
        .unwrap()
        .with_structural(counter.clone());
    let report = validator.validate_package(&four_file_spec(), &fixture.valid_package());
    assert_eq!(counter.calls.load(Ordering::SeqCst), 4);
    assert_eq!(report.report.map(|r| r.tasks.len()), Some(4));
}

#[test]
fn unbound_resource_is_reported_as_missing() {
    let fixture = Fixture::new();
    let bindings: ResourceBindings = fixture
        .valid_package()
        .iter()
        .filter(|(name, _)| *name != "qe_admin_data")
        .map(|(name, path)| (name.to_string(), path.to_path_buf()))
        .collect();

    let report = Validator::embedded()
        .unwrap()
        .validate_package(&four_file_spec(), &bindings);
    assert_eq!(report.errors_summary.len(), 1);
    assert_eq!(
        report.errors_summary[0].message,
        "File for resource 'qe_admin_data' not found."
    );
}

#[test]
fn valid_package_has_no_errors_summary() {
    let fixture = Fixture::new();
    let report = Validator::embedded()
        .unwrap()
        .validate_package(&four_file_spec(), &fixture.valid_package());

    assert!(report.is_clean(), "{:#?}", report.errors_summary);
    let json = serde_json::to_value(&report).unwrap();
    assert!(json.get("errorsSummary").is_none());
    assert_eq!(json["report"]["valid"], true);
    assert_eq!(json["report"]["stats"]["tasks"], 4);
}

#[test]
fn original_data_keeps_rows_before_normalization() {
    let fixture = Fixture::new();
    let bindings = fixture.valid_package();
    fs::write(
        bindings.get("qe_admin_data").unwrap(),
        "PATIENT_MR_ID_VALUE,ORGANIZATION_TYPE,FACILITY_STATE\n1,Hospital,NY\n",
    )
    .unwrap();

    let report = Validator::embedded()
        .unwrap()
        .validate_package(&four_file_spec(), &bindings);
    let json = serde_json::to_value(&report).unwrap();
    let names: Vec<_> = json["originalData"]
        .as_object()
        .unwrap()
        .keys()
        .cloned()
        .collect();
    assert_eq!(names.len(), 4);
    assert_eq!(json["originalData"]["qe_admin_data"][0]["ORGANIZATION_TYPE"], "Hospital");

    let without = Validator::embedded()
        .unwrap()
        .include_original_data(false)
        .validate_package(&four_file_spec(), &bindings);
    assert!(without.original_data.is_none());
}

#[test]
fn missing_aliased_column_is_reported_once() {
    let fixture = Fixture::new();
    let bindings = fixture.valid_package();
    // ANSWER_CODE column dropped; three data rows.
    let observation = bindings.get("screening_observation_data").unwrap();
    fs::write(
        observation,
        "PATIENT_MR_ID_VALUE,QUESTION_CODE,POTENTIAL_NEED_INDICATED,SCREENING_START_DATETIME\n\
         1,71802-3,POS,2024-01-01T00:00:00\n\
         2,71802-3,POS,2024-01-01T00:00:00\n\
         3,71802-3,POS,2024-01-01T00:00:00\n",
    )
    .unwrap();

    let report = Validator::embedded()
        .unwrap()
        .validate_package(&four_file_spec(), &bindings);
    let missing: Vec<_> = report
        .errors_summary
        .iter()
        .filter(|f| f.field_name.as_deref() == Some("ANSWER_CODE") && f.is_missing_field())
        .collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].kind, FindingKind::DataProcessingErrors);
    assert!(
        missing[0]
            .message
            .starts_with("The field 'ANSWER_CODE' is missing or incorrectly named")
    );
}

#[test]
fn rule_findings_follow_structural_findings() {
    let fixture = Fixture::new();
    let bindings = fixture.valid_package();
    fs::write(
        bindings.get("screening_observation_data").unwrap(),
        "PATIENT_MR_ID_VALUE,QUESTION_CODE,ANSWER_CODE,POTENTIAL_NEED_INDICATED,SCREENING_START_DATETIME\n\
         1,71802-3,LA9999-9,POS,2100-02-29T10:00:00\n",
    )
    .unwrap();
    fs::write(
        bindings.get("demographic_data").unwrap(),
        "PATIENT_MR_ID_VALUE,GENDER\n1,female\n",
    )
    .unwrap();

    let report = Validator::embedded()
        .unwrap()
        .validate_package(&four_file_spec(), &bindings);
    let kinds: Vec<_> = report.errors_summary.iter().map(|f| f.kind).collect();
    let first_rule = kinds
        .iter()
        .position(|k| *k == FindingKind::RuleViolation)
        .unwrap();
    assert!(kinds[..first_rule].contains(&FindingKind::DataProcessingErrors));
    assert!(kinds[first_rule..].iter().all(|k| *k == FindingKind::RuleViolation));

    let codes: Vec<_> = report.errors_summary[first_rule..]
        .iter()
        .filter_map(|f| f.code.as_deref())
        .collect();
    assert_eq!(codes, vec!["answer-code-membership", "date-format"]);
    assert_eq!(
        report.errors_summary[first_rule].file_name.as_deref(),
        Some("SCREENING_OBSERVATION_DATA_partner1.csv")
    );
    assert_eq!(
        report.errors_summary[first_rule].message,
        "Invalid ANSWER_CODE 'LA9999-9' for QUESTION_CODE '71802-3'"
    );
}

#[test]
fn failing_resource_does_not_block_siblings() {
    let fixture = Fixture::new();
    let bindings = fixture.valid_package();
    fs::write(
        bindings.get("screening_profile_data").unwrap(),
        "PATIENT_MR_ID_VALUE,SCREENING_STATUS_CODE,VISIT_OMH_FLAG\n1,final,maybe\n",
    )
    .unwrap();

    let report = Validator::embedded()
        .unwrap()
        .with_structural(FailsOn("screening_observation_data"))
        .validate_package(&four_file_spec(), &bindings);

    let summary: Vec<_> = report
        .errors_summary
        .iter()
        .map(|f| (f.kind, f.code.as_deref(), f.file_name.as_deref()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (
                FindingKind::RuleViolation,
                Some("yes-no-flag"),
                Some("SCREENING_PROFILE_DATA_partner1.csv")
            ),
            (
                FindingKind::UnexpectedError,
                None,
                Some("SCREENING_OBSERVATION_DATA_partner1.csv")
            ),
        ]
    );
    let unexpected = &report.errors_summary[1];
    assert!(unexpected.message.contains("'screening_observation_data'"));
    assert!(unexpected.message.contains("engine blew up"));

    let structural = report.report.expect("structural report for the other resources");
    let names: Vec<_> = structural.tasks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["qe_admin_data", "screening_profile_data", "demographic_data"]);
}

#[test]
fn repeated_runs_produce_identical_reports() {
    let fixture = Fixture::new();
    let bindings = fixture.valid_package();
    fs::write(
        bindings.get("screening_profile_data").unwrap(),
        "PATIENT_MR_ID_VALUE,SCREENING_STATUS_CODE,VISIT_OMH_FLAG\n1,final,maybe\n2,final,\n",
    )
    .unwrap();

    let validator = Validator::embedded().unwrap();
    let first = serde_json::to_value(validator.validate_package(&four_file_spec(), &bindings)).unwrap();
    let second = serde_json::to_value(validator.validate_package(&four_file_spec(), &bindings)).unwrap();
    assert_eq!(first, second);
    assert_eq!(first["errorsSummary"].as_array().map(Vec::len), Some(1));
}

#[test]
fn observation_dialect_skips_initial_space() {
    let fixture = Fixture::new();
    let bindings = fixture.valid_package();
    fs::write(
        bindings.get("screening_observation_data").unwrap(),
        "PATIENT_MR_ID_VALUE,QUESTION_CODE,ANSWER_CODE,POTENTIAL_NEED_INDICATED,SCREENING_START_DATETIME\n\
         1, 71802-3, LA31994-9, POS, 2024-02-29T10:00:00Z\n",
    )
    .unwrap();

    let report = Validator::embedded()
        .unwrap()
        .validate_package(&four_file_spec(), &bindings);
    assert!(report.is_clean(), "{:#?}", report.errors_summary);
}

#[test]
fn missing_spec_file_is_reported_as_finding() {
    let fixture = Fixture::new();
    let spec_path = fixture.path("datapackage-nyher-fhir-ig-equivalent.json");
    let report = Validator::embedded()
        .unwrap()
        .validate_spec_file(&spec_path, &fixture.valid_package());
    assert_eq!(report.errors_summary.len(), 1);
    assert_eq!(report.errors_summary[0].kind, FindingKind::FileMissingError);
    assert_eq!(
        report.errors_summary[0].message,
        format!("Specification file '{}' not found.", spec_path.display())
    );
}

#[test]
fn unparseable_spec_is_an_unexpected_error() {
    let fixture = Fixture::new();
    let spec_path = fixture.write("datapackage.json", "{ not json");
    let report = Validator::embedded()
        .unwrap()
        .validate_spec_file(&spec_path, &fixture.valid_package());
    assert_eq!(report.errors_summary.len(), 1);
    assert_eq!(report.errors_summary[0].kind, FindingKind::UnexpectedError);
}

#[test]
fn spec_file_drives_the_run() {
    let fixture = Fixture::new();
    let spec_path = fixture.write(
        "datapackage.json",
        &serde_json::to_string(&four_file_spec()).unwrap(),
    );
    let report = Validator::embedded()
        .unwrap()
        .validate_spec_file(&spec_path, &fixture.valid_package());
    assert!(report.is_clean(), "{:#?}", report.errors_summary);
}

#[test]
fn fast_fail_report_snapshot() {
    let bindings = ResourceBindings::new()
        .with("qe_admin_data", "/nonexistent/QE_ADMIN_DATA_partner1.csv")
        .with("screening_profile_data", "/nonexistent/SCREENING_PROFILE_DATA_partner1.csv");
    let spec = Spec::new(
        None,
        vec![
            resource("qe_admin_data", QE_ADMIN),
            resource("screening_profile_data", PROFILE),
        ],
    );
    let report = Validator::embedded().unwrap().validate_package(&spec, &bindings);
    insta::assert_json_snapshot!(report, @r###"
    {
      "errorsSummary": [
        {
          "fieldName": "qe_admin_data",
          "message": "File for resource 'qe_admin_data' not found: /nonexistent/QE_ADMIN_DATA_partner1.csv",
          "type": "file-missing-error"
        },
        {
          "fieldName": "screening_profile_data",
          "message": "File for resource 'screening_profile_data' not found: /nonexistent/SCREENING_PROFILE_DATA_partner1.csv",
          "type": "file-missing-error"
        }
      ],
      "report": null
    }
    "###);
}

#[test]
fn validator_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Validator>();
}
