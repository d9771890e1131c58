//! Table schema checks of the built-in structural engine.

use std::fs;

use nyher_ingest::{CsvOptions, read_csv_table};
use nyher_model::{
    Constraints, FieldSpec, FieldType, PrimaryKey, ResourceDescriptor, ResourceTask, Schema,
    StructuralErrorKind,
};
use nyher_validate::{SchemaChecker, StructuralValidator};
use tempfile::TempDir;

fn check(resource: &ResourceDescriptor, csv: &str) -> ResourceTask {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("DATA.csv");
    fs::write(&path, csv).unwrap();
    let table = read_csv_table(&path, CsvOptions::default()).unwrap();
    let rows: Vec<_> = table.rows().collect();
    SchemaChecker::new().validate(resource, &table, &rows)
}

fn kinds(task: &ResourceTask) -> Vec<StructuralErrorKind> {
    task.errors.iter().map(|e| e.kind).collect()
}

fn field(name: &str, field_type: FieldType, constraints: Constraints) -> FieldSpec {
    let mut field = FieldSpec::named(name);
    field.field_type = field_type;
    field.constraints = constraints;
    field
}

#[test]
fn matching_file_is_valid() {
    let resource = ResourceDescriptor::new(
        "demographic_data",
        Schema::with_fields(vec![
            FieldSpec::named("ID"),
            field("AGE", FieldType::Integer, Constraints::default()),
        ]),
    );
    let task = check(&resource, "ID,AGE\na,34\nb,\n");
    assert!(task.valid);
    assert_eq!(task.stats.rows, 2);
    assert_eq!(task.stats.fields, 2);
}

#[test]
fn header_problems_are_reported_by_position() {
    let resource = ResourceDescriptor::new(
        "qe_admin_data",
        Schema::with_fields(vec![
            FieldSpec::named("A"),
            FieldSpec::named("B"),
            FieldSpec::named("C"),
        ]),
    );
    let task = check(&resource, "A,X\n1,2\n");
    assert_eq!(
        kinds(&task),
        vec![
            StructuralErrorKind::IncorrectLabel,
            StructuralErrorKind::MissingLabel,
            StructuralErrorKind::MissingCell,
        ]
    );
    assert_eq!(task.errors[0].field_name.as_deref(), Some("B"));
    assert_eq!(task.errors[1].field_name.as_deref(), Some("C"));
    assert_eq!(task.errors[2].row_number, Some(2));
}

#[test]
fn extra_columns_are_labels_and_cells() {
    let resource =
        ResourceDescriptor::new("r", Schema::with_fields(vec![FieldSpec::named("A")]));
    let task = check(&resource, "A,B\n1,2\n");
    assert_eq!(
        kinds(&task),
        vec![StructuralErrorKind::ExtraLabel, StructuralErrorKind::ExtraCell]
    );
    assert_eq!(task.errors[1].cell.as_deref(), Some("2"));
}

#[test]
fn constraints_and_types_are_checked_per_cell() {
    let resource = ResourceDescriptor::new(
        "r",
        Schema::with_fields(vec![
            field(
                "ID",
                FieldType::String,
                Constraints {
                    required: true,
                    unique: true,
                    ..Constraints::default()
                },
            ),
            field(
                "ZIP",
                FieldType::String,
                Constraints {
                    pattern: Some("[0-9]{5}".to_string()),
                    ..Constraints::default()
                },
            ),
            field("BORN", FieldType::Date, Constraints::default()),
        ]),
    );
    let task = check(
        &resource,
        "ID,ZIP,BORN\n1,12345,2024-02-29\n,1234,2023-02-29\n1,12345,1999-01-01\n",
    );
    assert_eq!(
        kinds(&task),
        vec![
            StructuralErrorKind::ConstraintError,
            StructuralErrorKind::ConstraintError,
            StructuralErrorKind::TypeError,
            StructuralErrorKind::UniqueError,
        ]
    );
    assert_eq!(task.errors[0].note, "constraint \"required\" is \"True\"");
    assert_eq!(task.errors[1].note, "constraint \"pattern\" is \"[0-9]{5}\"");
    assert_eq!(task.errors[2].note, "type is \"date/default\"");
    assert_eq!(task.errors[3].note, "the same as in the row at position 2");
    assert_eq!(task.errors[3].row_number, Some(4));
}

#[test]
fn enum_and_bounds() {
    let resource = ResourceDescriptor::new(
        "r",
        Schema::with_fields(vec![
            field(
                "FLAG",
                FieldType::String,
                Constraints {
                    enum_values: Some(vec!["Yes".into(), "No".into()]),
                    ..Constraints::default()
                },
            ),
            field(
                "SCORE",
                FieldType::Integer,
                Constraints {
                    minimum: Some(0.into()),
                    maximum: Some(10.into()),
                    ..Constraints::default()
                },
            ),
        ]),
    );
    let task = check(&resource, "FLAG,SCORE\nMaybe,5\nYes,11\n");
    assert_eq!(task.errors.len(), 2);
    assert_eq!(task.errors[0].note, "constraint \"enum\" is \"[Yes, No]\"");
    assert_eq!(task.errors[1].note, "constraint \"maximum\" is \"10\"");
}

#[test]
fn blank_rows_and_composite_keys() {
    let mut schema = Schema::with_fields(vec![FieldSpec::named("A"), FieldSpec::named("B")]);
    schema.primary_key = Some(PrimaryKey::Composite(vec!["A".into(), "B".into()]));
    let resource = ResourceDescriptor::new("r", schema);
    let task = check(&resource, "A,B\n1,x\n,\n1,x\n1,y\n");
    assert_eq!(
        kinds(&task),
        vec![StructuralErrorKind::BlankRow, StructuralErrorKind::PrimaryKey]
    );
    assert_eq!(task.errors[1].row_number, Some(4));
}
