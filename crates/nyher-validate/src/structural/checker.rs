//! Built-in table schema checker.

use std::cmp::Ordering;
use std::collections::HashMap;

use nyher_ingest::CsvTable;
use nyher_model::{
    FieldSpec, ResourceDescriptor, ResourceTask, Row, StructuralError, StructuralErrorKind,
};
use regex::Regex;
use tracing::{debug, warn};

use super::StructuralValidator;
use super::types::{compare_bound, format_name, is_valid_type};

/// Checks header labels, cell counts, types, constraints, uniqueness and
/// primary keys. Labels and cells are matched to schema fields by position.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaChecker;

impl SchemaChecker {
    pub fn new() -> Self {
        Self
    }
}

impl StructuralValidator for SchemaChecker {
    fn validate(
        &self,
        resource: &ResourceDescriptor,
        table: &CsvTable,
        rows: &[Row],
    ) -> ResourceTask {
        let mut task = ResourceTask::new(
            resource.name.clone(),
            table.path.display().to_string(),
            table.headers.to_vec(),
        );
        task.stats.rows = table.row_count();
        task.stats.fields = resource.schema.fields.len();

        check_labels(resource, &table.headers, &mut task);

        let mut fields = FieldChecks::new(resource);
        let mut primary_keys: HashMap<Vec<String>, usize> = HashMap::new();
        let key_positions = primary_key_positions(resource);

        for (record, row) in table.records.iter().zip(rows) {
            if record.cells.iter().all(|cell| cell.trim().is_empty()) {
                task.push(
                    StructuralError::new(StructuralErrorKind::BlankRow, "row is completely blank")
                        .at_row(record.number),
                );
                continue;
            }

            for (index, field) in resource.schema.fields.iter().enumerate() {
                if index >= record.cells.len() {
                    task.push(
                        StructuralError::new(StructuralErrorKind::MissingCell, "")
                            .at_row(record.number)
                            .at_field(index + 1, field.name.clone()),
                    );
                    continue;
                }
                let value = row.value_at(index).unwrap_or(&record.cells[index]);
                if let Some(error) = fields.check_cell(resource, index, field, value, record.number) {
                    task.push(error);
                }
            }

            for index in resource.schema.fields.len()..record.cells.len() {
                let label = table.headers.get(index).cloned().unwrap_or_default();
                task.push(
                    StructuralError::new(StructuralErrorKind::ExtraCell, "")
                        .at_row(record.number)
                        .at_field(index + 1, label)
                        .with_cell(record.cells[index].clone()),
                );
            }

            if let Some(positions) = &key_positions {
                let key: Option<Vec<String>> = positions
                    .iter()
                    .map(|&index| {
                        row.value_at(index)
                            .filter(|value| !resource.schema.is_missing(value))
                            .map(str::to_string)
                    })
                    .collect();
                if let Some(key) = key {
                    if let Some(first) = primary_keys.get(&key) {
                        task.push(
                            StructuralError::new(
                                StructuralErrorKind::PrimaryKey,
                                format!("the same as in the row at position {first}"),
                            )
                            .at_row(record.number),
                        );
                    } else {
                        primary_keys.insert(key, record.number);
                    }
                }
            }
        }

        debug!(
            resource = %resource.name,
            rows = task.stats.rows,
            errors = task.stats.errors,
            "structural check finished"
        );
        task
    }
}

fn check_labels(resource: &ResourceDescriptor, labels: &[String], task: &mut ResourceTask) {
    let fields = &resource.schema.fields;
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for index in 0..labels.len().max(fields.len()) {
        let number = index + 1;
        match (labels.get(index), fields.get(index)) {
            (Some(label), field) if label.trim().is_empty() => {
                let name = field.map(|f| f.name.clone()).unwrap_or_default();
                task.push(
                    StructuralError::new(StructuralErrorKind::BlankLabel, "")
                        .at_field(number, name),
                );
            }
            (Some(label), field) if seen.contains_key(label.as_str()) => {
                let first = seen[label.as_str()];
                let name = field.map_or_else(|| label.clone(), |f| f.name.clone());
                task.push(
                    StructuralError::new(
                        StructuralErrorKind::DuplicateLabel,
                        format!("at position \"{first}\""),
                    )
                    .at_field(number, name),
                );
            }
            (Some(label), Some(field)) => {
                seen.insert(label.as_str(), number);
                if *label != field.name {
                    task.push(
                        StructuralError::new(
                            StructuralErrorKind::IncorrectLabel,
                            format!("\"{label}\" instead of \"{}\"", field.name),
                        )
                        .at_field(number, field.name.clone()),
                    );
                }
            }
            (Some(label), None) => {
                seen.insert(label.as_str(), number);
                task.push(
                    StructuralError::new(StructuralErrorKind::ExtraLabel, "")
                        .at_field(number, label.clone()),
                );
            }
            (None, Some(field)) => {
                task.push(
                    StructuralError::new(StructuralErrorKind::MissingLabel, "")
                        .at_field(number, field.name.clone()),
                );
            }
            (None, None) => {}
        }
    }
}

fn primary_key_positions(resource: &ResourceDescriptor) -> Option<Vec<usize>> {
    let names = resource.schema.primary_key_fields();
    if names.is_empty() {
        return None;
    }
    names
        .iter()
        .map(|name| {
            resource
                .schema
                .fields
                .iter()
                .position(|field| field.name == *name)
        })
        .collect()
}

/// Per-field state that spans rows: compiled patterns and unique values.
struct FieldChecks {
    patterns: HashMap<usize, Regex>,
    enums: HashMap<usize, Vec<String>>,
    unique: HashMap<usize, HashMap<String, usize>>,
}

impl FieldChecks {
    fn new(resource: &ResourceDescriptor) -> Self {
        let mut patterns = HashMap::new();
        let mut enums = HashMap::new();
        let mut unique = HashMap::new();
        for (index, field) in resource.schema.fields.iter().enumerate() {
            if let Some(pattern) = &field.constraints.pattern {
                match Regex::new(&format!("^(?:{pattern})$")) {
                    Ok(regex) => {
                        patterns.insert(index, regex);
                    }
                    Err(err) => warn!(
                        resource = %resource.name,
                        field = %field.name,
                        error = %err,
                        "ignoring invalid pattern constraint"
                    ),
                }
            }
            if let Some(values) = field.constraints.enum_strings() {
                enums.insert(index, values);
            }
            if field.constraints.unique {
                unique.insert(index, HashMap::new());
            }
        }
        Self {
            patterns,
            enums,
            unique,
        }
    }

    fn check_cell(
        &mut self,
        resource: &ResourceDescriptor,
        index: usize,
        field: &FieldSpec,
        value: &str,
        row_number: usize,
    ) -> Option<StructuralError> {
        let error = |kind, note: String| {
            Some(
                StructuralError::new(kind, note)
                    .at_row(row_number)
                    .at_field(index + 1, field.name.clone())
                    .with_cell(value.to_string()),
            )
        };
        let constraint = |name: &str, expected: String| {
            error(
                StructuralErrorKind::ConstraintError,
                format!("constraint \"{name}\" is \"{expected}\""),
            )
        };
        let constraints = &field.constraints;

        if resource.schema.is_missing(value) {
            if constraints.required {
                return constraint("required", "True".to_string());
            }
            return None;
        }

        if !is_valid_type(field, value) {
            return error(
                StructuralErrorKind::TypeError,
                format!(
                    "type is \"{}/{}\"",
                    field.field_type.as_str(),
                    format_name(field)
                ),
            );
        }

        if let Some(min) = constraints.min_length
            && value.chars().count() < min
        {
            return constraint("minLength", min.to_string());
        }
        if let Some(max) = constraints.max_length
            && value.chars().count() > max
        {
            return constraint("maxLength", max.to_string());
        }
        if let Some(regex) = self.patterns.get(&index)
            && !regex.is_match(value)
        {
            return constraint("pattern", constraints.pattern.clone().unwrap_or_default());
        }
        if let Some(values) = self.enums.get(&index)
            && !values.iter().any(|allowed| allowed == value)
        {
            return constraint("enum", format!("[{}]", values.join(", ")));
        }
        if let Some(min) = &constraints.minimum
            && compare_bound(field, value, min) == Some(Ordering::Less)
        {
            return constraint("minimum", bound_text(min));
        }
        if let Some(max) = &constraints.maximum
            && compare_bound(field, value, max) == Some(Ordering::Greater)
        {
            return constraint("maximum", bound_text(max));
        }

        if let Some(seen) = self.unique.get_mut(&index) {
            if let Some(first) = seen.get(value) {
                return error(
                    StructuralErrorKind::UniqueError,
                    format!("the same as in the row at position {first}"),
                );
            }
            seen.insert(value.to_string(), row_number);
        }
        None
    }
}

fn bound_text(bound: &serde_json::Value) -> String {
    match bound {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
