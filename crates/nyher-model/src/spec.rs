//! Package descriptor types.
//!
//! A package ("spec") declares the logical resources expected in one
//! submission together with their table schemas. Physical file paths are
//! not part of the descriptor; they are bound by resource name when a
//! package is validated.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SpecError;

/// Ordered set of resource descriptors, immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub resources: Vec<ResourceDescriptor>,
    /// Descriptor keys not interpreted here, kept as given.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Spec {
    pub fn new(name: Option<String>, resources: Vec<ResourceDescriptor>) -> Self {
        Self {
            name,
            resources,
            extra: Map::new(),
        }
    }

    /// Check descriptor invariants: unique non-empty resource names, unique
    /// field names per resource, primary keys referring to declared fields.
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.resources.is_empty() {
            return Err(SpecError::NoResources);
        }
        let mut names = BTreeSet::new();
        for (index, resource) in self.resources.iter().enumerate() {
            if resource.name.trim().is_empty() {
                return Err(SpecError::EmptyResourceName { index });
            }
            if !names.insert(resource.name.as_str()) {
                return Err(SpecError::DuplicateResource {
                    name: resource.name.clone(),
                });
            }
            let mut fields = BTreeSet::new();
            for field in &resource.schema.fields {
                if !fields.insert(field.name.as_str()) {
                    return Err(SpecError::DuplicateField {
                        resource: resource.name.clone(),
                        field: field.name.clone(),
                    });
                }
            }
            for key in resource.schema.primary_key_fields() {
                if !fields.contains(key) {
                    return Err(SpecError::UnknownPrimaryKey {
                        resource: resource.name.clone(),
                        field: key.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn resource(&self, name: &str) -> Option<&ResourceDescriptor> {
        self.resources.iter().find(|resource| resource.name == name)
    }

    pub fn resource_names(&self) -> impl Iterator<Item = &str> {
        self.resources.iter().map(|resource| resource.name.as_str())
    }
}

/// One logical CSV dataset bound to a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub schema: Schema,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialect: Option<Dialect>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResourceDescriptor {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            title: None,
            schema,
            dialect: None,
            extra: Map::new(),
        }
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.schema.field(name).is_some()
    }

    pub fn skip_initial_space(&self) -> bool {
        self.dialect
            .as_ref()
            .is_some_and(|dialect| dialect.skip_initial_space)
    }
}

/// CSV dialect options a resource may override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dialect {
    #[serde(default)]
    pub skip_initial_space: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
}

impl Dialect {
    /// Single-byte delimiter, if one is configured.
    pub fn delimiter_byte(&self) -> Option<u8> {
        let delimiter = self.delimiter.as_deref()?;
        match delimiter.as_bytes() {
            [byte] => Some(*byte),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub fields: Vec<FieldSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<PrimaryKey>,
    #[serde(default = "default_missing_values")]
    pub missing_values: Vec<String>,
}

fn default_missing_values() -> Vec<String> {
    vec![String::new()]
}

impl Schema {
    /// Schema with the given fields and default missing values.
    pub fn with_fields(fields: Vec<FieldSpec>) -> Self {
        Self {
            fields,
            primary_key: None,
            missing_values: default_missing_values(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    pub fn primary_key_fields(&self) -> Vec<&str> {
        match &self.primary_key {
            Some(PrimaryKey::Single(name)) => vec![name.as_str()],
            Some(PrimaryKey::Composite(names)) => names.iter().map(String::as_str).collect(),
            None => Vec::new(),
        }
    }

    /// Whether a raw cell counts as a missing value under this schema.
    pub fn is_missing(&self, value: &str) -> bool {
        self.missing_values.iter().any(|missing| missing == value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryKey {
    Single(String),
    Composite(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub constraints: Constraints,
}

impl FieldSpec {
    /// Untyped, unconstrained string field.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::String,
            format: None,
            description: None,
            constraints: Constraints::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Integer,
    Number,
    Boolean,
    Date,
    Datetime,
    Time,
    Year,
    Any,
    #[serde(other)]
    Other,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::Time => "time",
            Self::Year => "year",
            Self::Any => "any",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Value>,
}

impl Constraints {
    /// Enum members rendered as plain strings (numbers and booleans included).
    pub fn enum_strings(&self) -> Option<Vec<String>> {
        self.enum_values.as_ref().map(|values| {
            values
                .iter()
                .map(|value| match value {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: &str = r#"{
        "name": "csv-validation-using-ig",
        "resources": [
            {
                "name": "qe_admin_data",
                "path": "QE_ADMIN_DATA_partner1.csv",
                "dialect": {"skipInitialSpace": true},
                "schema": {
                    "primaryKey": ["PATIENT_MR_ID_VALUE"],
                    "fields": [
                        {"name": "PATIENT_MR_ID_VALUE", "type": "string", "constraints": {"required": true}},
                        {"name": "FACILITY_STATE", "type": "string", "constraints": {"enum": ["ny", "nj"]}},
                        {"name": "ENCOUNTER_DATE", "type": "geopoint"}
                    ]
                }
            }
        ]
    }"#;

    #[test]
    fn parses_table_schema_subset() {
        let spec: Spec = serde_json::from_str(SPEC).expect("parse spec");
        spec.validate().expect("valid spec");
        let resource = spec.resource("qe_admin_data").expect("resource");
        assert!(resource.skip_initial_space());
        assert_eq!(resource.schema.primary_key_fields(), vec!["PATIENT_MR_ID_VALUE"]);
        assert_eq!(resource.schema.missing_values, vec![String::new()]);
        let state = resource.schema.field("FACILITY_STATE").expect("field");
        assert_eq!(
            state.constraints.enum_strings(),
            Some(vec!["ny".to_string(), "nj".to_string()])
        );
        assert_eq!(
            resource.schema.field("ENCOUNTER_DATE").map(|f| f.field_type),
            Some(FieldType::Other)
        );
    }

    #[test]
    fn keeps_unknown_descriptor_keys() {
        let spec: Spec = serde_json::from_str(SPEC).expect("parse spec");
        let resource = &spec.resources[0];
        assert_eq!(resource.extra["path"], "QE_ADMIN_DATA_partner1.csv");
        let json = serde_json::to_value(&spec).expect("serialize spec");
        assert_eq!(json["resources"][0]["path"], "QE_ADMIN_DATA_partner1.csv");
        assert!(spec.extra.is_empty());
    }

    #[test]
    fn rejects_duplicate_resources() {
        let mut spec: Spec = serde_json::from_str(SPEC).expect("parse spec");
        let copy = spec.resources[0].clone();
        spec.resources.push(copy);
        assert_eq!(
            spec.validate(),
            Err(SpecError::DuplicateResource {
                name: "qe_admin_data".to_string()
            })
        );
    }
}
