//! Field value normalization.
//!
//! Values of aliased fields are rewritten to a canonical case before
//! structural checks and rules see them. Only fields declared in the
//! resource schema are touched; everything else passes through unchanged.

use std::collections::BTreeMap;

use nyher_model::{Finding, ResourceDescriptor, Row};
use serde::Deserialize;

/// How an aliased field value is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    /// ASCII lowercase; non-ASCII characters are kept as-is.
    Lowercase,
    /// Unicode lowercase.
    Casefold,
}

impl Normalization {
    pub fn apply(self, value: &str) -> String {
        match self {
            Self::Lowercase => value.to_ascii_lowercase(),
            Self::Casefold => value.to_lowercase(),
        }
    }
}

/// Canonical field name to normalization. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: BTreeMap<String, Normalization>,
}

impl AliasTable {
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Normalization)>,
    {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Every listed field gets the same normalization.
    pub fn uniform<I, S>(fields: I, normalization: Normalization) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(fields.into_iter().map(|f| (f.into(), normalization)))
    }

    pub fn get(&self, field: &str) -> Option<Normalization> {
        self.entries.get(field).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Aliased fields the resource schema declares, in schema order.
    pub fn fields_for<'a>(
        &self,
        resource: &'a ResourceDescriptor,
    ) -> Vec<(&'a str, Normalization)> {
        resource
            .schema
            .fields
            .iter()
            .filter_map(|field| {
                self.get(&field.name)
                    .map(|norm| (field.name.as_str(), norm))
            })
            .collect()
    }
}

/// A row after normalization, with any findings raised for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRow {
    pub row: Row,
    pub findings: Vec<Finding>,
}

/// Normalizer bound to one resource and its source file.
#[derive(Debug)]
pub struct Normalizer<'a> {
    resource: &'a ResourceDescriptor,
    fields: Vec<(&'a str, Normalization)>,
    file_name: String,
}

impl<'a> Normalizer<'a> {
    pub fn new(table: &AliasTable, resource: &'a ResourceDescriptor, file_name: &str) -> Self {
        Self {
            resource,
            fields: table.fields_for(resource),
            file_name: file_name.to_string(),
        }
    }

    /// Whether any aliased field applies to this resource.
    pub fn is_noop(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn normalize_row(&self, mut row: Row) -> NormalizedRow {
        let mut findings = Vec::new();
        for &(field, normalization) in &self.fields {
            if !row.map_value(field, |value| normalization.apply(value)) {
                findings.push(
                    Finding::missing_field(field, &self.resource.name)
                        .with_file(self.file_name.clone())
                        .with_row(row.number()),
                );
            }
        }
        NormalizedRow { row, findings }
    }
}

/// Normalize one row of `resource`.
pub fn normalize_row(
    table: &AliasTable,
    resource: &ResourceDescriptor,
    file_name: &str,
    row: Row,
) -> NormalizedRow {
    Normalizer::new(table, resource, file_name).normalize_row(row)
}

/// Lazily normalize a stream of rows.
pub fn normalize_rows<'a, I>(
    table: &AliasTable,
    resource: &'a ResourceDescriptor,
    file_name: &str,
    rows: I,
) -> impl Iterator<Item = NormalizedRow> + 'a
where
    I: IntoIterator<Item = Row>,
    I::IntoIter: 'a,
{
    let normalizer = Normalizer::new(table, resource, file_name);
    rows.into_iter().map(move |row| normalizer.normalize_row(row))
}
