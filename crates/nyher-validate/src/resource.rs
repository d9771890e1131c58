//! Validation of a single resource: load, normalize, structural check, rules.

use std::path::Path;

use nyher_ingest::{CsvOptions, CsvTable, read_csv_table};
use nyher_model::{
    Finding, ResourceDescriptor, ResourceTask, Row, StructuralError, StructuralErrorKind,
};
use nyher_rules::{Normalizer, RuleContext};
use tracing::{debug, info, warn};

use crate::package::Validator;

/// Everything one resource contributed to a run.
#[derive(Debug, Clone, Default)]
pub struct ResourceOutcome {
    pub resource: String,
    pub file_name: String,
    /// Rows as read, before normalization.
    pub raw_rows: Vec<Row>,
    /// `None` when the file was missing and nothing was checked.
    pub task: Option<ResourceTask>,
    pub file_missing: Option<Finding>,
    pub normalization: Vec<Finding>,
    pub rules: Vec<Finding>,
}

impl ResourceOutcome {
    fn new(resource: &ResourceDescriptor, path: &Path) -> Self {
        Self {
            resource: resource.name.clone(),
            file_name: path
                .file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned()),
            ..Self::default()
        }
    }

    /// Findings in report order, without the structural ones.
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.file_missing
            .iter()
            .chain(&self.normalization)
            .chain(&self.rules)
    }
}

impl Validator {
    /// CSV options for `resource`: its own dialect, else the configured one.
    pub fn csv_options(&self, resource: &ResourceDescriptor) -> CsvOptions {
        match (&resource.dialect, self.config().dialect_for(&resource.name)) {
            (Some(dialect), _) | (None, Some(dialect)) => CsvOptions::from_dialect(dialect),
            (None, None) => CsvOptions::default(),
        }
    }

    /// Validate one resource file.
    ///
    /// A missing file yields a single file-missing finding. A file that
    /// cannot be parsed yields a structural task holding one source error.
    pub fn validate_resource(&self, resource: &ResourceDescriptor, path: &Path) -> ResourceOutcome {
        let mut outcome = ResourceOutcome::new(resource, path);

        if !path.is_file() {
            warn!(resource = %resource.name, path = %path.display(), "resource file not found");
            outcome.file_missing = Some(Finding::file_missing(&resource.name, path.display()));
            return outcome;
        }

        let table = match read_csv_table(path, self.csv_options(resource)) {
            Ok(table) => table,
            Err(err) => {
                warn!(resource = %resource.name, error = %err, "failed to load resource");
                let mut task = ResourceTask::new(
                    resource.name.clone(),
                    path.display().to_string(),
                    Vec::new(),
                );
                task.push(StructuralError::new(
                    StructuralErrorKind::SourceError,
                    err.to_string(),
                ));
                outcome.task = Some(task);
                return outcome;
            }
        };

        outcome.raw_rows = table.rows().collect();
        let (rows, normalization) = self.normalize(resource, &table, &outcome.raw_rows);
        outcome.normalization = normalization;
        outcome.task = Some(self.structural().validate(resource, &table, &rows));

        let ctx =
            RuleContext::new(resource, &outcome.file_name).with_raw_rows(&outcome.raw_rows);
        outcome.rules = self.engine().run(&ctx, &rows);

        info!(
            resource = %resource.name,
            rows = rows.len(),
            normalization = outcome.normalization.len(),
            rules = outcome.rules.len(),
            "resource validated"
        );
        outcome
    }

    fn normalize(
        &self,
        resource: &ResourceDescriptor,
        table: &CsvTable,
        raw: &[Row],
    ) -> (Vec<Row>, Vec<Finding>) {
        let normalizer = Normalizer::new(self.aliases(), resource, &table.file_name());
        if normalizer.is_noop() {
            debug!(resource = %resource.name, "no aliased fields");
            return (raw.to_vec(), Vec::new());
        }
        let mut findings = Vec::new();
        let rows = raw
            .iter()
            .cloned()
            .map(|row| {
                let normalized = normalizer.normalize_row(row);
                findings.extend(normalized.findings);
                normalized.row
            })
            .collect();
        (rows, findings)
    }
}
