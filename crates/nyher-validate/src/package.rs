//! Package orchestration.
//!
//! A run checks that every bound file exists before anything is parsed.
//! If one is missing the run stops there: the report carries only
//! file-missing findings and no structural report. Otherwise each resource
//! is validated in spec order and the results are assembled into one report.
//! A resource whose validation panics contributes one unexpected-error
//! finding; its siblings are still validated.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use nyher_ingest::{IngestError, load_spec};
use nyher_model::{Finding, FindingKind, OriginalData, Spec, StructuralReport, ValidationReport};
use nyher_rules::{AliasTable, RuleConfig, RuleEngine};
use tracing::{error, info, warn};

use crate::assemble::ReportAssembler;
use crate::bindings::ResourceBindings;
use crate::structural::{SchemaChecker, StructuralValidator};

/// Validates packages against one rule configuration.
///
/// Built once and shared read-only; a `Validator` holds no per-run state.
pub struct Validator {
    config: Arc<RuleConfig>,
    aliases: AliasTable,
    engine: RuleEngine,
    structural: Box<dyn StructuralValidator>,
    include_original_data: bool,
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("aliases", &self.aliases.len())
            .field("engine", &self.engine)
            .field("include_original_data", &self.include_original_data)
            .finish_non_exhaustive()
    }
}

impl Validator {
    pub fn new(config: Arc<RuleConfig>) -> Self {
        Self {
            aliases: config.alias_table(),
            engine: RuleEngine::from_config(&config),
            structural: Box::new(SchemaChecker::new()),
            include_original_data: true,
            config,
        }
    }

    /// Validator over the compiled-in screening rules.
    pub fn embedded() -> nyher_rules::Result<Self> {
        Ok(Self::new(Arc::new(RuleConfig::embedded()?)))
    }

    /// Replace the structural engine.
    #[must_use]
    pub fn with_structural(mut self, structural: impl StructuralValidator + 'static) -> Self {
        self.structural = Box::new(structural);
        self
    }

    /// Whether reports carry the raw rows under `originalData`.
    #[must_use]
    pub fn include_original_data(mut self, include: bool) -> Self {
        self.include_original_data = include;
        self
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    pub(crate) fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub(crate) fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub(crate) fn structural(&self) -> &dyn StructuralValidator {
        self.structural.as_ref()
    }

    /// Validate the files in `bindings` against `spec`.
    ///
    /// Bindings for resources the spec does not declare are ignored.
    pub fn validate_package(&self, spec: &Spec, bindings: &ResourceBindings) -> ValidationReport {
        let missing = missing_files(spec, bindings);
        if !missing.is_empty() {
            warn!(missing = missing.len(), "input files missing, skipping validation");
            return ValidationReport::with_findings(missing);
        }

        let mut assembler = ReportAssembler::new();
        let mut original = OriginalData::default();
        let mut tasks = Vec::with_capacity(spec.resources.len());

        for resource in &spec.resources {
            let Some(path) = bindings.get(&resource.name) else {
                continue;
            };
            let outcome = match panic::catch_unwind(AssertUnwindSafe(|| {
                self.validate_resource(resource, path)
            })) {
                Ok(outcome) => outcome,
                Err(payload) => {
                    let detail = panic_detail(payload.as_ref());
                    error!(
                        resource = %resource.name,
                        path = %path.display(),
                        detail,
                        "resource validation aborted"
                    );
                    let file_name = path.file_name().map_or_else(
                        || path.display().to_string(),
                        |name| name.to_string_lossy().into_owned(),
                    );
                    assembler.unexpected(
                        Finding::unexpected(format!(
                            "An unexpected error occurred while validating '{}': {detail}",
                            resource.name
                        ))
                        .with_file(file_name),
                    );
                    continue;
                }
            };
            if let Some(finding) = outcome.file_missing {
                assembler.file_missing(finding);
            }
            assembler.normalization(outcome.normalization);
            assembler.rules(outcome.rules);
            tasks.extend(outcome.task);
            original.insert(outcome.resource, outcome.raw_rows);
        }

        assembler.structural(StructuralReport::from_tasks(tasks));
        if self.include_original_data {
            assembler.original_data(original);
        }
        let report = assembler.finish();
        info!(
            findings = report.errors_summary.len(),
            valid = report.is_clean(),
            "package validated"
        );
        report
    }

    /// Load the spec at `spec_path` and validate `bindings` against it.
    ///
    /// Never fails: an unreadable spec or an internal fault becomes a
    /// finding in the returned report.
    pub fn validate_spec_file(&self, spec_path: &Path, bindings: &ResourceBindings) -> ValidationReport {
        let spec = match load_spec(spec_path) {
            Ok(spec) => spec,
            Err(err) => {
                error!(path = %spec_path.display(), error = %err, "failed to load spec");
                return ValidationReport::with_findings(vec![spec_finding(&err)]);
            }
        };

        match panic::catch_unwind(AssertUnwindSafe(|| self.validate_package(&spec, bindings))) {
            Ok(report) => report,
            Err(payload) => {
                let detail = panic_detail(payload.as_ref());
                error!(detail, "validation aborted");
                ValidationReport::with_findings(vec![Finding::unexpected(format!(
                    "An unexpected error occurred: {detail}"
                ))])
            }
        }
    }
}

fn panic_detail(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

fn spec_finding(err: &IngestError) -> Finding {
    match err {
        IngestError::SpecNotFound { .. } => {
            Finding::new(FindingKind::FileMissingError, err.to_string())
        }
        _ => Finding::unexpected(format!("An unexpected error occurred: {err}")),
    }
}

/// One finding per spec resource whose bound file does not exist.
pub fn missing_files(spec: &Spec, bindings: &ResourceBindings) -> Vec<Finding> {
    spec.resources
        .iter()
        .filter_map(|resource| match bindings.get(&resource.name) {
            Some(path) if path.is_file() => None,
            Some(path) => Some(Finding::file_missing(&resource.name, path.display())),
            None => Some(
                Finding::new(
                    FindingKind::FileMissingError,
                    format!("File for resource '{}' not found.", resource.name),
                )
                .with_field(resource.name.clone()),
            ),
        })
        .collect()
}
