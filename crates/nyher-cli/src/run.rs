//! One command-line validation run: argument resolution, validation and
//! report output.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use nyher_ingest::IngestError;
use nyher_model::{Finding, FindingKind, ValidationReport};
use nyher_validate::{BindingError, BindingProfile, ResourceBindings, Validator};
use serde::Serialize;
use tracing::{info, trace, warn};

use crate::logging::redact_value;

/// Output file used when the given one does not end in `.json`.
pub const DEFAULT_OUTPUT: &str = "output.json";

/// Profile whose usage is shown when no profile fits the argument count.
const USAGE_PROFILE: BindingProfile = BindingProfile::FourFile;

/// Positional arguments and binding options of one run.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    pub spec_path: Option<PathBuf>,
    /// Input files, optionally followed by the output path.
    pub args: Vec<PathBuf>,
    pub profile: Option<BindingProfile>,
    pub data_dir: Option<PathBuf>,
}

/// Inputs bound to resources, and where the report goes.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub spec_path: PathBuf,
    pub bindings: ResourceBindings,
    pub output: Option<PathBuf>,
}

#[derive(Debug)]
pub struct Outcome {
    pub report: ValidationReport,
    pub output: Option<PathBuf>,
    pub exit_code: i32,
}

impl Invocation {
    /// Bind the arguments to resources.
    ///
    /// Errors here are argument errors: they are reported as such and the
    /// run exits with status 1.
    pub fn resolve(&self) -> Result<Resolved> {
        let Some(spec_path) = self.spec_path.clone() else {
            bail!(count_error(USAGE_PROFILE, 0));
        };

        if let Some(dir) = &self.data_dir {
            let profile = self.profile.unwrap_or(USAGE_PROFILE);
            let output = match self.args.as_slice() {
                [] => None,
                [output] => Some(output_path(output)),
                _ => bail!("--data-dir takes at most one positional argument after SPEC_PATH (the output path)"),
            };
            let bindings = profile
                .discover(dir)
                .with_context(|| format!("failed to discover input files in {}", dir.display()))?;
            return Ok(Resolved {
                spec_path,
                bindings,
                output,
            });
        }

        let (profile, files, output) = match self.profile {
            Some(profile) => split_for(profile, &self.args)?,
            None => infer(&self.args)?,
        };
        let bindings = profile.bind(files)?;
        info!(profile = %profile, files = files.len(), "bound input files");
        Ok(Resolved {
            spec_path,
            bindings,
            output,
        })
    }
}

fn count_error(profile: BindingProfile, actual: usize) -> BindingError {
    BindingError::FileCount {
        expected: profile.file_count(),
        actual,
        usage: profile.usage(),
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Output path for the report; anything not ending in `.json` is replaced.
pub fn output_path(raw: &Path) -> PathBuf {
    if is_json(raw) {
        raw.to_path_buf()
    } else {
        warn!(
            given = %raw.display(),
            "output path must end with .json, writing to {DEFAULT_OUTPUT}"
        );
        PathBuf::from(DEFAULT_OUTPUT)
    }
}

type Split<'a> = (BindingProfile, &'a [PathBuf], Option<PathBuf>);

fn split_for(profile: BindingProfile, args: &[PathBuf]) -> Result<Split<'_>, BindingError> {
    let count = profile.file_count();
    match args.len() {
        n if n == count => Ok((profile, args, None)),
        n if n == count + 1 => Ok((profile, &args[..count], Some(output_path(&args[count])))),
        n => Err(count_error(profile, n)),
    }
}

/// Pick a profile from the argument count. A trailing `.json` argument is
/// always the output path.
fn infer(args: &[PathBuf]) -> Result<Split<'_>, BindingError> {
    if let Some((last, files)) = args.split_last()
        && is_json(last)
    {
        let profile = BindingProfile::for_file_count(files.len())
            .map_err(|_| count_error(USAGE_PROFILE, files.len()))?;
        return Ok((profile, files, Some(last.clone())));
    }
    if let Ok(profile) = BindingProfile::for_file_count(args.len()) {
        return Ok((profile, args, None));
    }
    match args.split_last() {
        Some((last, files)) => match BindingProfile::for_file_count(files.len()) {
            Ok(profile) => Ok((profile, files, Some(output_path(last)))),
            Err(_) => Err(count_error(USAGE_PROFILE, args.len())),
        },
        None => Err(count_error(USAGE_PROFILE, 0)),
    }
}

/// Resolve, validate and produce the report with its exit code.
pub fn execute(invocation: &Invocation, validator: &Validator) -> Outcome {
    let resolved = match invocation.resolve() {
        Ok(resolved) => resolved,
        Err(err) => {
            warn!(error = %err, "invalid arguments");
            return Outcome {
                report: ValidationReport::with_findings(vec![Finding::argument_error(
                    err.to_string(),
                )]),
                output: None,
                exit_code: 1,
            };
        }
    };

    if !resolved.spec_path.is_file() {
        let err = IngestError::SpecNotFound {
            path: resolved.spec_path.clone(),
        };
        return Outcome {
            report: ValidationReport::with_findings(vec![Finding::new(
                FindingKind::FileMissingError,
                err.to_string(),
            )]),
            output: resolved.output,
            exit_code: 1,
        };
    }

    let report = validator.validate_spec_file(&resolved.spec_path, &resolved.bindings);
    for finding in &report.errors_summary {
        trace!(
            kind = finding.kind.as_str(),
            row = finding.row_number,
            message = redact_value(&finding.message),
            "finding"
        );
    }
    Outcome {
        report,
        output: resolved.output,
        exit_code: 0,
    }
}

/// Pretty JSON with four-space indentation.
pub fn to_pretty_json(report: &ValidationReport) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    report
        .serialize(&mut serializer)
        .context("failed to serialize report")?;
    String::from_utf8(buf).context("report is not valid UTF-8")
}

/// Write the report to `output`, or print it when there is none.
pub fn write_report(report: &ValidationReport, output: Option<&Path>) -> Result<()> {
    let json = to_pretty_json(report)?;
    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
            println!("Validation results written to '{}'.", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
