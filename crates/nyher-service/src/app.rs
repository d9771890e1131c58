//! Router, shared state and request handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use nyher_model::ValidationReport;
use nyher_validate::Validator;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::error::ApiError;
use crate::upload::{StagedFile, Uploads, stage};

pub const VALIDATE_ROUTE: &str = "/validate_service_nyher_fhir_ig_equivalent/";

/// Prefix of the per-request staging directory.
pub const STAGING_PREFIX: &str = "nyher-fhir-ig-example-";

/// Largest accepted request body.
pub const UPLOAD_LIMIT: usize = 256 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    validator: Arc<Validator>,
    spec_path: Option<PathBuf>,
}

impl AppState {
    pub fn new(validator: Arc<Validator>, spec_path: Option<PathBuf>) -> Self {
        Self {
            validator,
            spec_path,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(VALIDATE_ROUTE, post(validate))
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn validate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ValidationReport>, ApiError> {
    let spec_path = state.spec_path.clone().ok_or(ApiError::SpecPathNotSet)?;
    debug!(spec = %spec_path.display(), "spec path");
    if !spec_path.is_file() {
        return Err(ApiError::SpecNotFound {
            path: spec_path.display().to_string(),
        });
    }

    let files = Uploads::read(multipart).await?.check()?;

    let validator = Arc::clone(&state.validator);
    let report = tokio::task::spawn_blocking(move || {
        validate_staged(&validator, &spec_path, &files, &std::env::temp_dir())
    })
    .await
    .map_err(|err| {
        error!(error = %err, "validation task failed");
        ApiError::ValidationFailed
    })??;

    info!(
        findings = report.errors_summary.len(),
        valid = report.is_clean(),
        "validation completed"
    );
    Ok(Json(report))
}

/// Stage `files` in a fresh directory under `root`, validate them and
/// remove the directory again. Runs on a blocking thread.
pub fn validate_staged(
    validator: &Validator,
    spec_path: &Path,
    files: &[StagedFile],
    root: &Path,
) -> Result<ValidationReport, ApiError> {
    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(root)
        .map_err(ApiError::Staging)?;
    let bindings = stage(files, staging.path())?;
    let report = validator.validate_spec_file(spec_path, &bindings);
    staging.close().map_err(ApiError::Staging)?;
    Ok(report)
}
