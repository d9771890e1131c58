//! HTTP upload service for screening CSV packages.
//!
//! One `POST` endpoint takes the four files of a submission as multipart
//! fields, stages them in a private temporary directory and answers with
//! the same JSON report the command-line validator writes.

pub mod app;
pub mod config;
pub mod error;
pub mod upload;

pub use app::{AppState, STAGING_PREFIX, VALIDATE_ROUTE, router};
pub use config::{ConfigError, ServiceConfig};
pub use error::ApiError;
pub use upload::{UPLOAD_FIELDS, UploadField, Uploads, sanitize_filename, stage};
