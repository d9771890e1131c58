//! Request errors and their HTTP responses.

use std::io;

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("SPEC_PATH not set")]
    SpecPathNotSet,

    #[error("Spec file not found at {path}")]
    SpecNotFound { path: String },

    #[error("Missing file {field}")]
    MissingFile { field: &'static str },

    #[error("Missing filename")]
    MissingFilename,

    #[error("Invalid filename")]
    InvalidFilename,

    #[error("Invalid file name for {field}. Must start with {prefix}")]
    InvalidPrefix {
        field: &'static str,
        prefix: &'static str,
    },

    #[error("Malformed upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Failed to create staging directory")]
    Staging(#[source] io::Error),

    #[error("Failed to save {name}")]
    Save {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Validation process failed.")]
    ValidationFailed,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Multipart(err) => err.status(),
            Self::Staging(_) | Self::Save { .. } | Self::ValidationFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "request rejected");
        }
        let body = match &self {
            Self::ValidationFailed => json!({ "error": self.to_string() }),
            _ => json!({ "detail": self.to_string(), "status_code": status.as_u16() }),
        };
        (status, Json(body)).into_response()
    }
}
