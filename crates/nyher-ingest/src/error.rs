//! Error types for spec and CSV ingestion.

use std::path::PathBuf;
use thiserror::Error;

use nyher_model::SpecError;

#[derive(Debug, Error)]
pub enum IngestError {
    // === Spec ===
    #[error("Specification file '{}' not found.", path.display())]
    SpecNotFound { path: PathBuf },

    #[error("failed to parse spec {path}: {source}")]
    SpecParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid spec {path}: {source}")]
    InvalidSpec {
        path: PathBuf,
        #[source]
        source: SpecError,
    },

    // === File system ===
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === CSV ===
    #[error("failed to parse CSV {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("CSV file has no header row: {path}")]
    MissingHeader { path: PathBuf },
}

impl IngestError {
    pub(crate) fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound { path }
        } else {
            Self::FileRead { path, source }
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_not_found_matches_cli_wording() {
        let err = IngestError::SpecNotFound {
            path: PathBuf::from("datapackage-nyher-fhir-ig-equivalent.json"),
        };
        assert_eq!(
            err.to_string(),
            "Specification file 'datapackage-nyher-fhir-ig-equivalent.json' not found."
        );
    }

    #[test]
    fn not_found_io_maps_to_file_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = IngestError::file_read("/data/x.csv", io);
        assert!(matches!(err, IngestError::FileNotFound { .. }));
    }
}
