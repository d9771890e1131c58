//! Multipart upload intake: field lookup, filename checks and staging.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use axum::body::Bytes;
use axum::extract::Multipart;
use nyher_validate::ResourceBindings;
use tracing::debug;

use crate::error::ApiError;

/// One multipart field and the resource its file is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadField {
    pub field: &'static str,
    pub prefix: &'static str,
    pub resource: &'static str,
}

pub const UPLOAD_FIELDS: [UploadField; 4] = [
    UploadField {
        field: "QE_ADMIN_DATA_FILE",
        prefix: "QE_ADMIN_DATA_",
        resource: "qe_admin_data",
    },
    UploadField {
        field: "SCREENING_PROFILE_DATA_FILE",
        prefix: "SCREENING_PROFILE_DATA_",
        resource: "screening_profile_data",
    },
    UploadField {
        field: "SCREENING_OBSERVATION_DATA_FILE",
        prefix: "SCREENING_OBSERVATION_DATA_",
        resource: "screening_observation_data",
    },
    UploadField {
        field: "DEMOGRAPHIC_DATA_FILE",
        prefix: "DEMOGRAPHIC_DATA_",
        resource: "demographic_data",
    },
];

#[derive(Debug, Clone)]
struct Part {
    file_name: Option<String>,
    data: Bytes,
}

/// Uploaded files keyed by field name. Unknown fields are dropped.
#[derive(Debug, Default)]
pub struct Uploads {
    parts: HashMap<String, Part>,
}

/// A checked upload, ready to be written to the staging directory.
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub field: UploadField,
    pub file_name: String,
    pub data: Bytes,
}

impl Uploads {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut uploads = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            if !UPLOAD_FIELDS.iter().any(|known| known.field == name) {
                debug!(field = %name, "ignoring unknown upload field");
                continue;
            }
            let file_name = field.file_name().map(str::to_string);
            let data = field.bytes().await?;
            debug!(field = %name, bytes = data.len(), "received upload");
            uploads.parts.insert(name, Part { file_name, data });
        }
        Ok(uploads)
    }

    pub fn insert(&mut self, field: &str, file_name: Option<&str>, data: impl Into<Bytes>) {
        self.parts.insert(
            field.to_string(),
            Part {
                file_name: file_name.map(str::to_string),
                data: data.into(),
            },
        );
    }

    /// Check that every field is present and every filename is acceptable.
    ///
    /// All fields are checked for presence, then all prefixes, then the
    /// remaining filename rules, so the first failure in that order wins.
    pub fn check(&self) -> Result<Vec<StagedFile>, ApiError> {
        let mut parts = Vec::with_capacity(UPLOAD_FIELDS.len());
        for field in UPLOAD_FIELDS {
            let part = self
                .parts
                .get(field.field)
                .ok_or(ApiError::MissingFile { field: field.field })?;
            parts.push((field, part));
        }
        for (field, part) in &parts {
            check_prefix(field, part.file_name.as_deref())?;
        }
        parts
            .into_iter()
            .map(|(field, part)| -> Result<StagedFile, ApiError> {
                Ok(StagedFile {
                    field,
                    file_name: sanitize_filename(&field, part.file_name.as_deref())?,
                    data: part.data.clone(),
                })
            })
            .collect()
    }
}

fn check_prefix(field: &UploadField, file_name: Option<&str>) -> Result<(), ApiError> {
    match file_name {
        None | Some("") => Err(ApiError::MissingFilename),
        Some(name) if !name.starts_with(field.prefix) => Err(ApiError::InvalidPrefix {
            field: field.field,
            prefix: field.prefix,
        }),
        Some(_) => Ok(()),
    }
}

/// Accept only a bare file name that starts with the field's prefix and
/// uses `[A-Za-z0-9_.-]`.
pub fn sanitize_filename(field: &UploadField, file_name: Option<&str>) -> Result<String, ApiError> {
    check_prefix(field, file_name)?;
    let name = file_name.unwrap_or_default();
    if Path::new(name).file_name().and_then(OsStr::to_str) != Some(name) {
        return Err(ApiError::InvalidFilename);
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(ApiError::InvalidFilename);
    }
    Ok(name.to_string())
}

/// Write the files into `dir` and bind each to its resource.
pub fn stage(files: &[StagedFile], dir: &Path) -> Result<ResourceBindings, ApiError> {
    let mut bindings = ResourceBindings::new();
    for file in files {
        let path = dir.join(&file.file_name);
        debug!(file = %file.file_name, path = %path.display(), "staging upload");
        fs::write(&path, &file.data).map_err(|source| ApiError::Save {
            name: file.file_name.clone(),
            source,
        })?;
        bindings.bind(file.field.resource, path);
    }
    Ok(bindings)
}
