use std::path::Path;

use nyher_model::Spec;
use tracing::debug;

use crate::error::{IngestError, Result};

/// Load and check a package spec from a JSON file.
pub fn load_spec(path: &Path) -> Result<Spec> {
    if !path.is_file() {
        return Err(IngestError::SpecNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path).map_err(|e| IngestError::file_read(path, e))?;
    let spec = parse_spec(&text, path)?;
    debug!(
        path = %path.display(),
        resources = spec.resources.len(),
        "loaded package spec"
    );
    Ok(spec)
}

/// Parse a package spec from JSON text; `origin` is used in error messages.
pub fn parse_spec(text: &str, origin: &Path) -> Result<Spec> {
    let spec: Spec = serde_json::from_str(text).map_err(|source| IngestError::SpecParse {
        path: origin.to_path_buf(),
        source,
    })?;
    spec.validate().map_err(|source| IngestError::InvalidSpec {
        path: origin.to_path_buf(),
        source,
    })?;
    Ok(spec)
}
