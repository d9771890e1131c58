//! Package validation: binds files to resources, runs the structural check
//! and the rule engine on each, and assembles the report.
//!
//! ```no_run
//! use std::path::Path;
//! use nyher_validate::{BindingProfile, Validator};
//!
//! let validator = Validator::embedded()?;
//! let bindings = BindingProfile::FourFile.bind(&[
//!     "QE_ADMIN_DATA_partner1.csv",
//!     "SCREENING_PROFILE_DATA_partner1.csv",
//!     "SCREENING_OBSERVATION_DATA_partner1.csv",
//!     "DEMOGRAPHIC_DATA_partner1.csv",
//! ])?;
//! let report = validator.validate_spec_file(Path::new("datapackage.json"), &bindings);
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod assemble;
pub mod bindings;
pub mod error;
pub mod package;
pub mod resource;
pub mod structural;

pub use assemble::{ReportAssembler, dedupe_missing_fields, structural_findings};
pub use bindings::{BindingProfile, ResourceBindings};
pub use error::{BindingError, Result};
pub use package::{Validator, missing_files};
pub use resource::ResourceOutcome;
pub use structural::{SchemaChecker, StructuralValidator};
