//! Binding physical files to package resources.
//!
//! A package spec names its resources; the files arrive positionally (CLI),
//! as named uploads (HTTP), or by file-name prefix in a data directory. A
//! [`BindingProfile`] fixes which resource each position or prefix maps to.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use nyher_ingest::find_file;
use tracing::debug;

use crate::error::{BindingError, Result};

/// Resource name to physical path, in binding order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceBindings {
    entries: Vec<(String, PathBuf)>,
}

impl ResourceBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `resource` to `path`, replacing an earlier binding.
    pub fn bind(&mut self, resource: impl Into<String>, path: impl Into<PathBuf>) {
        let resource = resource.into();
        let path = path.into();
        match self.entries.iter_mut().find(|(name, _)| *name == resource) {
            Some((_, existing)) => *existing = path,
            None => self.entries.push((resource, path)),
        }
    }

    #[must_use]
    pub fn with(mut self, resource: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.bind(resource, path);
        self
    }

    pub fn get(&self, resource: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(name, _)| name == resource)
            .map(|(_, path)| path.as_path())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries
            .iter()
            .map(|(name, path)| (name.as_str(), path.as_path()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N, P> FromIterator<(N, P)> for ResourceBindings
where
    N: Into<String>,
    P: Into<PathBuf>,
{
    fn from_iter<I: IntoIterator<Item = (N, P)>>(iter: I) -> Self {
        let mut bindings = Self::new();
        for (name, path) in iter {
            bindings.bind(name, path);
        }
        bindings
    }
}

/// Known submission layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingProfile {
    /// Demographic, QE admin and a single screening file.
    ThreeFile,
    /// QE admin, screening profile, screening observation and demographic.
    FourFile,
    /// QE admin, five screening files and demographic.
    SevenFile,
}

impl BindingProfile {
    pub const ALL: [Self; 3] = [Self::ThreeFile, Self::FourFile, Self::SevenFile];

    pub fn name(self) -> &'static str {
        match self {
            Self::ThreeFile => "three-file",
            Self::FourFile => "four-file",
            Self::SevenFile => "seven-file",
        }
    }

    /// Resource names, in positional order.
    pub fn resources(self) -> &'static [&'static str] {
        match self {
            Self::ThreeFile => &["demographic_data", "qe_admin_data", "screening_data"],
            Self::FourFile => &[
                "qe_admin_data",
                "screening_profile_data",
                "screening_observation_data",
                "demographic_data",
            ],
            Self::SevenFile => &[
                "qe_admin_data",
                "screening_observation_data",
                "screening_location_data",
                "screening_encounter_data",
                "screening_consent_data",
                "screening_resources_data",
                "demographic_data",
            ],
        }
    }

    /// File name prefixes used for directory discovery, aligned with
    /// [`resources`](Self::resources).
    pub fn file_prefixes(self) -> &'static [&'static str] {
        match self {
            Self::ThreeFile => &["DEMOGRAPHIC_DATA", "QE_ADMIN_DATA", "SCREENING"],
            Self::FourFile => &[
                "QE_ADMIN_DATA_",
                "SCREENING_PROFILE_DATA_",
                "SCREENING_OBSERVATION_DATA_",
                "DEMOGRAPHIC_DATA_",
            ],
            Self::SevenFile => &[
                "QE_ADMIN_DATA_",
                "SCREENING_OBSERVATION_DATA_",
                "SCREENING_LOCATION_DATA_",
                "SCREENING_ENCOUNTER_DATA_",
                "SCREENING_CONSENT_DATA_",
                "SCREENING_RESOURCES_DATA_",
                "DEMOGRAPHIC_DATA_",
            ],
        }
    }

    pub fn file_count(self) -> usize {
        self.resources().len()
    }

    pub fn for_file_count(count: usize) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|profile| profile.file_count() == count)
            .ok_or(BindingError::NoProfileForCount { count })
    }

    /// `<file1> <file2> ...` placeholder list for usage messages.
    pub fn usage(self) -> String {
        (1..=self.file_count())
            .map(|n| format!("<file{n}>"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Bind positional files to this profile's resources.
    pub fn bind<P: AsRef<Path>>(self, files: &[P]) -> Result<ResourceBindings> {
        if files.len() != self.file_count() {
            return Err(BindingError::FileCount {
                expected: self.file_count(),
                actual: files.len(),
                usage: self.usage(),
            });
        }
        Ok(self
            .resources()
            .iter()
            .zip(files)
            .map(|(resource, path)| (*resource, path.as_ref().to_path_buf()))
            .collect())
    }

    /// Bind the first CSV in `dir` matching each resource's prefix.
    ///
    /// Resources without a matching file are bound to the glob they were
    /// looked up with, so the missing-file check reports them.
    pub fn discover(self, dir: &Path) -> nyher_ingest::Result<ResourceBindings> {
        let mut bindings = ResourceBindings::new();
        for (resource, prefix) in self.resources().iter().zip(self.file_prefixes()) {
            let path = find_file(dir, prefix)?.unwrap_or_else(|| dir.join(format!("{prefix}*.csv")));
            debug!(resource, path = %path.display(), "discovered input");
            bindings.bind(*resource, path);
        }
        Ok(bindings)
    }
}

impl fmt::Display for BindingProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BindingProfile {
    type Err = BindingError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|profile| profile.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| BindingError::UnknownProfile {
                name: s.to_string(),
            })
    }
}
