//! Core value types shared across the pipeline.

use crate::error::ExtractError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::SystemTime;

/// Packaged dependency coordinate: organization, name, version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencyRef {
    pub organization: String,
    pub name: String,
    pub version: String,
}

impl DependencyRef {
    pub fn new(
        organization: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            organization: organization.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    /// Archive file name conventionally used for this dependency (`name-version.jar`).
    pub fn archive_stem(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }
}

impl fmt::Display for DependencyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.organization, self.name, self.version)
    }
}

impl FromStr for DependencyRef {
    type Err = ExtractError;

    /// Parse `org:name:version`. Every part must be non-empty.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').map(str::trim).collect();
        match parts.as_slice() {
            [org, name, version] if !org.is_empty() && !name.is_empty() && !version.is_empty() => {
                Ok(DependencyRef::new(*org, *name, *version))
            }
            _ => Err(ExtractError::InvalidCoordinate(format!(
                "'{}' (expected organization:name:version)",
                s
            ))),
        }
    }
}

impl Serialize for DependencyRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DependencyRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Result of the staleness check over a source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StalenessReport {
    /// Whether regeneration is needed
    pub stale: bool,
    /// Newest modification time among the source files (None when there are none)
    pub most_recent_source_time: Option<SystemTime>,
    /// Sorted absolute paths of the interface-definition files found
    pub source_files: Vec<PathBuf>,
    /// Modification time of the output directory (None when it does not exist)
    pub output_time: Option<SystemTime>,
}

impl StalenessReport {
    /// Report for a source directory with nothing to compile.
    pub fn empty(output_time: Option<SystemTime>) -> Self {
        Self {
            stale: false,
            most_recent_source_time: None,
            source_files: Vec::new(),
            output_time,
        }
    }
}

/// Terminal state of a pipeline run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Output was already fresh; the compiler was not invoked
    Skipped,
    /// The compiler ran and exited successfully
    Compiled,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Skipped => write!(f, "skipped"),
            RunState::Compiled => write!(f, "compiled"),
        }
    }
}

/// Outcome of a successful pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub state: RunState,
    pub generated_files: Vec<PathBuf>,
    pub extracted_files: Vec<PathBuf>,
}
