//! Configuration System
//!
//! Layered configuration for a compilation workspace: project layout, compiler
//! command line, artifact lookup and logging. Loaded once and handed to the
//! pipeline as an explicit value; nothing here is process-global.

use crate::compiler::CompilerConfig;
use crate::logging::LoggingConfig;
use crate::scan::normalize_lexically;
use crate::types::DependencyRef;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::workspace_file::WORKSPACE_CONFIG_FILE;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdlsyncConfig {
    /// Source layout and dependency set
    #[serde(default)]
    pub project: ProjectConfig,

    /// External compiler command line
    #[serde(default)]
    pub compiler: CompilerConfig,

    /// Where dependency archives are looked up
    #[serde(default)]
    pub artifacts: ArtifactsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Project layout; relative paths are resolved against the workspace root
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectConfig {
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Scratch directory receiving IDL files extracted from dependencies
    #[serde(default = "default_external_include_dir")]
    pub external_include_dir: PathBuf,

    /// Extra include directories, searched after the source directory
    #[serde(default)]
    pub include_paths: Vec<PathBuf>,

    /// Dependency coordinates (`organization:name:version`)
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Interface-definition file extension, without the dot
    #[serde(default = "default_idl_extension")]
    pub idl_extension: String,

    /// Extension of generated files reported after a run (empty = every file)
    #[serde(default = "default_generated_extension")]
    pub generated_extension: String,

    /// Remove extracted IDL files no longer provided by any dependency
    #[serde(default = "default_true")]
    pub prune_stale: bool,
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("src/main/thrift")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("target/generated/thrift")
}

fn default_external_include_dir() -> PathBuf {
    PathBuf::from("target/thrift-external")
}

fn default_idl_extension() -> String {
    "thrift".to_string()
}

fn default_generated_extension() -> String {
    "java".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            output_dir: default_output_dir(),
            external_include_dir: default_external_include_dir(),
            include_paths: Vec::new(),
            dependencies: Vec::new(),
            idl_extension: default_idl_extension(),
            generated_extension: default_generated_extension(),
            prune_stale: true,
        }
    }
}

/// Artifact lookup settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactsConfig {
    /// Local repository roots, searched before the user cache directory
    #[serde(default)]
    pub repositories: Vec<PathBuf>,

    /// Explicit archive locations for individual dependencies
    #[serde(default)]
    pub pinned: Vec<PinnedArtifact>,
}

/// One dependency mapped straight to an archive file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PinnedArtifact {
    pub dependency: String,
    pub archive: PathBuf,
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Project(String),
    Compiler(String),
    Artifacts(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Project(msg) => write!(f, "Project: {}", msg),
            ValidationError::Compiler(msg) => write!(f, "Compiler: {}", msg),
            ValidationError::Artifacts(msg) => write!(f, "Artifacts: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl ProjectConfig {
    /// Parse the configured dependency coordinates.
    pub fn dependency_refs(&self) -> Result<Vec<DependencyRef>, ValidationError> {
        self.dependencies
            .iter()
            .map(|d| {
                d.parse::<DependencyRef>()
                    .map_err(|e| ValidationError::Project(e.to_string()))
            })
            .collect()
    }

    fn validate(&self, errors: &mut Vec<ValidationError>) {
        if self.idl_extension.trim_start_matches('.').is_empty() {
            errors.push(ValidationError::Project(
                "idl_extension cannot be empty".to_string(),
            ));
        }
        if let Err(message) =
            check_layout(&self.source_dir, &self.output_dir, &self.external_include_dir)
        {
            errors.push(ValidationError::Project(message));
        }
        for dependency in &self.dependencies {
            if let Err(e) = dependency.parse::<DependencyRef>() {
                errors.push(ValidationError::Project(e.to_string()));
            }
        }
    }
}

impl IdlsyncConfig {
    /// Validate the entire configuration, collecting every problem
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        self.project.validate(&mut errors);

        if self.compiler.binary.trim().is_empty() {
            errors.push(ValidationError::Compiler(
                "binary cannot be empty".to_string(),
            ));
        }
        if self.compiler.include_flag.trim().is_empty() {
            errors.push(ValidationError::Compiler(
                "include_flag cannot be empty".to_string(),
            ));
        }
        if self.compiler.output_flag.trim().is_empty() {
            errors.push(ValidationError::Compiler(
                "output_flag cannot be empty".to_string(),
            ));
        }

        for pinned in &self.artifacts.pinned {
            if let Err(e) = pinned.dependency.parse::<DependencyRef>() {
                errors.push(ValidationError::Artifacts(e.to_string()));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Render as TOML, used when writing a starter workspace file
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Resolve a configured path against the workspace root
/// Reject directory layouts that break incremental runs.
///
/// The output dir must differ from the source dir. The external-include dir must sit
/// outside both: inside the output dir extraction moves the freshness marker, inside
/// the source dir extracted files are compiled as sources and every run looks stale.
/// Paths are compared after folding `.` and `..`. A relative path is never judged
/// against an absolute one here; resolve both against the workspace root first.
pub fn check_layout(source_dir: &Path, output_dir: &Path, external_dir: &Path) -> Result<(), String> {
    let source = normalize_lexically(source_dir);
    let output = normalize_lexically(output_dir);
    let external = normalize_lexically(external_dir);
    let comparable = |a: &Path, b: &Path| a.is_absolute() == b.is_absolute();

    if comparable(&source, &output) && source == output {
        return Err("output_dir must differ from source_dir".to_string());
    }
    if comparable(&external, &output) && external.starts_with(&output) {
        return Err(
            "external_include_dir must not be inside output_dir (extraction would move the freshness marker)"
                .to_string(),
        );
    }
    if comparable(&external, &source) && external.starts_with(&source) {
        return Err(
            "external_include_dir must not be inside source_dir (extracted files would be compiled as sources)"
                .to_string(),
        );
    }
    Ok(())
}

pub fn resolve_path(workspace_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        workspace_root.join(path)
    }
}
