//! Error types for the idlsync compilation pipeline.

use crate::types::DependencyRef;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Filesystem scanning errors
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Failed to walk {path:?}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to read metadata for {path:?}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Dependency extraction errors
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Could not resolve archive for {dependency} (searched: {searched:?})")]
    Unresolved {
        dependency: DependencyRef,
        searched: Vec<PathBuf>,
    },

    #[error("Failed to unpack archive for {dependency}: {source}")]
    Archive {
        dependency: DependencyRef,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Extraction I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid dependency coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Failed to scan extraction directory: {0}")]
    Scan(#[from] ScanError),
}

/// Compiler invocation errors
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Failed to run schema compiler '{binary}': {source}")]
    Invocation {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Schema compiler '{binary}' did not finish within {timeout:?}")]
    TimedOut { binary: String, timeout: Duration },

    #[error("Failed to prepare output directory {path:?}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Pipeline-level errors surfaced to the caller
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("Compilation failed: {0}")]
    Compile(#[from] CompileError),

    #[error("Schema compiler exited with code {code}")]
    CompilerExit { code: i32 },

    #[error("Failed to update freshness marker on {path:?}: {source}")]
    Stamp {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove {path:?}: {source}")]
    Clean {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path:?}: {source}")]
    Init {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Watch error: {0}")]
    Watch(String),

    #[error("Failed to render output: {0}")]
    Render(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for PipelineError {
    fn from(err: config::ConfigError) -> Self {
        PipelineError::Config(err.to_string())
    }
}
