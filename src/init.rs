//! Workspace initialization
//!
//! Writes a starter `idlsync.toml` holding the default configuration so a
//! project can be adjusted from a known-good baseline via `idlsync init`.

use crate::config::{ConfigLoader, IdlsyncConfig};
use crate::error::PipelineError;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of initialization operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitResult {
    Created(PathBuf),
    /// The file already existed and `force` was not set
    Skipped(PathBuf),
}

/// Write the default workspace config file, overwriting only when `force` is set.
pub fn initialize_workspace(workspace_root: &Path, force: bool) -> Result<InitResult, PipelineError> {
    let path = ConfigLoader::workspace_config_path(workspace_root);
    if path.exists() && !force {
        return Ok(InitResult::Skipped(path));
    }

    let content = IdlsyncConfig::default()
        .to_toml()
        .map_err(|e| PipelineError::Config(format!("Failed to serialize default config: {}", e)))?;

    fs::create_dir_all(workspace_root).map_err(|e| PipelineError::Init {
        path: workspace_root.to_path_buf(),
        source: e,
    })?;
    fs::write(&path, content).map_err(|e| PipelineError::Init {
        path: path.clone(),
        source: e,
    })?;

    Ok(InitResult::Created(path))
}
