//! Config loading facade: assembles sources in precedence order and deserializes.

use super::merge::merge_policy;
use super::sources::{global_file, workspace_file};
use super::IdlsyncConfig;
use config::{ConfigError, File};
use std::path::{Path, PathBuf};

/// Loads `IdlsyncConfig` from layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Defaults, then the global file, then the workspace files, then environment.
    pub fn load(workspace_root: &Path) -> Result<IdlsyncConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = merge_policy::add_env_overrides(builder);
        builder.build()?.try_deserialize()
    }

    /// Load configuration from one explicit file (defaults and environment still apply).
    pub fn load_from_file(path: &Path) -> Result<IdlsyncConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()).required(true));
        let builder = merge_policy::add_env_overrides(builder);
        builder.build()?.try_deserialize()
    }

    /// Load from `config_file` when given, otherwise discover sources for the workspace.
    pub fn load_for(workspace_root: &Path, config_file: Option<&Path>) -> Result<IdlsyncConfig, ConfigError> {
        match config_file {
            Some(path) => Self::load_from_file(path),
            None => Self::load(workspace_root),
        }
    }

    /// Path of the global config file, if HOME or XDG_CONFIG_HOME is set.
    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }

    /// Path of the workspace config file.
    pub fn workspace_config_path(workspace_root: &Path) -> PathBuf {
        workspace_file::workspace_config_path(workspace_root)
    }
}
