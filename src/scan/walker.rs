//! Filesystem walker for collecting files by extension

use crate::error::ScanError;
use crate::scan::path::has_extension;
use std::path::PathBuf;
use std::time::SystemTime;
use walkdir::{DirEntry, WalkDir};

/// A regular file found by the walker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Filesystem walker configuration
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// File extension to collect, without the leading dot (empty = every file)
    pub extension: String,
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Directory or file names to skip entirely (e.g. ".git")
    pub ignore_patterns: Vec<String>,
    /// Maximum depth to traverse (None = unlimited)
    pub max_depth: Option<usize>,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            extension: String::new(),
            follow_symlinks: true,
            ignore_patterns: vec![".git".to_string()],
            max_depth: None,
        }
    }
}

impl WalkerConfig {
    /// Default configuration restricted to one extension
    pub fn for_extension(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            ..Self::default()
        }
    }
}

/// Filesystem walker
pub struct Walker {
    root: PathBuf,
    config: WalkerConfig,
}

impl Walker {
    /// Create a walker collecting every file under `root`
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            config: WalkerConfig::default(),
        }
    }

    /// Create a walker with custom configuration
    pub fn with_config(root: PathBuf, config: WalkerConfig) -> Self {
        Self { root, config }
    }

    /// Walk the filesystem and collect matching files.
    ///
    /// A missing root yields an empty list. Files are sorted by path for determinism.
    pub fn walk(&self) -> Result<Vec<ScannedFile>, ScanError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .max_depth(self.config.max_depth.unwrap_or(usize::MAX))
            .into_iter()
            .filter_entry(|entry| !self.should_ignore(entry));

        for entry in walker {
            let entry = entry.map_err(|e| ScanError::Walk {
                path: self.root.clone(),
                source: e,
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path().to_path_buf();
            if !has_extension(&path, &self.config.extension) {
                continue;
            }

            let modified = entry
                .metadata()
                .map_err(|e| ScanError::Walk {
                    path: path.clone(),
                    source: e,
                })?
                .modified()
                .map_err(|e| ScanError::Metadata {
                    path: path.clone(),
                    source: e,
                })?;

            files.push(ScannedFile { path, modified });
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(files)
    }

    /// Walk and keep only the paths
    pub fn paths(&self) -> Result<Vec<PathBuf>, ScanError> {
        Ok(self.walk()?.into_iter().map(|f| f.path).collect())
    }

    fn should_ignore(&self, entry: &DirEntry) -> bool {
        // Never filter the root itself, even if its name matches a pattern
        if entry.depth() == 0 {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        self.config
            .ignore_patterns
            .iter()
            .any(|pattern| name == pattern.as_str())
    }
}
