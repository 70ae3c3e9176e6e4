//! Staleness Detection
//!
//! Decides whether generated output must be rebuilt by comparing the newest
//! interface-definition file under the source directory with the output
//! directory's own modification time (the freshness marker).
//!
//! The comparison is directory-granular: a single newer file makes the whole
//! source set stale. Equal timestamps count as fresh.

use crate::error::ScanError;
use crate::scan::{Walker, WalkerConfig};
use crate::types::StalenessReport;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Scans a source directory and reports whether its output is out of date
#[derive(Debug, Clone)]
pub struct StalenessDetector {
    walker_config: WalkerConfig,
}

impl StalenessDetector {
    /// Detector for files ending in `.<idl_extension>`
    pub fn new(idl_extension: impl Into<String>) -> Self {
        Self {
            walker_config: WalkerConfig::for_extension(idl_extension),
        }
    }

    pub fn with_walker_config(walker_config: WalkerConfig) -> Self {
        Self { walker_config }
    }

    /// Compare the newest source file against the output directory.
    pub fn check(&self, source_dir: &Path, output_dir: &Path) -> Result<StalenessReport, ScanError> {
        let output_time = modified_time(output_dir)?;

        let scanned =
            Walker::with_config(source_dir.to_path_buf(), self.walker_config.clone()).walk()?;

        let most_recent = match scanned.iter().map(|f| f.modified).max() {
            Some(t) => t,
            None => {
                debug!(source_dir = %source_dir.display(), "No interface files found");
                return Ok(StalenessReport::empty(output_time));
            }
        };

        let stale = match output_time {
            Some(marker) => most_recent > marker,
            None => true,
        };

        let source_files: Vec<PathBuf> = scanned.into_iter().map(|f| f.path).collect();

        Ok(StalenessReport {
            stale,
            most_recent_source_time: Some(most_recent),
            source_files,
            output_time,
        })
    }
}

/// Stale check with the given interface-definition extension.
pub fn is_stale(
    source_dir: &Path,
    output_dir: &Path,
    idl_extension: &str,
) -> Result<StalenessReport, ScanError> {
    StalenessDetector::new(idl_extension).check(source_dir, output_dir)
}

/// Modification time of `path`, or None when it does not exist.
pub fn modified_time(path: &Path) -> Result<Option<SystemTime>, ScanError> {
    match std::fs::metadata(path) {
        Ok(meta) => meta
            .modified()
            .map(Some)
            .map_err(|e| ScanError::Metadata {
                path: path.to_path_buf(),
                source: e,
            }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ScanError::Metadata {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Set the modification time of a file or directory.
pub fn set_modified_time(path: &Path, time: SystemTime) -> std::io::Result<()> {
    open_for_times(path)?.set_modified(time)
}

#[cfg(not(windows))]
fn open_for_times(path: &Path) -> std::io::Result<File> {
    File::open(path)
}

#[cfg(windows)]
fn open_for_times(path: &Path) -> std::io::Result<File> {
    use std::os::windows::fs::OpenOptionsExt;
    // FILE_FLAG_BACKUP_SEMANTICS is required to open a directory handle
    std::fs::OpenOptions::new()
        .write(true)
        .custom_flags(0x0200_0000)
        .open(path)
}
