//! Dependency IDL Extraction
//!
//! Unpacks the interface-definition files bundled inside dependency archives into
//! the external-include directory so the schema compiler can find them on its
//! search path. Only entries with the IDL extension are written; entry paths are
//! kept relative to the target directory.

pub mod resolver;

pub use resolver::{ArtifactResolver, ChainResolver, LocalRepositoryResolver, StaticResolver};

use crate::error::ExtractError;
use crate::scan::{has_extension, Walker, WalkerConfig};
use crate::types::DependencyRef;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Extracts IDL entries from dependency archives
#[derive(Debug, Clone)]
pub struct ArchiveExtractor {
    idl_extension: String,
    prune_stale: bool,
}

impl ArchiveExtractor {
    pub fn new(idl_extension: impl Into<String>) -> Self {
        Self {
            idl_extension: idl_extension.into(),
            prune_stale: true,
        }
    }

    /// Remove IDL files left in the target directory by earlier passes that the
    /// current dependency set no longer provides.
    pub fn with_prune_stale(mut self, prune_stale: bool) -> Self {
        self.prune_stale = prune_stale;
        self
    }

    /// Extract every dependency's IDL files into `target_dir`.
    ///
    /// Returns all written paths across all dependencies. The first failing
    /// dependency aborts the pass; pruning only happens after a complete pass.
    pub fn extract(
        &self,
        resolver: &dyn ArtifactResolver,
        dependencies: &[DependencyRef],
        target_dir: &Path,
    ) -> Result<Vec<PathBuf>, ExtractError> {
        fs::create_dir_all(target_dir).map_err(|e| ExtractError::Io {
            path: target_dir.to_path_buf(),
            source: e,
        })?;

        let previous = if self.prune_stale {
            Walker::with_config(
                target_dir.to_path_buf(),
                WalkerConfig::for_extension(self.idl_extension.clone()),
            )
            .paths()?
        } else {
            Vec::new()
        };

        let mut extracted = Vec::new();
        for dependency in dependencies {
            let archive = resolver.resolve(dependency)?;
            let files = self.unpack(dependency, &archive, target_dir)?;
            info!(
                dependency = %dependency,
                archive = %archive.display(),
                files = files.len(),
                "Extracted interface files"
            );
            extracted.extend(files);
        }

        if self.prune_stale {
            let removed = prune(target_dir, &previous, &extracted)?;
            if removed > 0 {
                info!(removed, target = %target_dir.display(), "Pruned stale extracted files");
            }
        }

        Ok(extracted)
    }

    /// Unpack the IDL entries of one archive.
    fn unpack(
        &self,
        dependency: &DependencyRef,
        archive_path: &Path,
        target_dir: &Path,
    ) -> Result<Vec<PathBuf>, ExtractError> {
        let archive_err = |e: zip::result::ZipError| ExtractError::Archive {
            dependency: dependency.clone(),
            source: e,
        };

        let file = File::open(archive_path).map_err(|e| ExtractError::Io {
            path: archive_path.to_path_buf(),
            source: e,
        })?;
        let mut archive = zip::ZipArchive::new(BufReader::new(file)).map_err(archive_err)?;

        let mut written = Vec::new();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).map_err(archive_err)?;
            if entry.is_dir() || !has_extension(Path::new(entry.name()), &self.idl_extension) {
                continue;
            }

            let relative = match entry.enclosed_name() {
                Some(p) => p.to_path_buf(),
                None => {
                    warn!(dependency = %dependency, entry = entry.name(), "Skipping entry outside target directory");
                    continue;
                }
            };

            let out_path = target_dir.join(relative);
            let io_err = |e: io::Error| ExtractError::Io {
                path: out_path.clone(),
                source: e,
            };
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
            let mut out = File::create(&out_path).map_err(io_err)?;
            io::copy(&mut entry, &mut out).map_err(io_err)?;

            debug!(path = %out_path.display(), "Extracted");
            written.push(out_path);
        }

        Ok(written)
    }
}

/// Delete files in `previous` that were not rewritten, then drop empty directories.
fn prune(target_dir: &Path, previous: &[PathBuf], current: &[PathBuf]) -> Result<usize, ExtractError> {
    let keep: HashSet<&PathBuf> = current.iter().collect();
    let mut removed = 0;

    for path in previous.iter().filter(|p| !keep.contains(p)) {
        fs::remove_file(path).map_err(|e| ExtractError::Io {
            path: path.clone(),
            source: e,
        })?;
        debug!(path = %path.display(), "Removed stale extracted file");
        removed += 1;
    }

    if removed > 0 {
        for entry in WalkDir::new(target_dir)
            .min_depth(1)
            .contents_first(true)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_dir())
        {
            let is_empty = fs::read_dir(entry.path())
                .map(|mut it| it.next().is_none())
                .unwrap_or(false);
            if is_empty {
                fs::remove_dir(entry.path()).map_err(|e| ExtractError::Io {
                    path: entry.path().to_path_buf(),
                    source: e,
                })?;
            }
        }
    }

    Ok(removed)
}
