//! Artifact resolution: maps a dependency coordinate to an archive on disk.
//!
//! Fetching and caching remote artifacts belongs to the host build system. The
//! resolvers here only look up archives that already exist locally.

use crate::error::ExtractError;
use crate::types::DependencyRef;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Locates the packaged archive backing a dependency
pub trait ArtifactResolver {
    fn resolve(&self, dependency: &DependencyRef) -> Result<PathBuf, ExtractError>;
}

/// Resolver over local repository directories.
///
/// For `com.acme:common-idl:1.2.0` each root is searched for, in order:
/// `com/acme/common-idl/1.2.0/common-idl-1.2.0.jar`,
/// `com.acme/common-idl/1.2.0/common-idl-1.2.0.jar`, then the same two with `.zip`.
#[derive(Debug, Clone, Default)]
pub struct LocalRepositoryResolver {
    roots: Vec<PathBuf>,
}

impl LocalRepositoryResolver {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Resolver over the user cache directory (`<cache>/idlsync/artifacts`) plus `extra` roots.
    pub fn with_default_cache(extra: Vec<PathBuf>) -> Self {
        let mut roots = extra;
        if let Some(cache) = default_cache_root() {
            roots.push(cache);
        }
        Self { roots }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Every path checked for `dependency`, in lookup order.
    pub fn candidates(&self, dependency: &DependencyRef) -> Vec<PathBuf> {
        let stem = dependency.archive_stem();
        let nested_org: PathBuf = dependency.organization.split('.').collect();
        let mut candidates = Vec::new();
        for root in &self.roots {
            for ext in ["jar", "zip"] {
                let file = format!("{}.{}", stem, ext);
                for org in [nested_org.as_path(), Path::new(&dependency.organization)] {
                    let candidate = root
                        .join(org)
                        .join(&dependency.name)
                        .join(&dependency.version)
                        .join(&file);
                    if !candidates.contains(&candidate) {
                        candidates.push(candidate);
                    }
                }
            }
        }
        candidates
    }
}

impl ArtifactResolver for LocalRepositoryResolver {
    fn resolve(&self, dependency: &DependencyRef) -> Result<PathBuf, ExtractError> {
        let candidates = self.candidates(dependency);
        for candidate in &candidates {
            if candidate.is_file() {
                debug!(dependency = %dependency, archive = %candidate.display(), "Resolved archive");
                return Ok(candidate.clone());
            }
        }
        Err(ExtractError::Unresolved {
            dependency: dependency.clone(),
            searched: candidates,
        })
    }
}

/// Resolver backed by an explicit dependency → archive map
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    archives: HashMap<DependencyRef, PathBuf>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_archive(mut self, dependency: DependencyRef, archive: PathBuf) -> Self {
        self.archives.insert(dependency, archive);
        self
    }

    pub fn insert(&mut self, dependency: DependencyRef, archive: PathBuf) {
        self.archives.insert(dependency, archive);
    }
}

impl ArtifactResolver for StaticResolver {
    fn resolve(&self, dependency: &DependencyRef) -> Result<PathBuf, ExtractError> {
        self.archives
            .get(dependency)
            .cloned()
            .ok_or_else(|| ExtractError::Unresolved {
                dependency: dependency.clone(),
                searched: Vec::new(),
            })
    }
}

/// Tries each resolver in order, returning the first hit
pub struct ChainResolver {
    resolvers: Vec<Box<dyn ArtifactResolver>>,
}

impl ChainResolver {
    pub fn new(resolvers: Vec<Box<dyn ArtifactResolver>>) -> Self {
        Self { resolvers }
    }
}

impl ArtifactResolver for ChainResolver {
    fn resolve(&self, dependency: &DependencyRef) -> Result<PathBuf, ExtractError> {
        let mut searched = Vec::new();
        for resolver in &self.resolvers {
            match resolver.resolve(dependency) {
                Ok(path) => return Ok(path),
                Err(ExtractError::Unresolved {
                    searched: tried, ..
                }) => searched.extend(tried),
                Err(other) => return Err(other),
            }
        }
        Err(ExtractError::Unresolved {
            dependency: dependency.clone(),
            searched,
        })
    }
}

fn default_cache_root() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "idlsync")
        .map(|dirs| dirs.cache_dir().join("artifacts"))
}
