//! Pipeline Coordinator
//!
//! Sequences one compilation pass:
//!
//! 1. Extract dependency IDL files into the external-include directory (always).
//! 2. Decide staleness of the source directory against the output directory.
//! 3. Compile when stale; on success stamp the output directory's mtime with the
//!    newest source mtime and report the generated files. On failure the previous
//!    stamp is put back so the next run retries.

use crate::compiler::{CompilerConfig, CompilerInvoker};
use crate::config::{check_layout, resolve_path, IdlsyncConfig};
use crate::error::PipelineError;
use crate::extract::{
    ArchiveExtractor, ArtifactResolver, ChainResolver, LocalRepositoryResolver, StaticResolver,
};
use crate::scan::{absolutize, to_absolute, Walker, WalkerConfig};
use crate::staleness::{set_modified_time, StalenessDetector};
use crate::types::{DependencyRef, PipelineOutcome, RunState, StalenessReport};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Fully resolved inputs for one pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub external_include_dir: PathBuf,
    pub include_paths: Vec<PathBuf>,
    pub dependencies: Vec<DependencyRef>,
    pub idl_extension: String,
    pub generated_extension: String,
    pub prune_stale: bool,
    pub compiler: CompilerConfig,
}

impl PipelineConfig {
    /// Relative paths are made absolute against the current directory.
    pub fn new(source_dir: PathBuf, output_dir: PathBuf, external_include_dir: PathBuf) -> Self {
        Self {
            source_dir: to_absolute(&source_dir),
            output_dir: to_absolute(&output_dir),
            external_include_dir: to_absolute(&external_include_dir),
            include_paths: Vec::new(),
            dependencies: Vec::new(),
            idl_extension: "thrift".to_string(),
            generated_extension: "java".to_string(),
            prune_stale: true,
            compiler: CompilerConfig::default(),
        }
    }

    pub fn with_include_paths(mut self, include_paths: Vec<PathBuf>) -> Self {
        self.include_paths = include_paths.iter().map(|p| to_absolute(p)).collect();
        self
    }

    pub fn with_dependencies(mut self, dependencies: Vec<DependencyRef>) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn with_extensions(mut self, idl: impl Into<String>, generated: impl Into<String>) -> Self {
        self.idl_extension = idl.into();
        self.generated_extension = generated.into();
        self
    }

    pub fn with_compiler(mut self, compiler: CompilerConfig) -> Self {
        self.compiler = compiler;
        self
    }

    /// Validate `config` and resolve every path to an absolute one under `workspace_root`.
    pub fn from_config(config: &IdlsyncConfig, workspace_root: &Path) -> Result<Self, PipelineError> {
        config.validate().map_err(|errors| {
            let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            PipelineError::Config(format!(
                "Configuration validation failed:\n{}",
                msgs.join("\n")
            ))
        })?;

        let root = absolutize(workspace_root).map_err(|e| {
            PipelineError::Config(format!(
                "Invalid workspace root {}: {}",
                workspace_root.display(),
                e
            ))
        })?;
        let resolve = |p: &Path| {
            absolutize(&resolve_path(&root, p)).map_err(|e| {
                PipelineError::Config(format!("Invalid path {}: {}", p.display(), e))
            })
        };

        let project = &config.project;
        let source_dir = resolve(&project.source_dir)?;
        let output_dir = resolve(&project.output_dir)?;
        let external_include_dir = resolve(&project.external_include_dir)?;
        check_layout(&source_dir, &output_dir, &external_include_dir).map_err(|message| {
            PipelineError::Config(format!("Configuration validation failed:\n{}", message))
        })?;

        Ok(Self {
            source_dir,
            output_dir,
            external_include_dir,
            include_paths: project
                .include_paths
                .iter()
                .map(|p| resolve(p))
                .collect::<Result<_, _>>()?,
            dependencies: project
                .dependency_refs()
                .map_err(|e| PipelineError::Config(e.to_string()))?,
            idl_extension: project.idl_extension.trim_start_matches('.').to_string(),
            generated_extension: project.generated_extension.trim_start_matches('.').to_string(),
            prune_stale: project.prune_stale,
            compiler: config.compiler.clone(),
        })
    }

    /// Include directories handed to the compiler after the source directory:
    /// configured includes, then the external-include directory.
    pub fn effective_include_paths(&self) -> Vec<PathBuf> {
        let mut paths = self.include_paths.clone();
        paths.push(self.external_include_dir.clone());
        paths
    }
}

/// Build the artifact resolver described by `config`: pinned archives first,
/// then configured repositories, then the user cache directory.
pub fn resolver_from_config(
    config: &IdlsyncConfig,
    workspace_root: &Path,
) -> Result<Box<dyn ArtifactResolver>, PipelineError> {
    let mut pinned = StaticResolver::new();
    for artifact in &config.artifacts.pinned {
        let dependency = artifact
            .dependency
            .parse::<DependencyRef>()
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        pinned.insert(dependency, resolve_path(workspace_root, &artifact.archive));
    }

    let repositories = config
        .artifacts
        .repositories
        .iter()
        .map(|p| resolve_path(workspace_root, p))
        .collect();

    Ok(Box::new(ChainResolver::new(vec![
        Box::new(pinned),
        Box::new(LocalRepositoryResolver::with_default_cache(repositories)),
    ])))
}

/// Extraction → staleness → compilation coordinator
pub struct Pipeline {
    config: PipelineConfig,
    resolver: Box<dyn ArtifactResolver>,
    extractor: ArchiveExtractor,
    detector: StalenessDetector,
    compiler: CompilerInvoker,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, resolver: Box<dyn ArtifactResolver>) -> Self {
        let extractor =
            ArchiveExtractor::new(config.idl_extension.clone()).with_prune_stale(config.prune_stale);
        let detector = StalenessDetector::new(config.idl_extension.clone());
        let compiler = CompilerInvoker::new(config.compiler.clone());
        Self {
            config,
            resolver,
            extractor,
            detector,
            compiler,
        }
    }

    /// Pipeline for a workspace from loaded configuration
    pub fn from_config(config: &IdlsyncConfig, workspace_root: &Path) -> Result<Self, PipelineError> {
        let pipeline_config = PipelineConfig::from_config(config, workspace_root)?;
        let resolver = resolver_from_config(config, workspace_root)?;
        Ok(Self::new(pipeline_config, resolver))
    }

    /// Replace the compiler invoker (e.g. to set a sub-second timeout)
    pub fn with_compiler(mut self, compiler: CompilerInvoker) -> Self {
        self.compiler = compiler;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Extract, then compile only if the sources are newer than the output.
    pub fn run(&self) -> Result<PipelineOutcome, PipelineError> {
        self.execute(false)
    }

    /// Extract, then compile regardless of timestamps (still a no-op without sources).
    pub fn run_forced(&self) -> Result<PipelineOutcome, PipelineError> {
        self.execute(true)
    }

    /// Run only the extraction stage.
    pub fn extract_only(&self) -> Result<Vec<PathBuf>, PipelineError> {
        let extracted = self.extractor.extract(
            self.resolver.as_ref(),
            &self.config.dependencies,
            &self.config.external_include_dir,
        )?;
        info!(
            dependencies = self.config.dependencies.len(),
            files = extracted.len(),
            target = %self.config.external_include_dir.display(),
            "Dependency extraction complete"
        );
        Ok(extracted)
    }

    /// Run only the staleness check.
    pub fn status(&self) -> Result<StalenessReport, PipelineError> {
        Ok(self
            .detector
            .check(&self.config.source_dir, &self.config.output_dir)?)
    }

    /// Generated files currently present in the output directory (sorted).
    pub fn generated_files(&self) -> Result<Vec<PathBuf>, PipelineError> {
        let walker = Walker::with_config(
            self.config.output_dir.clone(),
            WalkerConfig::for_extension(self.config.generated_extension.clone()),
        );
        Ok(walker.paths()?)
    }

    /// Remove the output and external-include directories so the next run starts clean.
    ///
    /// Returns the directories that were actually removed.
    pub fn clean(&self) -> Result<Vec<PathBuf>, PipelineError> {
        let mut removed = Vec::new();
        for dir in [&self.config.output_dir, &self.config.external_include_dir] {
            if dir.exists() {
                fs::remove_dir_all(dir).map_err(|e| PipelineError::Clean {
                    path: dir.clone(),
                    source: e,
                })?;
                info!(path = %dir.display(), "Removed");
                removed.push(dir.clone());
            }
        }
        Ok(removed)
    }

    fn execute(&self, force: bool) -> Result<PipelineOutcome, PipelineError> {
        let extracted_files = self.extract_only()?;
        let report = self.status()?;

        let most_recent = match report.most_recent_source_time {
            Some(t) => t,
            None => {
                debug!(source_dir = %self.config.source_dir.display(), "No interface files to compile");
                return Ok(PipelineOutcome {
                    state: RunState::Skipped,
                    generated_files: Vec::new(),
                    extracted_files,
                });
            }
        };

        if !report.stale && !force {
            debug!(
                files = report.source_files.len(),
                output_dir = %self.config.output_dir.display(),
                "Generated output is up to date"
            );
            return Ok(PipelineOutcome {
                state: RunState::Skipped,
                generated_files: self.generated_files()?,
                extracted_files,
            });
        }

        let code = self
            .compiler
            .compile(
                &self.config.source_dir,
                &self.config.output_dir,
                &self.config.effective_include_paths(),
                &report.source_files,
            )
            .inspect_err(|_| self.restore_marker(report.output_time))?;
        if code != 0 {
            self.restore_marker(report.output_time);
            return Err(PipelineError::CompilerExit { code });
        }

        set_modified_time(&self.config.output_dir, most_recent).map_err(|e| {
            PipelineError::Stamp {
                path: self.config.output_dir.clone(),
                source: e,
            }
        })?;

        let generated_files = self.generated_files()?;
        info!(
            generated = generated_files.len(),
            output_dir = %self.config.output_dir.display(),
            "Compilation finished"
        );

        Ok(PipelineOutcome {
            state: RunState::Compiled,
            generated_files,
            extracted_files,
        })
    }

    /// Put the output directory's mtime back after a failed compile.
    ///
    /// Partial compiler output bumps the directory mtime past the sources, which
    /// would make the next run skip. A directory that did not exist before the
    /// run is stamped with the epoch so it still reads as stale.
    fn restore_marker(&self, previous: Option<SystemTime>) {
        let output_dir = &self.config.output_dir;
        if !output_dir.is_dir() {
            return;
        }
        let time = previous.unwrap_or(UNIX_EPOCH);
        if let Err(e) = set_modified_time(output_dir, time) {
            warn!(path = %output_dir.display(), error = %e, "Failed to restore freshness marker");
        }
    }
}
