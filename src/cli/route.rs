//! CLI route: single route table and run context. Dispatches to the pipeline and presentation.

use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_clean_result, format_extract_result, format_init_result, format_outcome_json,
    format_outcome_text, format_status_json, format_status_text,
};
use crate::config::{ConfigLoader, IdlsyncConfig};
use crate::error::PipelineError;
use crate::init::initialize_workspace;
use crate::pipeline::Pipeline;
use crate::watch::{WatchConfig, WatchSession};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Runtime context for CLI execution: workspace root and loaded configuration.
pub struct RunContext {
    workspace_root: PathBuf,
    config: IdlsyncConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, PipelineError> {
        let config = ConfigLoader::load_for(&workspace_root, config_path.as_deref())?;
        Ok(Self {
            workspace_root,
            config,
        })
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn config(&self) -> &IdlsyncConfig {
        &self.config
    }

    fn pipeline(&self) -> Result<Pipeline, PipelineError> {
        Pipeline::from_config(&self.config, &self.workspace_root)
    }

    /// Execute a command and return the text to print on stdout.
    pub fn execute(&self, command: &Commands) -> Result<String, PipelineError> {
        let started = Instant::now();
        let command_name = command_name(command);
        let result = self.dispatch(command);
        info!(
            command = command_name,
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn dispatch(&self, command: &Commands) -> Result<String, PipelineError> {
        match command {
            Commands::Compile { force, format } => {
                let pipeline = self.pipeline()?;
                let outcome = if *force {
                    pipeline.run_forced()?
                } else {
                    pipeline.run()?
                };
                match format.as_str() {
                    "json" => format_outcome_json(&outcome),
                    _ => Ok(format_outcome_text(&outcome)),
                }
            }
            Commands::Status { format } => {
                let report = self.pipeline()?.status()?;
                match format.as_str() {
                    "json" => format_status_json(&report),
                    _ => Ok(format_status_text(&report)),
                }
            }
            Commands::Extract => {
                let extracted = self.pipeline()?.extract_only()?;
                Ok(format_extract_result(&extracted))
            }
            Commands::Clean => {
                let removed = self.pipeline()?.clean()?;
                Ok(format_clean_result(&removed))
            }
            Commands::Watch { debounce_ms } => {
                let pipeline = self.pipeline()?;
                WatchSession::new(
                    &pipeline,
                    WatchConfig {
                        debounce_ms: *debounce_ms,
                    },
                )
                .start()?;
                Ok(String::new())
            }
            Commands::Init { force } => {
                let result = initialize_workspace(&self.workspace_root, *force)?;
                Ok(format_init_result(&result))
            }
        }
    }
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Compile { .. } => "compile",
        Commands::Status { .. } => "status",
        Commands::Extract => "extract",
        Commands::Clean => "clean",
        Commands::Watch { .. } => "watch",
        Commands::Init { .. } => "init",
    }
}
