//! Watch Mode
//!
//! Runs the pipeline once, then re-runs it whenever an interface-definition file
//! under the source directory is created, modified or removed. Bursts of events
//! are debounced into a single run. Failed runs are logged and watching continues.

use crate::error::PipelineError;
use crate::pipeline::Pipeline;
use crate::scan::has_extension;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::sync::mpsc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Watch mode configuration
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Quiet period after the last relevant event before re-running
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_ms: 200 }
    }
}

/// Whether a filesystem event touches an interface-definition file
pub fn is_relevant(event: &Event, idl_extension: &str) -> bool {
    let kind_matches = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    );
    kind_matches && event.paths.iter().any(|p| has_extension(p, idl_extension))
}

/// Blocking watch loop over one pipeline
pub struct WatchSession<'a> {
    pipeline: &'a Pipeline,
    config: WatchConfig,
}

impl<'a> WatchSession<'a> {
    pub fn new(pipeline: &'a Pipeline, config: WatchConfig) -> Self {
        Self { pipeline, config }
    }

    /// Watch until the watcher channel closes.
    pub fn start(&self) -> Result<(), PipelineError> {
        let source_dir = &self.pipeline.config().source_dir;
        if !source_dir.is_dir() {
            return Err(PipelineError::Watch(format!(
                "Source directory {} does not exist",
                source_dir.display()
            )));
        }

        self.run_once();

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            if let Err(e) = tx.send(res) {
                error!("Error sending watch event: {}", e);
            }
        })
        .map_err(|e| PipelineError::Watch(format!("Failed to create watcher: {}", e)))?;

        watcher
            .watch(source_dir, RecursiveMode::Recursive)
            .map_err(|e| PipelineError::Watch(format!("Failed to watch directory: {}", e)))?;

        info!(source_dir = %source_dir.display(), "Watching for interface changes");

        let debounce = Duration::from_millis(self.config.debounce_ms);
        let extension = self.pipeline.config().idl_extension.clone();
        let mut pending = false;
        let mut last_event = Instant::now();

        loop {
            match rx.recv_timeout(debounce) {
                Ok(Ok(event)) => {
                    if is_relevant(&event, &extension) {
                        pending = true;
                        last_event = Instant::now();
                    }
                }
                Ok(Err(e)) => warn!("Watch error: {}", e),
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    error!("Watcher channel disconnected");
                    break;
                }
            }

            if pending && last_event.elapsed() >= debounce {
                pending = false;
                self.run_once();
            }
        }

        Ok(())
    }

    fn run_once(&self) {
        match self.pipeline.run() {
            Ok(outcome) => info!(
                state = %outcome.state,
                generated = outcome.generated_files.len(),
                "Pipeline run finished"
            ),
            Err(e) => error!("Pipeline run failed: {}", e),
        }
    }
}
