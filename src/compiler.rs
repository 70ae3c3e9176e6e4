//! Schema Compiler Invocation
//!
//! Builds the external compiler's command line and runs it as a blocking
//! subprocess. The contract with the compiler is:
//!
//! ```text
//! <binary> [extra args] (<include flag> <dir>)* <output flag> <output dir> <source>*
//! ```
//!
//! Exit code 0 is success; anything else is reported back to the caller as-is.

use crate::error::CompileError;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// External compiler settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Executable name or path
    #[serde(default = "default_binary")]
    pub binary: String,

    /// Flag preceding each include directory
    #[serde(default = "default_include_flag")]
    pub include_flag: String,

    /// Flag preceding the output directory
    #[serde(default = "default_output_flag")]
    pub output_flag: String,

    /// Arguments placed before the include flags (e.g. `--gen java`)
    #[serde(default)]
    pub extra_args: Vec<String>,

    /// Kill the compiler after this many seconds (0 = wait forever)
    #[serde(default)]
    pub timeout_secs: u64,
}

fn default_binary() -> String {
    "thrift".to_string()
}

fn default_include_flag() -> String {
    "-I".to_string()
}

fn default_output_flag() -> String {
    "-o".to_string()
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            include_flag: default_include_flag(),
            output_flag: default_output_flag(),
            extra_args: Vec::new(),
            timeout_secs: 0,
        }
    }
}

impl CompilerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Runs the external schema compiler
#[derive(Debug, Clone)]
pub struct CompilerInvoker {
    config: CompilerConfig,
    timeout: Option<Duration>,
}

impl CompilerInvoker {
    pub fn new(config: CompilerConfig) -> Self {
        let timeout = config.timeout();
        Self { config, timeout }
    }

    /// Override the configured timeout (sub-second precision).
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Argument list (without the binary) for one compiler run.
    ///
    /// Include directories are `[source_dir] + include_paths`, in that order.
    pub fn build_args(
        &self,
        source_dir: &Path,
        output_dir: &Path,
        include_paths: &[PathBuf],
        source_files: &[PathBuf],
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.config.extra_args.iter().map(OsString::from).collect();

        for dir in std::iter::once(source_dir).chain(include_paths.iter().map(PathBuf::as_path)) {
            args.push(OsString::from(&self.config.include_flag));
            args.push(dir.as_os_str().to_os_string());
        }

        args.push(OsString::from(&self.config.output_flag));
        args.push(output_dir.as_os_str().to_os_string());

        args.extend(source_files.iter().map(|f| f.as_os_str().to_os_string()));
        args
    }

    /// Run the compiler over `source_files` and return its exit code.
    ///
    /// Creates `output_dir` first. A process terminated by a signal reports -1.
    pub fn compile(
        &self,
        source_dir: &Path,
        output_dir: &Path,
        include_paths: &[PathBuf],
        source_files: &[PathBuf],
    ) -> Result<i32, CompileError> {
        std::fs::create_dir_all(output_dir).map_err(|e| CompileError::OutputDir {
            path: output_dir.to_path_buf(),
            source: e,
        })?;

        info!(count = source_files.len(), "Compiling interface files");
        for file in source_files {
            info!(file = %file.display(), "Compiling");
        }

        let args = self.build_args(source_dir, output_dir, include_paths, source_files);
        debug!(binary = %self.config.binary, ?args, "Invoking schema compiler");

        // Compiler output goes to stderr so stdout carries only command results
        let child = Command::new(&self.config.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(std::io::stderr()))
            .spawn()
            .map_err(|e| self.invocation_error(e))?;

        let mut guard = ChildGuard::new(child);
        let status = match guard.wait(self.timeout).map_err(|e| self.invocation_error(e))? {
            Some(status) => status,
            None => {
                let timeout = self.timeout.unwrap_or_default();
                error!(binary = %self.config.binary, ?timeout, "Schema compiler timed out");
                return Err(CompileError::TimedOut {
                    binary: self.config.binary.clone(),
                    timeout,
                });
            }
        };

        let code = status.code().unwrap_or(-1);
        if code != 0 {
            error!(exit_code = code, binary = %self.config.binary, "Schema compiler failed");
        }
        Ok(code)
    }

    fn invocation_error(&self, source: std::io::Error) -> CompileError {
        CompileError::Invocation {
            binary: self.config.binary.clone(),
            source,
        }
    }
}

/// Owns a running child; kills and reaps it if dropped before it has exited.
struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    fn new(child: Child) -> Self {
        Self {
            child,
            reaped: false,
        }
    }

    /// Wait for exit. Returns `Ok(None)` when `timeout` elapses first.
    fn wait(&mut self, timeout: Option<Duration>) -> std::io::Result<Option<ExitStatus>> {
        let Some(timeout) = timeout else {
            let status = self.child.wait()?;
            self.reaped = true;
            return Ok(Some(status));
        };

        let started = Instant::now();
        loop {
            if let Some(status) = self.child.try_wait()? {
                self.reaped = true;
                return Ok(Some(status));
            }
            let elapsed = started.elapsed();
            if elapsed >= timeout {
                return Ok(None);
            }
            std::thread::sleep(POLL_INTERVAL.min(timeout - elapsed));
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
