//! CLI parse: clap types for idlsync. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// idlsync - incremental interface-definition compilation
#[derive(Parser)]
#[command(name = "idlsync")]
#[command(about = "Extract dependency IDL files and recompile schemas only when sources change")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Extract dependencies and recompile if sources are newer than the output
    Compile {
        /// Recompile even when the output is up to date
        #[arg(long)]
        force: bool,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show whether the generated output is stale
    Status {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Extract dependency interface files only
    Extract,
    /// Remove generated output and extracted dependency files
    Clean,
    /// Recompile whenever an interface file changes
    Watch {
        /// Quiet period after the last change before recompiling
        #[arg(long, default_value = "200")]
        debounce_ms: u64,
    },
    /// Write a starter idlsync.toml into the workspace
    Init {
        /// Overwrite an existing idlsync.toml
        #[arg(long)]
        force: bool,
    },
}
