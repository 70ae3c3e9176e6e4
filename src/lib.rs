//! idlsync: Incremental Interface-Definition Compilation
//!
//! Extracts interface-definition files from dependency archives, decides whether
//! the generated output is older than the sources, and re-runs the external
//! schema compiler only when it is.

pub mod cli;
pub mod compiler;
pub mod config;
pub mod error;
pub mod extract;
pub mod init;
pub mod logging;
pub mod pipeline;
pub mod scan;
pub mod staleness;
pub mod types;
pub mod watch;
