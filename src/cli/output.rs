//! CLI output: error mapping from pipeline errors to stable CLI surface.

use crate::error::PipelineError;

/// Map pipeline errors to a string for CLI output.
pub fn map_error(e: &PipelineError) -> String {
    match e {
        PipelineError::CompilerExit { code } => format!(
            "error: schema compiler exited with code {} (output left untouched; rerun to retry)",
            code
        ),
        other => format!("error: {}", other),
    }
}
