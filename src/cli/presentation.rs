//! Presentation: formatters for pipeline results (text and JSON).

use crate::error::PipelineError;
use crate::init::InitResult;
use crate::types::{PipelineOutcome, StalenessReport};
use chrono::{DateTime, Utc};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::PathBuf;
use std::time::SystemTime;

/// Format a section heading with bold/underline.
fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn format_time(time: Option<SystemTime>) -> Option<String> {
    time.map(|t| DateTime::<Utc>::from(t).to_rfc3339())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, PipelineError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn path_list(out: &mut String, title: &str, paths: &[PathBuf]) {
    out.push_str(&format!("{} ({})\n", format_section_heading(title), paths.len()));
    for path in paths {
        out.push_str(&format!("  {}\n", path.display()));
    }
}

#[derive(Serialize)]
struct StatusOutput {
    stale: bool,
    source_count: usize,
    source_files: Vec<PathBuf>,
    most_recent_source_time: Option<String>,
    output_time: Option<String>,
}

pub fn format_status_text(report: &StalenessReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Schema Status")));

    let state = if report.source_files.is_empty() {
        format!("{}", "no interface files".dimmed())
    } else if report.stale {
        format!("{}", "stale".yellow().bold())
    } else {
        format!("{}", "up to date".green().bold())
    };

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["State".to_string(), state]);
    table.add_row(vec![
        "Interface files".to_string(),
        report.source_files.len().to_string(),
    ]);
    table.add_row(vec![
        "Newest source".to_string(),
        format_time(report.most_recent_source_time).unwrap_or_else(|| "-".to_string()),
    ]);
    table.add_row(vec![
        "Output marker".to_string(),
        format_time(report.output_time).unwrap_or_else(|| "missing".to_string()),
    ]);
    out.push_str(&format!("{}\n", table));
    out
}

pub fn format_status_json(report: &StalenessReport) -> Result<String, PipelineError> {
    to_json(&StatusOutput {
        stale: report.stale,
        source_count: report.source_files.len(),
        source_files: report.source_files.clone(),
        most_recent_source_time: format_time(report.most_recent_source_time),
        output_time: format_time(report.output_time),
    })
}

#[derive(Serialize)]
struct OutcomeOutput<'a> {
    state: String,
    generated_files: &'a [PathBuf],
    extracted_files: &'a [PathBuf],
}

pub fn format_outcome_text(outcome: &PipelineOutcome) -> String {
    let mut out = String::new();
    out.push_str(&format!("State: {}\n", outcome.state));
    path_list(&mut out, "Generated files", &outcome.generated_files);
    out
}

pub fn format_outcome_json(outcome: &PipelineOutcome) -> Result<String, PipelineError> {
    to_json(&OutcomeOutput {
        state: outcome.state.to_string(),
        generated_files: &outcome.generated_files,
        extracted_files: &outcome.extracted_files,
    })
}

pub fn format_extract_result(extracted: &[PathBuf]) -> String {
    let mut out = String::new();
    path_list(&mut out, "Extracted files", extracted);
    out
}

pub fn format_clean_result(removed: &[PathBuf]) -> String {
    if removed.is_empty() {
        return "Nothing to clean.".to_string();
    }
    removed
        .iter()
        .map(|p| format!("Removed {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_init_result(result: &InitResult) -> String {
    match result {
        InitResult::Created(path) => format!("Created {}", path.display()),
        InitResult::Skipped(path) => format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ),
    }
}
