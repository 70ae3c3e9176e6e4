//! CLI domain: parse, route, output, and presentation only.
//! No pipeline logic lives here; the route table dispatches to `Pipeline`.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{
    format_clean_result, format_extract_result, format_init_result, format_outcome_json,
    format_outcome_text, format_status_json, format_status_text,
};
pub use route::RunContext;
