//! CLI domain: parse, route, output, and presentation only.
//! No client logic; a single route table dispatches to the tracking client.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, ReportCommands};
pub use presentation::{format_database_created, format_database_list_text};
pub use route::{parse_column_pair, RunContext};
