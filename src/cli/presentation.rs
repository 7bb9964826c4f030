//! CLI presentation: text and json formatters per command.

use crate::client::DatabaseCreated;
use crate::error::ApiError;
use crate::models::{DatabaseInfo, PageInfo};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;

pub fn to_json_output<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::InvalidArgument(format!("Failed to render JSON: {}", e)))
}

pub fn format_database_created(title: &str, created: &DatabaseCreated) -> String {
    let state = if created.ready {
        format!("{}", "ready".green())
    } else {
        format!("{}", "not ready".yellow())
    };
    format!("Created database '{}' ({}): {}", title, state, created.id)
}

pub fn format_database_list_text(databases: &[DatabaseInfo]) -> String {
    if databases.is_empty() {
        return "No databases found.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Title", "Id", "Columns"]);
    for db in databases {
        table.add_row(vec![
            db.title_text().unwrap_or("(untitled)").to_string(),
            db.id.clone(),
            db.properties.len().to_string(),
        ]);
    }
    format!("{}\n\nTotal: {} databases.", table, databases.len())
}

pub fn format_page_updated(action: &str, page: &PageInfo) -> String {
    format!("{} {}", action, page.id)
}
