//! Run Reports
//!
//! Human-readable summaries of a run page (params, metrics, tags, artifacts) and of
//! a run database (its param and metric columns). Summaries are plain data so the
//! CLI can also print them as JSON.

use crate::client::NotionFlowClient;
use crate::error::Result;
use crate::models::{
    DatabaseInfo, FieldType, FileRef, MetricHistory, PageInfo, PageStatus,
};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

const PARAMS_PREFIX: &str = "Params[";
const METRICS_PREFIX: &str = "Metrics[";

/// One logged param
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamRow {
    pub name: String,
    pub value: Option<String>,
}

/// One metric column with its latest value and stored history length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub name: String,
    pub latest: Option<f64>,
    pub last_step: Option<u64>,
    /// Stored points; `None` for number columns, which keep only the latest value
    pub points: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of one run page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSummary {
    pub id: String,
    pub title: Option<String>,
    pub status: Option<String>,
    pub tags: Vec<String>,
    pub params: Vec<ParamRow>,
    pub metrics: Vec<MetricRow>,
    pub artifacts: Vec<FileRef>,
    pub url: Option<String>,
}

/// One column of a run database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRow {
    pub name: String,
    pub field_type: String,
}

/// Summary of one run database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSummary {
    pub id: String,
    pub title: Option<String>,
    pub params: Vec<ColumnRow>,
    pub metrics: Vec<ColumnRow>,
    pub other: Vec<ColumnRow>,
    pub url: Option<String>,
}

/// Strip `Prefix[` ... `]` from a column name
fn inner_name<'k>(key: &'k str, prefix: &str) -> Option<&'k str> {
    key.strip_prefix(prefix)?.strip_suffix(']')
}

/// Param cell rendered for display
fn param_display(page: &PageInfo, key: &str) -> Option<String> {
    match FieldType::from_wire(page.property_type(key)?)? {
        FieldType::Number => page.number(key).map(|n| n.to_string()),
        FieldType::Checkbox => page.checkbox(key).map(|b| b.to_string()),
        FieldType::Select => page.select(key).map(str::to_string),
        FieldType::RichText => page.text(key).filter(|t| !t.is_empty()),
        _ => None,
    }
}

fn metric_row(page: &PageInfo, key: &str, name: &str) -> MetricRow {
    let mut row = MetricRow {
        name: name.to_string(),
        latest: None,
        last_step: None,
        points: None,
        error: None,
    };
    match page.property_type(key).and_then(FieldType::from_wire) {
        Some(FieldType::Number) => row.latest = page.number(key),
        Some(FieldType::RichText) => {
            match MetricHistory::decode(&page.text(key).unwrap_or_default()) {
                Ok(history) => {
                    row.latest = history.last().map(|p| p.value());
                    row.last_step = history.last().and_then(|p| p.step());
                    row.points = Some(history.len());
                }
                Err(reason) => {
                    warn!(page_id = %page.id, key, %reason, "Unreadable metric history");
                    row.error = Some(reason);
                }
            }
        }
        other => {
            row.error = Some(format!(
                "unsupported column type {}",
                other.map(|t| t.as_str()).unwrap_or("unknown")
            ));
        }
    }
    row
}

/// Summarize a fetched page
pub fn summarize_page(page: &PageInfo) -> PageSummary {
    let mut params = Vec::new();
    let mut metrics = Vec::new();
    for key in page.properties.keys() {
        if let Some(name) = inner_name(key, PARAMS_PREFIX) {
            params.push(ParamRow {
                name: name.to_string(),
                value: param_display(page, key),
            });
        } else if let Some(name) = inner_name(key, METRICS_PREFIX) {
            metrics.push(metric_row(page, key, name));
        }
    }
    let artifacts = page
        .property_value("artifacts")
        .and_then(Value::as_array)
        .map(|files| files.iter().filter_map(FileRef::from_json).collect())
        .unwrap_or_default();

    PageSummary {
        id: page.id.clone(),
        title: page.title(),
        status: page.status().map(str::to_string),
        tags: page.multi_select_names("tags"),
        params,
        metrics,
        artifacts,
        url: page.url.clone(),
    }
}

/// Summarize a fetched database
pub fn summarize_database(database: &DatabaseInfo) -> DatabaseSummary {
    let mut params = Vec::new();
    let mut metrics = Vec::new();
    let mut other = Vec::new();
    for key in database.properties.keys() {
        let field_type = database
            .column_type(key)
            .map(|t| t.as_str().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        if let Some(name) = inner_name(key, PARAMS_PREFIX) {
            params.push(ColumnRow {
                name: name.to_string(),
                field_type,
            });
        } else if let Some(name) = inner_name(key, METRICS_PREFIX) {
            metrics.push(ColumnRow {
                name: name.to_string(),
                field_type,
            });
        } else {
            other.push(ColumnRow {
                name: key.clone(),
                field_type,
            });
        }
    }
    DatabaseSummary {
        id: database.id.clone(),
        title: database.title_text().map(str::to_string),
        params,
        metrics,
        other,
        url: database.url.clone(),
    }
}

/// Bold, underlined section heading
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// Status colored the way the status column shows it
fn format_status(status: &str) -> String {
    match status.parse::<PageStatus>() {
        Ok(PageStatus::Running) => status.yellow().to_string(),
        Ok(PageStatus::Success) => status.green().to_string(),
        Ok(PageStatus::Failed) => status.red().to_string(),
        Err(_) => status.to_string(),
    }
}

fn format_value(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn format_page_summary_text(summary: &PageSummary) -> String {
    let mut out = String::new();
    let title = summary.title.as_deref().unwrap_or("(untitled)");
    out.push_str(&format!("{}\n\n", format_section_heading(&format!("Run {}", title))));
    out.push_str(&format!("  Id: {}\n", summary.id));
    out.push_str(&format!(
        "  Status: {}\n",
        summary
            .status
            .as_deref()
            .map(format_status)
            .unwrap_or_else(|| "-".to_string())
    ));
    if !summary.tags.is_empty() {
        out.push_str(&format!("  Tags: {}\n", summary.tags.join(", ")));
    }
    if let Some(ref url) = summary.url {
        out.push_str(&format!("  Url: {}\n", url));
    }
    out.push('\n');

    out.push_str(&format!("{}\n\n", format_section_heading("Params")));
    if summary.params.is_empty() {
        out.push_str("No params.\n\n");
    } else {
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Param", "Value"]);
        for row in &summary.params {
            table.add_row(vec![
                row.name.clone(),
                row.value.clone().unwrap_or_else(|| "-".to_string()),
            ]);
        }
        out.push_str(&format!("{}\n\n", table));
    }

    out.push_str(&format!("{}\n\n", format_section_heading("Metrics")));
    if summary.metrics.is_empty() {
        out.push_str("No metrics.\n");
    } else {
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Metric", "Latest", "Step", "Points"]);
        for row in &summary.metrics {
            let latest = match row.error {
                Some(ref e) => format!("error: {}", e),
                None => format_value(row.latest),
            };
            table.add_row(vec![
                row.name.clone(),
                latest,
                row.last_step
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                row.points
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ]);
        }
        out.push_str(&format!("{}\n", table));
    }

    if !summary.artifacts.is_empty() {
        out.push_str(&format!("\n{}\n\n", format_section_heading("Artifacts")));
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Name", "Url"]);
        for file in &summary.artifacts {
            table.add_row(vec![file.name.clone(), file.url.clone()]);
        }
        out.push_str(&format!("{}\n", table));
    }
    out
}

fn column_table(header: &str, rows: &[ColumnRow]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec![header, "Type"]);
    for row in rows {
        table.add_row(vec![row.name.clone(), row.field_type.clone()]);
    }
    table
}

pub fn format_database_summary_text(summary: &DatabaseSummary) -> String {
    let mut out = String::new();
    let title = summary.title.as_deref().unwrap_or("(untitled)");
    out.push_str(&format!(
        "{}\n\n",
        format_section_heading(&format!("Database {}", title))
    ));
    out.push_str(&format!("  Id: {}\n", summary.id));
    if let Some(ref url) = summary.url {
        out.push_str(&format!("  Url: {}\n", url));
    }
    out.push('\n');
    for (heading, column, rows) in [
        ("Params", "Param", &summary.params),
        ("Metrics", "Metric", &summary.metrics),
        ("Columns", "Column", &summary.other),
    ] {
        out.push_str(&format!("{}\n\n", format_section_heading(heading)));
        if rows.is_empty() {
            out.push_str("None.\n\n");
        } else {
            out.push_str(&format!("{}\n\n", column_table(column, rows)));
        }
    }
    out.push_str(&format!(
        "Total: {} params, {} metrics.\n",
        summary.params.len(),
        summary.metrics.len()
    ));
    out
}

/// Report generator over a tracking client
pub struct Report<'c> {
    client: &'c NotionFlowClient,
}

impl<'c> Report<'c> {
    pub fn new(client: &'c NotionFlowClient) -> Self {
        Self { client }
    }

    pub fn page_summary(&self, page_id: &str) -> Result<PageSummary> {
        Ok(summarize_page(&self.client.get_page(page_id)?))
    }

    pub fn database_summary(&self, database_id: &str) -> Result<DatabaseSummary> {
        Ok(summarize_database(&self.client.get_database(database_id)?))
    }

    pub fn generate_page_report(&self, page_id: &str) -> Result<String> {
        Ok(format_page_summary_text(&self.page_summary(page_id)?))
    }

    pub fn generate_database_report(&self, database_id: &str) -> Result<String> {
        Ok(format_database_summary_text(
            &self.database_summary(database_id)?,
        ))
    }
}
