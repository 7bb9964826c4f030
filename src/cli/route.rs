//! CLI route: single route table and run context. Dispatches to the client, reports
//! and presentation.

use crate::cli::parse::{Commands, ReportCommands};
use crate::cli::presentation::{
    format_database_created, format_database_list_text, format_page_updated, to_json_output,
};
use crate::client::NotionFlowClient;
use crate::config::{ConfigLoader, NotionFlowConfig};
use crate::error::ApiError;
use crate::models::{PageStatus, SelectColor};
use crate::report::Report;
use std::path::PathBuf;
use tracing::debug;

/// Split `name=type`
pub fn parse_column_pair(raw: &str) -> Result<(String, String), ApiError> {
    match raw.split_once('=') {
        Some((name, kind)) if !name.trim().is_empty() && !kind.trim().is_empty() => {
            Ok((name.trim().to_string(), kind.trim().to_string()))
        }
        _ => Err(ApiError::InvalidArgument(format!(
            "Expected NAME=TYPE, got '{}'",
            raw
        ))),
    }
}

/// Runtime context for CLI execution: effective configuration and the client.
pub struct RunContext {
    config: NotionFlowConfig,
    client: NotionFlowClient,
}

impl RunContext {
    /// Load configuration (explicit file or default layers) and build the client.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load()?,
        };
        let client = NotionFlowClient::new(&config)?;
        Ok(Self { config, client })
    }

    /// Context over an already-built client
    pub fn with_client(config: NotionFlowConfig, client: NotionFlowClient) -> Self {
        Self { config, client }
    }

    pub fn client(&self) -> &NotionFlowClient {
        &self.client
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::CreateDatabase {
                title,
                params,
                metrics,
            } => {
                let params = params
                    .iter()
                    .map(|p| parse_column_pair(p))
                    .collect::<Result<Vec<_>, _>>()?;
                let metrics = metrics
                    .iter()
                    .map(|m| parse_column_pair(m))
                    .collect::<Result<Vec<_>, _>>()?;
                debug!(title = %title, params = params.len(), metrics = metrics.len(), "create-database");
                let created = self.client.create_database(title, &params, &metrics)?;
                Ok(format_database_created(title, &created))
            }
            Commands::Databases { format } => {
                let databases = self.client.list_databases()?;
                if format == "json" {
                    to_json_output(&databases)
                } else {
                    Ok(format_database_list_text(&databases))
                }
            }
            Commands::Report { command } => self.handle_report_command(command),
            Commands::Status { page_id, status } => {
                let status: PageStatus = status.parse()?;
                let page = self.client.set_status(page_id, status)?;
                Ok(format_page_updated(&format!("Set status {} on", status), &page))
            }
            Commands::Tag {
                page_id,
                tag,
                color,
            } => {
                let color = color
                    .as_deref()
                    .map(str::parse::<SelectColor>)
                    .transpose()?;
                let page = self.client.set_tag(page_id, tag, color)?;
                Ok(format_page_updated(&format!("Added tag '{}' to", tag), &page))
            }
            Commands::Config => {
                let rendered = self.config.redacted().to_toml()?;
                Ok(rendered.trim_end().to_string())
            }
        }
    }

    fn handle_report_command(&self, command: &ReportCommands) -> Result<String, ApiError> {
        let report = Report::new(&self.client);
        match command {
            ReportCommands::Page { id, format } => {
                if format == "json" {
                    to_json_output(&report.page_summary(id)?)
                } else {
                    report.generate_page_report(id)
                }
            }
            ReportCommands::Database { id, format } => {
                if format == "json" {
                    to_json_output(&report.database_summary(id)?)
                } else {
                    report.generate_database_report(id)
                }
            }
        }
    }
}
