//! CLI parse: clap types for notionflow. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// notionflow CLI - experiment tracking in Notion databases
#[derive(Parser)]
#[command(name = "notionflow")]
#[command(about = "Track machine-learning runs as pages of a Notion database")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

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

#[derive(Subcommand)]
pub enum Commands {
    /// Create a run database under the configured parent page
    CreateDatabase {
        /// Database title
        title: String,
        /// Param column as name=type (number, string, category, boolean)
        #[arg(long = "param", value_name = "NAME=TYPE")]
        params: Vec<String>,
        /// Metric column as name=type (number, array)
        #[arg(long = "metric", value_name = "NAME=TYPE")]
        metrics: Vec<String>,
    },
    /// List databases visible to the integration
    Databases {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Summarize a run page or a run database
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Set the status of a run page
    Status {
        /// Page id
        page_id: String,
        /// running, success or failed
        status: String,
    },
    /// Add a tag to a run page
    Tag {
        /// Page id
        page_id: String,
        /// Tag name
        tag: String,
        /// Option color (default, gray, brown, orange, yellow, green, blue, purple, pink, red)
        #[arg(long)]
        color: Option<String>,
    },
    /// Print the effective configuration with secrets masked
    Config,
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Params, metrics, tags and artifacts of one run
    Page {
        /// Page id
        id: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Param and metric columns of a run database
    Database {
        /// Database id
        id: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}
