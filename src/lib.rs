//! notionflow: Experiment Tracking in Notion
//!
//! Records machine-learning runs as pages of a Notion database: one database per
//! experiment, one page per run, with `Params[..]` and `Metrics[..]` columns plus
//! status, tags and artifacts. [`Session`] adds a stack of open runs with scope
//! guards so nested runs are finalized in order.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod report;
pub mod session;
pub mod storage;
pub mod transport;

pub use client::{DatabaseCreated, NotionFlowClient};
pub use config::NotionFlowConfig;
pub use error::{ApiError, Result, StorageError};
pub use models::{PageStatus, ParamValue, SelectColor};
pub use report::Report;
pub use session::{ActivePage, Session};
pub use transport::{InMemoryWorkspace, NotionHttpApi, WorkspaceApi};
