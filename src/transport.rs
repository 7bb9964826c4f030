//! Workspace Transport
//!
//! The remote boundary: a small set of database and page endpoints of the hosted
//! workspace service. Payloads are the service's native JSON; typing happens in the
//! client facade. Implementations: [`NotionHttpApi`] over HTTPS and
//! [`InMemoryWorkspace`] for offline use and tests.

use crate::error::ApiError;
use async_trait::async_trait;
use serde_json::Value;

pub mod http;
pub mod memory;

pub use http::NotionHttpApi;
pub use memory::InMemoryWorkspace;

/// One page of a search listing
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub results: Vec<Value>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

impl SearchPage {
    /// Read the service's list envelope (`results`, `next_cursor`, `has_more`)
    pub fn from_json(value: Value) -> Result<Self, ApiError> {
        let results = value
            .get("results")
            .and_then(Value::as_array)
            .cloned()
            .ok_or_else(|| ApiError::Remote("Search response without results".to_string()))?;
        Ok(Self {
            results,
            next_cursor: value
                .get("next_cursor")
                .and_then(Value::as_str)
                .map(str::to_string),
            has_more: value.get("has_more").and_then(Value::as_bool).unwrap_or(false),
        })
    }
}

/// Workspace service client trait
#[async_trait]
pub trait WorkspaceApi: Send + Sync {
    /// Create a database under a parent page
    async fn create_database(
        &self,
        parent_page_id: &str,
        title: Value,
        properties: Value,
    ) -> Result<Value, ApiError>;

    /// Retrieve a database object. A database that is still being provisioned
    /// may come back with an `object` other than `"database"`.
    async fn retrieve_database(&self, database_id: &str) -> Result<Value, ApiError>;

    /// Search databases visible to the integration, one listing page at a time
    async fn search_databases(&self, start_cursor: Option<&str>) -> Result<SearchPage, ApiError>;

    /// Create a page inside a database
    async fn create_page(&self, database_id: &str, properties: Value) -> Result<Value, ApiError>;

    async fn retrieve_page(&self, page_id: &str) -> Result<Value, ApiError>;

    /// Patch page properties; properties not named are left untouched
    async fn update_page(&self, page_id: &str, properties: Value) -> Result<Value, ApiError>;

    /// Short name for logs
    fn backend_name(&self) -> &str;
}
