//! In-memory workspace backend.
//!
//! Keeps databases and pages as service-shaped JSON so the facade exercises the same
//! envelope handling it does against the real API. Database provisioning can be
//! delayed to reproduce the service's eventually consistent creation.

use super::{SearchPage, WorkspaceApi};
use crate::error::ApiError;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Default)]
struct WorkspaceState {
    next_id: u64,
    databases: BTreeMap<String, Value>,
    pending: HashMap<String, u32>,
    pages: BTreeMap<String, Value>,
    calls: usize,
    database_retrievals: usize,
    page_updates: usize,
}

impl WorkspaceState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{:04}", prefix, self.next_id)
    }
}

/// Workspace held entirely in memory
pub struct InMemoryWorkspace {
    state: Mutex<WorkspaceState>,
    provisioning_delay: u32,
    page_size: usize,
    offline: bool,
}

impl Default for InMemoryWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryWorkspace {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(WorkspaceState::default()),
            provisioning_delay: 0,
            page_size: DEFAULT_PAGE_SIZE,
            offline: false,
        }
    }

    /// New databases answer the first `retrievals` retrieve calls as not yet
    /// provisioned. `u32::MAX` never finishes provisioning.
    pub fn with_provisioning_delay(mut self, retrievals: u32) -> Self {
        self.provisioning_delay = retrievals;
        self
    }

    /// Number of databases returned per search page
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Every call fails as if the service were unreachable
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::new()
        }
    }

    /// Total calls received, across all endpoints
    pub fn call_count(&self) -> usize {
        self.state().calls
    }

    pub fn database_retrievals(&self) -> usize {
        self.state().database_retrievals
    }

    pub fn page_updates(&self) -> usize {
        self.state().page_updates
    }

    fn state(&self) -> MutexGuard<'_, WorkspaceState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn enter(&self) -> Result<MutexGuard<'_, WorkspaceState>, ApiError> {
        let mut state = self.state();
        state.calls += 1;
        if self.offline {
            return Err(ApiError::RemoteRequestFailed(
                "Connection error: workspace offline".to_string(),
            ));
        }
        Ok(state)
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn validation_error(message: String) -> ApiError {
    ApiError::RemoteRequestFailed(format!("Request failed with status 400: {}", message))
}

/// Empty value a freshly created page holds for a column of the given kind
fn empty_value(kind: &str) -> Value {
    match kind {
        "title" | "rich_text" | "multi_select" | "people" | "files" | "relation" => json!([]),
        "checkbox" => json!(false),
        _ => Value::Null,
    }
}

/// The value carried by an update envelope for a property of the given kind
fn envelope_value(key: &str, kind: &str, envelope: &Value) -> Result<Value, ApiError> {
    envelope
        .get(kind)
        .cloned()
        .ok_or_else(|| validation_error(format!("{} is expected to be {}", key, kind)))
}

#[async_trait]
impl WorkspaceApi for InMemoryWorkspace {
    async fn create_database(
        &self,
        parent_page_id: &str,
        title: Value,
        properties: Value,
    ) -> Result<Value, ApiError> {
        let mut state = self.enter()?;
        let columns = properties
            .as_object()
            .ok_or_else(|| validation_error("properties must be an object".to_string()))?;

        let mut schema = Map::new();
        for (index, (name, column)) in columns.iter().enumerate() {
            let (kind, config) = column
                .as_object()
                .and_then(|c| c.iter().next())
                .ok_or_else(|| validation_error(format!("column {} has no type", name)))?;
            let mut descriptor = Map::new();
            descriptor.insert("id".to_string(), json!(format!("col{}", index)));
            descriptor.insert("name".to_string(), json!(name));
            descriptor.insert("type".to_string(), json!(kind));
            descriptor.insert(kind.clone(), config.clone());
            schema.insert(name.clone(), Value::Object(descriptor));
        }

        let id = state.next_id("db");
        let timestamp = now();
        let database = json!({
            "object": "database",
            "id": id,
            "created_time": timestamp,
            "last_edited_time": timestamp,
            "title": title,
            "properties": schema,
            "parent": { "type": "page_id", "page_id": parent_page_id },
            "url": format!("memory://databases/{}", id),
            "archived": false,
        });
        state.databases.insert(id.clone(), database.clone());
        if self.provisioning_delay > 0 {
            state.pending.insert(id, self.provisioning_delay);
        }
        Ok(database)
    }

    async fn retrieve_database(&self, database_id: &str) -> Result<Value, ApiError> {
        let mut state = self.enter()?;
        state.database_retrievals += 1;
        if let Some(remaining) = state.pending.get_mut(database_id) {
            if *remaining > 0 {
                if *remaining != u32::MAX {
                    *remaining -= 1;
                }
                return Ok(json!({ "object": "provisioning", "id": database_id }));
            }
        }
        state
            .databases
            .get(database_id)
            .cloned()
            .ok_or_else(|| ApiError::RemoteNotFound(format!("Could not find database {}", database_id)))
    }

    async fn search_databases(&self, start_cursor: Option<&str>) -> Result<SearchPage, ApiError> {
        let state = self.enter()?;
        let start = match start_cursor {
            Some(cursor) => cursor
                .parse::<usize>()
                .map_err(|_| validation_error(format!("invalid start_cursor {}", cursor)))?,
            None => 0,
        };
        let results: Vec<Value> = state
            .databases
            .values()
            .skip(start)
            .take(self.page_size)
            .cloned()
            .collect();
        let end = start + results.len();
        let has_more = end < state.databases.len();
        Ok(SearchPage {
            results,
            next_cursor: has_more.then(|| end.to_string()),
            has_more,
        })
    }

    async fn create_page(&self, database_id: &str, properties: Value) -> Result<Value, ApiError> {
        let mut state = self.enter()?;
        let schema = state
            .databases
            .get(database_id)
            .and_then(|db| db.get("properties"))
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| ApiError::RemoteNotFound(format!("Could not find database {}", database_id)))?;

        let mut page_properties = Map::new();
        for (name, descriptor) in &schema {
            let kind = descriptor.get("type").and_then(Value::as_str).unwrap_or("rich_text");
            let mut cell = Map::new();
            cell.insert("id".to_string(), descriptor.get("id").cloned().unwrap_or(Value::Null));
            cell.insert("type".to_string(), json!(kind));
            cell.insert(kind.to_string(), empty_value(kind));
            page_properties.insert(name.clone(), Value::Object(cell));
        }

        if let Some(given) = properties.as_object() {
            for (key, envelope) in given {
                let cell = page_properties
                    .get_mut(key)
                    .and_then(Value::as_object_mut)
                    .ok_or_else(|| validation_error(format!("{} is not a property that exists", key)))?;
                let kind = cell
                    .get("type")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let value = envelope_value(key, &kind, envelope)?;
                cell.insert(kind, value);
            }
        }

        let id = state.next_id("page");
        let timestamp = now();
        let page = json!({
            "object": "page",
            "id": id,
            "created_time": timestamp,
            "last_edited_time": timestamp,
            "parent": { "type": "database_id", "database_id": database_id },
            "archived": false,
            "properties": page_properties,
            "url": format!("memory://pages/{}", id),
        });
        state.pages.insert(id, page.clone());
        Ok(page)
    }

    async fn retrieve_page(&self, page_id: &str) -> Result<Value, ApiError> {
        let state = self.enter()?;
        state
            .pages
            .get(page_id)
            .cloned()
            .ok_or_else(|| ApiError::RemoteNotFound(format!("Could not find page {}", page_id)))
    }

    async fn update_page(&self, page_id: &str, properties: Value) -> Result<Value, ApiError> {
        let mut state = self.enter()?;
        state.page_updates += 1;
        let page = state
            .pages
            .get_mut(page_id)
            .ok_or_else(|| ApiError::RemoteNotFound(format!("Could not find page {}", page_id)))?;
        let patch = properties
            .as_object()
            .ok_or_else(|| validation_error("properties must be an object".to_string()))?;

        // Validate the whole patch before applying any of it
        let mut updates = Vec::with_capacity(patch.len());
        for (key, envelope) in patch {
            let kind = page
                .get("properties")
                .and_then(|p| p.get(key))
                .and_then(|cell| cell.get("type"))
                .and_then(Value::as_str)
                .ok_or_else(|| validation_error(format!("{} is not a property that exists", key)))?
                .to_string();
            let value = envelope_value(key, &kind, envelope)?;
            updates.push((key.clone(), kind, value));
        }
        for (key, kind, value) in updates {
            if let Some(cell) = page
                .get_mut("properties")
                .and_then(|p| p.get_mut(&key))
                .and_then(Value::as_object_mut)
            {
                cell.insert(kind, value);
            }
        }
        page["last_edited_time"] = json!(now());
        Ok(page.clone())
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
