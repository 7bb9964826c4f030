//! Tracking Client
//!
//! Blocking facade over a [`WorkspaceApi`]: creates run databases, creates run
//! pages and writes params, metrics, tags, status and artifacts into page
//! properties. Every mutation that depends on existing values re-fetches the page
//! first; nothing is cached between calls.
//!
//! The facade drives the async transport on its own current-thread runtime, so it
//! must not be called from inside another tokio runtime.

use crate::config::{ConfigLoader, NotionFlowConfig, PollConfig};
use crate::error::{ApiError, Result, StorageError};
use crate::models::{
    metrics_key, params_key, DatabaseInfo, FieldType, FileRef, MetricHistory, PageInfo,
    PageStatus, ParamValue, PropertyUpdate, RichTextSegment, RunSchema, SelectColor,
    SelectOption,
};
use crate::storage::{artifact_key, S3ObjectStore, ObjectStore};
use crate::transport::{NotionHttpApi, WorkspaceApi};
use serde_json::{json, Map, Value};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

/// Default title for pages created without one
pub const DEFAULT_PAGE_TITLE: &str = "New page";

/// Outcome of database creation. `ready` is false when the database was created
/// but did not become retrievable within the polling budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseCreated {
    pub id: String,
    pub ready: bool,
}

/// Experiment tracking client
pub struct NotionFlowClient {
    runtime: Runtime,
    api: Arc<dyn WorkspaceApi>,
    object_store: Option<Arc<dyn ObjectStore>>,
    parent_page_id: Option<String>,
    poll: PollConfig,
}

impl NotionFlowClient {
    /// Client for the Notion API described by `config`
    pub fn new(config: &NotionFlowConfig) -> Result<Self> {
        let api = NotionHttpApi::new(config.auth.clone(), &config.api)?;
        let mut client = Self::with_api(Arc::new(api))?
            .with_parent_page_id(config.parent_page_id.clone())
            .with_poll(config.poll.clone());
        if let Some(store) = S3ObjectStore::from_config(&config.storage) {
            client = client.with_object_store(Arc::new(store));
        }
        Ok(client)
    }

    /// Client configured from the config file and environment
    pub fn from_env() -> Result<Self> {
        Self::new(&ConfigLoader::load()?)
    }

    /// Client over any transport, with default polling and no parent page
    pub fn with_api(api: Arc<dyn WorkspaceApi>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ApiError::Configuration(format!("Failed to start runtime: {}", e)))?;
        Ok(Self {
            runtime,
            api,
            object_store: None,
            parent_page_id: None,
            poll: PollConfig::default(),
        })
    }

    pub fn with_parent_page_id(mut self, parent_page_id: Option<String>) -> Self {
        self.parent_page_id = parent_page_id;
        self
    }

    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_object_store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.object_store = Some(store);
        self
    }

    pub fn parent_page_id(&self) -> Option<&str> {
        self.parent_page_id.as_deref()
    }

    pub fn poll(&self) -> &PollConfig {
        &self.poll
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    // --- Databases ---

    /// Create a run database with the base columns plus the given param and metric
    /// columns (`(name, logical type)` pairs), then wait for it to be provisioned.
    pub fn create_database<P, M>(
        &self,
        title: &str,
        params: &[(P, P)],
        metrics: &[(M, M)],
    ) -> Result<DatabaseCreated>
    where
        P: AsRef<str>,
        M: AsRef<str>,
    {
        let schema = RunSchema::build(params, metrics)?;
        let parent = self.parent_page_id.as_deref().ok_or_else(|| {
            ApiError::Configuration(
                "No parent page: set NOTION_PARENT_PAGE_ID or `parent_page_id` in the config file"
                    .to_string(),
            )
        })?;
        let title_json = json!([RichTextSegment::text(title)]);

        let response = self.block_on(self.api.create_database(
            parent,
            title_json,
            schema.to_properties(),
        ))?;
        let id = response
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::Remote("Database created without an id".to_string()))?
            .to_string();

        let ready = self.wait_database_ready(&id)?;
        if ready {
            info!(database_id = %id, title, columns = schema.len(), "Created database");
        } else {
            warn!(
                database_id = %id,
                attempts = self.poll.max_attempts,
                "Database created but not ready after polling"
            );
        }
        Ok(DatabaseCreated { id, ready })
    }

    /// Poll until the database is retrievable as a database object. Exhausting the
    /// attempt budget is reported as `Ok(false)`; remote errors propagate.
    fn wait_database_ready(&self, database_id: &str) -> Result<bool> {
        let max_attempts = self.poll.max_attempts;
        let interval = self.poll.interval();
        self.block_on(async {
            for attempt in 1..=max_attempts {
                let response = self.api.retrieve_database(database_id).await?;
                if response.get("object").and_then(Value::as_str) == Some("database") {
                    debug!(database_id, attempt, "Database ready");
                    return Ok(true);
                }
                debug!(database_id, attempt, "Database not ready yet");
                if attempt < max_attempts && !interval.is_zero() {
                    tokio::time::sleep(interval).await;
                }
            }
            Ok::<bool, ApiError>(false)
        })
    }

    pub fn get_database(&self, database_id: &str) -> Result<DatabaseInfo> {
        let response = self.block_on(self.api.retrieve_database(database_id))?;
        parse_object(response, "database")
    }

    /// All databases visible to the integration, across result pages
    pub fn list_databases(&self) -> Result<Vec<DatabaseInfo>> {
        let mut databases = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self.block_on(self.api.search_databases(cursor.as_deref()))?;
            for result in page.results {
                databases.push(parse_object(result, "database")?);
            }
            match page.next_cursor {
                Some(next) if page.has_more => cursor = Some(next),
                _ => break,
            }
        }
        debug!(count = databases.len(), "Listed databases");
        Ok(databases)
    }

    /// First database whose first title segment equals `name`
    pub fn get_database_by_name(&self, name: &str) -> Result<Option<DatabaseInfo>> {
        Ok(self
            .list_databases()?
            .into_iter()
            .find(|db| db.title_text() == Some(name)))
    }

    // --- Pages ---

    /// Create a run page with only its `name` set
    pub fn add_empty_page(&self, database_id: &str, title: Option<&str>) -> Result<PageInfo> {
        let title = title.unwrap_or(DEFAULT_PAGE_TITLE);
        let properties = json!({
            "name": { "title": [RichTextSegment::text(title)] },
        });
        let response = self.block_on(self.api.create_page(database_id, properties))?;
        let page: PageInfo = parse_object(response, "page")?;
        info!(page_id = %page.id, database_id, title, "Created page");
        Ok(page)
    }

    pub fn get_page(&self, page_id: &str) -> Result<PageInfo> {
        let response = self.block_on(self.api.retrieve_page(page_id))?;
        parse_object(response, "page")
    }

    /// Write `Params[key]`, shaped by the column's remote type
    pub fn log_param(
        &self,
        page_id: &str,
        key: &str,
        value: impl Into<ParamValue>,
    ) -> Result<PageInfo> {
        let value = value.into();
        let page = self.get_page(page_id)?;
        let actual_key = params_key(key);
        let update = param_update(&page, &actual_key, &value)?;
        debug!(page_id, key = %actual_key, %value, "Logging param");
        self.update_properties(page_id, vec![(actual_key, update)])
    }

    /// Write `Metrics[key]`: number columns keep the latest value only, rich_text
    /// columns append `(step, value)` to the stored history.
    pub fn log_metric(
        &self,
        page_id: &str,
        key: &str,
        value: f64,
        step: Option<u64>,
    ) -> Result<PageInfo> {
        let page = self.get_page(page_id)?;
        let actual_key = metrics_key(key);
        let update = metric_update(&page, &actual_key, value, step)?;
        debug!(page_id, key = %actual_key, value, ?step, "Logging metric");
        self.update_properties(page_id, vec![(actual_key, update)])
    }

    /// Write several metrics with one fetch and one update. An empty slice
    /// returns the page unchanged.
    pub fn log_metrics<K: AsRef<str>>(
        &self,
        page_id: &str,
        values: &[(K, f64)],
        step: Option<u64>,
    ) -> Result<PageInfo> {
        let page = self.get_page(page_id)?;
        if values.is_empty() {
            return Ok(page);
        }
        let mut updates = Vec::with_capacity(values.len());
        for (key, value) in values {
            let actual_key = metrics_key(key.as_ref());
            let update = metric_update(&page, &actual_key, *value, step)?;
            updates.push((actual_key, update));
        }
        debug!(page_id, count = updates.len(), ?step, "Logging metrics");
        self.update_properties(page_id, updates)
    }

    /// Append a tag to the page's `tags` column
    pub fn set_tag(&self, page_id: &str, tag: &str, color: Option<SelectColor>) -> Result<PageInfo> {
        let page = self.get_page(page_id)?;
        let key = "tags";
        match FieldType::from_wire(locate(&page, key)?) {
            Some(FieldType::MultiSelect) => {}
            _ => return Err(unsupported(&page, key)),
        }
        let mut options: Vec<SelectOption> = page
            .property_value(key)
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| ApiError::Remote(format!("Unexpected tags value: {}", e)))?
            .unwrap_or_default();
        options.push(SelectOption::new(tag, color.unwrap_or_default()));
        debug!(page_id, tag, "Adding tag");
        self.update_properties(page_id, vec![(key.to_string(), PropertyUpdate::MultiSelect(options))])
    }

    /// Replace the page's `status`
    pub fn set_status(&self, page_id: &str, status: PageStatus) -> Result<PageInfo> {
        debug!(page_id, %status, "Setting status");
        self.update_properties(
            page_id,
            vec![(
                "status".to_string(),
                PropertyUpdate::Select(status.as_str().to_string()),
            )],
        )
    }

    /// Upload a local file to the object store and append it to `artifacts`
    pub fn log_artifact(&self, page_id: &str, local_path: &Path) -> Result<PageInfo> {
        let store = self.object_store.as_ref().ok_or_else(|| {
            StorageError::NotConfigured("set storage.endpoint and storage.bucket".to_string())
        })?;
        let page = self.get_page(page_id)?;
        let key = "artifacts";
        match FieldType::from_wire(locate(&page, key)?) {
            Some(FieldType::Files) => {}
            _ => return Err(unsupported(&page, key)),
        }

        let object_key = artifact_key(store.key_prefix(), page_id, local_path)?;
        let url = self.block_on(store.upload(local_path, store.bucket(), &object_key))?;
        let name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| object_key.clone());
        info!(page_id, %url, "Uploaded artifact");

        let mut files: Vec<FileRef> = page
            .property_value(key)
            .and_then(Value::as_array)
            .map(|entries| entries.iter().filter_map(FileRef::from_json).collect())
            .unwrap_or_default();
        files.push(FileRef { name, url });
        self.update_properties(page_id, vec![(key.to_string(), PropertyUpdate::Files(files))])
    }

    fn update_properties(
        &self,
        page_id: &str,
        updates: Vec<(String, PropertyUpdate)>,
    ) -> Result<PageInfo> {
        let properties: Map<String, Value> = updates
            .into_iter()
            .map(|(key, update)| (key, update.to_json()))
            .collect();
        let response = self.block_on(self.api.update_page(page_id, Value::Object(properties)))?;
        parse_object(response, "page")
    }
}

fn parse_object<T: serde::de::DeserializeOwned>(value: Value, kind: &str) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::Remote(format!("Unexpected {} object: {}", kind, e)))
}

/// Remote type token of `key`, or `KeyNotFound`
fn locate<'p>(page: &'p PageInfo, key: &str) -> Result<&'p str> {
    page.property_type(key).ok_or_else(|| ApiError::KeyNotFound {
        key: key.to_string(),
        page_id: page.id.clone(),
    })
}

fn unsupported(page: &PageInfo, key: &str) -> ApiError {
    ApiError::UnsupportedType {
        key: key.to_string(),
        field_type: page.property_type(key).unwrap_or_default().to_string(),
    }
}

fn mismatch(key: &str, expected: &'static str, value: &ParamValue) -> ApiError {
    ApiError::ValueTypeMismatch {
        key: key.to_string(),
        expected,
        actual: value.kind(),
    }
}

/// Update for a param column, dispatched on the column's remote type
fn param_update(page: &PageInfo, key: &str, value: &ParamValue) -> Result<PropertyUpdate> {
    let field_type = FieldType::from_wire(locate(page, key)?);
    match (field_type, value) {
        (Some(FieldType::Number), ParamValue::Number(n)) => Ok(PropertyUpdate::Number(*n)),
        (Some(FieldType::Number), other) => Err(mismatch(key, "number", other)),
        (Some(FieldType::RichText), v) => Ok(PropertyUpdate::RichText(v.to_string())),
        (Some(FieldType::Select), v) => Ok(PropertyUpdate::Select(v.to_string())),
        (Some(FieldType::Checkbox), ParamValue::Bool(b)) => Ok(PropertyUpdate::Checkbox(*b)),
        (Some(FieldType::Checkbox), other) => Err(mismatch(key, "boolean", other)),
        _ => Err(unsupported(page, key)),
    }
}

/// Update for a metric column; shared by single and batched metric logging
fn metric_update(
    page: &PageInfo,
    key: &str,
    value: f64,
    step: Option<u64>,
) -> Result<PropertyUpdate> {
    let field_type = FieldType::from_wire(locate(page, key)?);
    // JSON has no NaN or infinity
    if !value.is_finite() {
        return Err(ApiError::InvalidArgument(format!(
            "{} must be a finite number, got {}",
            key, value
        )));
    }
    match field_type {
        Some(FieldType::Number) => Ok(PropertyUpdate::Number(value)),
        Some(FieldType::RichText) => {
            let stored = page.text(key).unwrap_or_default();
            let mut history =
                MetricHistory::decode(&stored).map_err(|reason| ApiError::CorruptMetricHistory {
                    key: key.to_string(),
                    reason,
                })?;
            history.push(step, value);
            Ok(PropertyUpdate::RichText(history.encode()))
        }
        _ => Err(unsupported(page, key)),
    }
}
