//! HTTPS transport for the Notion REST API.

use super::{SearchPage, WorkspaceApi};
use crate::config::ApiConfig;
use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

// Map transport-level HTTP errors to ApiError
fn map_http_error(error: reqwest::Error) -> ApiError {
    if let Some(status) = error.status() {
        map_status(status.as_u16(), &error.to_string())
    } else if error.is_timeout() {
        ApiError::RemoteRequestFailed(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        ApiError::RemoteRequestFailed(format!("Connection error: {}", error))
    } else {
        ApiError::Remote(format!("HTTP error: {}", error))
    }
}

fn map_status(status: u16, body: &str) -> ApiError {
    match status {
        401 | 403 => ApiError::RemoteAuthFailed(format!("Authentication failed: {}", body)),
        404 => ApiError::RemoteNotFound(body.to_string()),
        429 => ApiError::RemoteRateLimit(format!("Rate limit exceeded: {}", body)),
        _ => ApiError::RemoteRequestFailed(format!("Request failed with status {}: {}", status, body)),
    }
}

fn build_http_client(config: &ApiConfig) -> Result<Client, ApiError> {
    Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .map_err(|e| ApiError::Remote(format!("Failed to create HTTP client: {}", e)))
}

/// Notion API client
pub struct NotionHttpApi {
    client: Client,
    token: Option<String>,
    base_url: String,
    notion_version: String,
}

impl NotionHttpApi {
    /// The token may be absent; requests then fail with a configuration error.
    pub fn new(token: Option<String>, config: &ApiConfig) -> Result<Self, ApiError> {
        Ok(Self {
            client: build_http_client(config)?,
            token,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            notion_version: config.notion_version.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let token = self.token.as_deref().ok_or_else(|| {
            ApiError::Configuration(
                "No Notion token: set NOTION_TOKEN or `auth` in the config file".to_string(),
            )
        })?;
        let url = format!("{}/{}", self.base_url, path);
        debug!(%method, %url, "Workspace request");
        Ok(self
            .client
            .request(method, &url)
            .header("Authorization", format!("Bearer {}", token))
            .header("Notion-Version", &self.notion_version)
            .header("Content-Type", "application/json"))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Value, ApiError> {
        let response = builder.send().await.map_err(map_http_error)?;
        Self::read_json(response).await
    }

    async fn read_json(response: Response) -> Result<Value, ApiError> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(map_status(status.as_u16(), &error_text));
        }
        response
            .json()
            .await
            .map_err(|e| ApiError::Remote(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl WorkspaceApi for NotionHttpApi {
    async fn create_database(
        &self,
        parent_page_id: &str,
        title: Value,
        properties: Value,
    ) -> Result<Value, ApiError> {
        let body = json!({
            "parent": { "type": "page_id", "page_id": parent_page_id },
            "title": title,
            "properties": properties,
        });
        self.send(self.request(Method::POST, "databases")?.json(&body))
            .await
    }

    async fn retrieve_database(&self, database_id: &str) -> Result<Value, ApiError> {
        self.send(self.request(Method::GET, &format!("databases/{}", database_id))?)
            .await
    }

    async fn search_databases(&self, start_cursor: Option<&str>) -> Result<SearchPage, ApiError> {
        let mut body = json!({
            "filter": { "property": "object", "value": "database" },
        });
        if let Some(cursor) = start_cursor {
            body["start_cursor"] = json!(cursor);
        }
        let response = self
            .send(self.request(Method::POST, "search")?.json(&body))
            .await?;
        SearchPage::from_json(response)
    }

    async fn create_page(&self, database_id: &str, properties: Value) -> Result<Value, ApiError> {
        let body = json!({
            "parent": { "database_id": database_id },
            "properties": properties,
        });
        self.send(self.request(Method::POST, "pages")?.json(&body))
            .await
    }

    async fn retrieve_page(&self, page_id: &str) -> Result<Value, ApiError> {
        self.send(self.request(Method::GET, &format!("pages/{}", page_id))?)
            .await
    }

    async fn update_page(&self, page_id: &str, properties: Value) -> Result<Value, ApiError> {
        let body = json!({ "properties": properties });
        self.send(
            self.request(Method::PATCH, &format!("pages/{}", page_id))?
                .json(&body),
        )
        .await
    }

    fn backend_name(&self) -> &str {
        "notion"
    }
}
