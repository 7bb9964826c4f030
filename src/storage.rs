//! Artifact Storage
//!
//! Uploads run artifacts to an object store and hands back the URL recorded in the
//! run's `artifacts` column. Object URLs follow `<endpoint>/<bucket>/<key>`.

use crate::config::StorageConfig;
use crate::error::StorageError;
use async_trait::async_trait;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore as _, PutPayload};
use std::path::Path;
use tracing::debug;

/// Object URL for a bucket/key pair
pub fn object_url(endpoint: &str, bucket: &str, key: &str) -> String {
    format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key)
}

/// Object store client trait
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload a local file; returns the object's URL
    async fn upload(&self, path: &Path, bucket: &str, key: &str) -> Result<String, StorageError>;

    /// Bucket used for artifacts
    fn bucket(&self) -> &str;

    /// Prefix prepended to artifact keys
    fn key_prefix(&self) -> &str {
        ""
    }
}

/// Uploads to an S3-compatible endpoint with SigV4-signed requests.
///
/// Credentials come from the standard AWS chain (`AWS_ACCESS_KEY_ID` /
/// `AWS_SECRET_ACCESS_KEY`, web identity, container and instance metadata).
/// Requests use path-style addressing, so object URLs stay
/// `<endpoint>/<bucket>/<key>`.
pub struct S3ObjectStore {
    endpoint: String,
    bucket: String,
    key_prefix: String,
    region: Option<String>,
}

impl S3ObjectStore {
    pub fn new(endpoint: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            key_prefix: String::new(),
            region: None,
        }
    }

    pub fn with_region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    pub fn with_key_prefix(mut self, key_prefix: impl Into<String>) -> Self {
        self.key_prefix = key_prefix.into();
        self
    }

    /// `None` when no endpoint/bucket is configured
    pub fn from_config(config: &StorageConfig) -> Option<Self> {
        let endpoint = config.endpoint.clone()?;
        let bucket = config.bucket.clone()?;
        Some(
            Self::new(endpoint, bucket)
                .with_key_prefix(config.key_prefix.clone())
                .with_region(config.region.clone()),
        )
    }

    fn client_for(&self, bucket: &str) -> Result<AmazonS3, StorageError> {
        let endpoint = self.endpoint.trim_end_matches('/');
        let mut builder = AmazonS3Builder::from_env()
            .with_endpoint(endpoint)
            .with_bucket_name(bucket)
            .with_virtual_hosted_style_request(false)
            .with_allow_http(endpoint.starts_with("http://"));
        if let Some(region) = &self.region {
            builder = builder.with_region(region);
        }
        builder
            .build()
            .map_err(|e| StorageError::UploadFailed(format!("S3 client for {}: {}", bucket, e)))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn upload(&self, path: &Path, bucket: &str, key: &str) -> Result<String, StorageError> {
        let bytes = tokio::fs::read(path).await?;
        let url = object_url(&self.endpoint, bucket, key);
        debug!(%url, size = bytes.len(), "Uploading artifact");

        let client = self.client_for(bucket)?;
        client
            .put(&ObjectPath::from(key), PutPayload::from(bytes))
            .await
            .map_err(|e| StorageError::UploadFailed(format!("{}: {}", url, e)))?;
        Ok(url)
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn key_prefix(&self) -> &str {
        &self.key_prefix
    }
}

/// Key under which a page's artifact is stored: `<prefix>/<page_id>/<file name>`
pub fn artifact_key(prefix: &str, page_id: &str, path: &Path) -> Result<String, StorageError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| StorageError::InvalidPath(path.to_path_buf()))?;
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        Ok(format!("{}/{}", page_id, file_name))
    } else {
        Ok(format!("{}/{}/{}", prefix, page_id, file_name))
    }
}
