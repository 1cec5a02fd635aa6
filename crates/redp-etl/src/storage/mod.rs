//! Object store access
//!
//! Crime-statistic documents land in the bucket under date-partitioned
//! keys: `real_estate/crime/<extract_date>/...`. This module lists and
//! retrieves them. The [`ObjectFetcher`] trait is the seam the pipeline
//! consumes, so tests can substitute an in-memory store.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::{
    config::{Credentials, Region},
    Client,
};
use redp_common::RedpError;
use tracing::{debug, info, instrument};

pub mod config;

/// Fixed key prefix for crime-statistic objects
pub const CRIME_KEY_PREFIX: &str = "real_estate/crime";

/// Key prefix selecting one extract date's worth of objects
pub fn crime_prefix(extract_date: &str) -> String {
    format!("{}/{}", CRIME_KEY_PREFIX, extract_date)
}

/// Narrow listing/retrieval interface over the object store
#[async_trait]
pub trait ObjectFetcher: Send + Sync {
    /// List all object keys under a prefix
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Retrieve one object's full content
    async fn download(&self, key: &str) -> Result<Vec<u8>>;
}

/// S3-backed object store client
#[derive(Clone)]
pub struct ObjectStore {
    client: Client,
    bucket: String,
}

impl ObjectStore {
    pub fn new(config: &config::StorageConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "redp-storage",
        );

        let s3_config = aws_sdk_s3::Config::builder()
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()))
            .endpoint_url(&config.endpoint)
            .force_path_style(config.path_style)
            .build();

        info!(bucket = %config.bucket, "Object store client initialized");

        Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait]
impl ObjectFetcher for ObjectStore {
    #[instrument(skip(self))]
    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        debug!("Listing objects in s3://{}/{}", self.bucket, prefix);

        let response = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .send()
            .await
            .context("Failed to list S3 objects")?;

        let keys = response
            .contents()
            .iter()
            .filter_map(|obj| obj.key().map(|k| k.to_string()))
            .collect();

        Ok(keys)
    }

    #[instrument(skip(self))]
    async fn download(&self, key: &str) -> Result<Vec<u8>> {
        debug!("Downloading s3://{}/{}", self.bucket, key);

        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .context(format!("Failed to download from S3: {}", key))?;

        let data = response
            .body
            .collect()
            .await
            .context("Failed to read S3 response body")?
            .into_bytes()
            .to_vec();

        debug!(
            "Downloaded {} bytes from s3://{}/{}",
            data.len(),
            self.bucket,
            key
        );

        Ok(data)
    }
}

/// Fetch every document for an extract date, one object at a time
///
/// Fails if the listing comes back empty (an extract date with no objects
/// means the upstream extraction never ran) and propagates any retrieval
/// failure without retrying.
pub async fn fetch_documents<F: ObjectFetcher + ?Sized>(
    fetcher: &F,
    extract_date: &str,
) -> Result<Vec<Vec<u8>>> {
    let prefix = crime_prefix(extract_date);
    let keys = fetcher.list(&prefix).await?;

    if keys.is_empty() {
        return Err(RedpError::Storage(format!("no objects found under prefix {}", prefix)).into());
    }

    info!(prefix = %prefix, objects = keys.len(), "Retrieving crime documents");

    let mut payloads = Vec::with_capacity(keys.len());
    for key in &keys {
        payloads.push(fetcher.download(key).await?);
    }

    Ok(payloads)
}
