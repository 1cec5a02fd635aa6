//! Object store configuration

use redp_common::{RedpError, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Default endpoint, matching the bucket's home region
pub const DEFAULT_S3_ENDPOINT: &str = "https://s3.amazonaws.com";

/// Default region when none is configured
pub const DEFAULT_S3_REGION: &str = "us-east-1";

/// Connection settings for the crime-statistics bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub path_style: bool,
}

impl StorageConfig {
    /// Load from the environment
    ///
    /// `BUCKET_NAME`, `ACCESS_KEY` and `SECRET_ACCESS_KEY` are required;
    /// `S3_ENDPOINT`, `S3_REGION` and `S3_PATH_STYLE` fall back to defaults
    /// suitable for AWS proper.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            endpoint: env::var("S3_ENDPOINT").unwrap_or_else(|_| DEFAULT_S3_ENDPOINT.to_string()),
            region: env::var("S3_REGION").unwrap_or_else(|_| DEFAULT_S3_REGION.to_string()),
            bucket: env::var("BUCKET_NAME").map_err(|_| RedpError::missing_env("BUCKET_NAME"))?,
            access_key: env::var("ACCESS_KEY").map_err(|_| RedpError::missing_env("ACCESS_KEY"))?,
            secret_key: env::var("SECRET_ACCESS_KEY")
                .map_err(|_| RedpError::missing_env("SECRET_ACCESS_KEY"))?,
            path_style: env::var("S3_PATH_STYLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        })
    }
}
