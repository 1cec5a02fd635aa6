//! Configuration management
//!
//! One explicit config struct, built at startup from the environment (with
//! `.env` support) and passed by reference into the components. Nothing
//! reads the environment after this point.

use serde::{Deserialize, Serialize};

use crate::storage::config::StorageConfig;
use crate::warehouse::WarehouseConfig;

/// Default state filter for the location dimension
pub const DEFAULT_LOCATION_STATE: &str = "DE";

/// Full job configuration
#[derive(Debug, Clone)]
pub struct EtlConfig {
    pub storage: StorageConfig,
    pub warehouse: WarehouseConfig,
    pub join: JoinConfig,
}

/// Settings for the fact variant's dimension joins
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinConfig {
    /// State the location dimension is filtered to
    pub location_state: String,
}

impl EtlConfig {
    /// Load configuration from `.env` and the process environment
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            storage: StorageConfig::from_env()?,
            warehouse: WarehouseConfig::from_env()?,
            join: JoinConfig {
                location_state: std::env::var("LOCATION_STATE")
                    .unwrap_or_else(|_| DEFAULT_LOCATION_STATE.to_string()),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.storage.bucket.is_empty() {
            anyhow::bail!("Bucket name cannot be empty");
        }

        if self.join.location_state.is_empty() {
            anyhow::bail!("Location state filter cannot be empty");
        }

        if self.warehouse.max_connections == 0 {
            anyhow::bail!("Warehouse max_connections must be greater than 0");
        }

        Ok(())
    }
}
