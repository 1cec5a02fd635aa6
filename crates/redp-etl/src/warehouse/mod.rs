//! Warehouse access
//!
//! Dimension lookups and bulk loads run against a Postgres-compatible
//! warehouse through one sqlx pool. The environment contract is inherited
//! from the job's original deployment (`SNOWFLAKE_*`, `WAREHOUSE`,
//! `DATABASE`, `SCHEMA`), so existing deployments keep working unchanged.
//!
//! The [`WarehouseClient`] trait is the seam the pipeline consumes; tests
//! substitute an in-memory implementation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use redp_common::RedpError;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::env;
use std::time::Duration;

use crate::model::{CrimeRateRow, DateDimensionRow, FactRow, LocationDimensionRow};

pub mod dimensions;
pub mod loader;

/// Default warehouse port
pub const DEFAULT_WAREHOUSE_PORT: u16 = 5432;

/// Default maximum pool connections; the job is single-threaded so this
/// mostly bounds reconnect storms
pub const DEFAULT_MAX_CONNECTIONS: u32 = 4;

/// Default connection acquire timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Warehouse connection settings
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    pub username: String,
    pub password: String,
    /// Warehouse account host
    pub account: String,
    pub port: u16,
    /// Named compute warehouse; recorded for operators, not used in SQL
    pub warehouse: String,
    pub database: String,
    pub schema: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl WarehouseConfig {
    /// Load from the environment
    ///
    /// `SNOWFLAKE_USERNAME`, `SNOWFLAKE_PASSWORD`, `SNOWFLAKE_ACCOUNT`,
    /// `WAREHOUSE`, `DATABASE` and `SCHEMA` are required; `SNOWFLAKE_PORT`,
    /// `WAREHOUSE_MAX_CONNECTIONS` and `WAREHOUSE_CONNECT_TIMEOUT` are
    /// optional.
    pub fn from_env() -> redp_common::Result<Self> {
        Ok(Self {
            username: require_env("SNOWFLAKE_USERNAME")?,
            password: require_env("SNOWFLAKE_PASSWORD")?,
            account: require_env("SNOWFLAKE_ACCOUNT")?,
            port: env::var("SNOWFLAKE_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_WAREHOUSE_PORT),
            warehouse: require_env("WAREHOUSE")?,
            database: require_env("DATABASE")?,
            schema: require_env("SCHEMA")?,
            max_connections: env::var("WAREHOUSE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            connect_timeout_secs: env::var("WAREHOUSE_CONNECT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        })
    }

    /// Connection options for the configured account, database and schema
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.account)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.database)
            .options([("search_path", self.schema.as_str())])
    }
}

fn require_env(var: &str) -> redp_common::Result<String> {
    env::var(var).map_err(|_| RedpError::missing_env(var))
}

/// Create the warehouse connection pool
pub async fn create_pool(config: &WarehouseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect_with(config.connect_options())
        .await
        .context("Failed to connect to warehouse")?;

    tracing::info!(
        warehouse = %config.warehouse,
        database = %config.database,
        schema = %config.schema,
        "Warehouse connection pool created"
    );

    Ok(pool)
}

/// Verify the warehouse answers at all
pub async fn health_check(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .context("Warehouse health check failed")
}

/// Narrow query/load interface over the warehouse
#[async_trait]
pub trait WarehouseClient: Send + Sync {
    /// Location dimension rows for one state
    async fn location_dimension(&self, state: &str) -> Result<Vec<LocationDimensionRow>>;

    /// Date dimension rows for one calendar date
    async fn date_dimension(&self, date: NaiveDate) -> Result<Vec<DateDimensionRow>>;

    /// Bulk-append flattened rows into `DIM_CRIME_RATE`
    async fn load_dimension_rows(&self, rows: &[CrimeRateRow]) -> Result<u64>;

    /// Bulk-append enriched rows into `FACT_CRIME_RATE`
    async fn load_fact_rows(&self, rows: &[FactRow]) -> Result<u64>;
}

/// sqlx-backed warehouse client
#[derive(Clone)]
pub struct PgWarehouse {
    pool: PgPool,
}

impl PgWarehouse {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl WarehouseClient for PgWarehouse {
    async fn location_dimension(&self, state: &str) -> Result<Vec<LocationDimensionRow>> {
        dimensions::fetch_location_dimension(&self.pool, state).await
    }

    async fn date_dimension(&self, date: NaiveDate) -> Result<Vec<DateDimensionRow>> {
        dimensions::fetch_date_dimension(&self.pool, date).await
    }

    async fn load_dimension_rows(&self, rows: &[CrimeRateRow]) -> Result<u64> {
        loader::load_dimension_rows(&self.pool, rows).await
    }

    async fn load_fact_rows(&self, rows: &[FactRow]) -> Result<u64> {
        loader::load_fact_rows(&self.pool, rows).await
    }
}
