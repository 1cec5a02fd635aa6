//! REDP ETL - crime-rate warehouse loader
//!
//! Extracts crime-statistic JSON documents from the object store for one
//! extract date, flattens them into tabular rows, and loads them into the
//! warehouse: either straight into `DIM_CRIME_RATE` or, after resolving
//! location and date surrogate keys, into `FACT_CRIME_RATE`.
//!
//! # Example
//!
//! ```no_run
//! use redp_etl::config::EtlConfig;
//! use redp_etl::event::ExtractEvent;
//! use redp_etl::pipeline::{CrimeRatePipeline, LoadTarget};
//! use redp_etl::storage::ObjectStore;
//! use redp_etl::warehouse::{create_pool, PgWarehouse};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = EtlConfig::load()?;
//!     let store = ObjectStore::new(&config.storage);
//!     let warehouse = PgWarehouse::new(create_pool(&config.warehouse).await?);
//!
//!     let pipeline = CrimeRatePipeline::new(store, warehouse, config.join.location_state);
//!     let status = pipeline
//!         .run(&ExtractEvent::new("2024-01-15"), LoadTarget::Fact)
//!         .await?;
//!
//!     assert_eq!(status.status_code, 200);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod event;
pub mod flatten;
pub mod join;
pub mod model;
pub mod pipeline;
pub mod storage;
pub mod warehouse;

// Re-export the types callers touch most
pub use event::{ExtractEvent, InvocationStatus};
pub use pipeline::{CrimeRatePipeline, LoadTarget};
