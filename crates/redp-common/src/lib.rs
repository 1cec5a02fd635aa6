//! REDP Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling and logging for the REDP workspace.
//!
//! # Overview
//!
//! This crate provides the functionality every REDP component needs:
//!
//! - **Error Handling**: the [`RedpError`] enum and [`Result`] alias
//! - **Logging**: `tracing`-based logging configured from the environment
//!
//! # Example
//!
//! ```no_run
//! use redp_common::logging::{init_logging, LogConfig};
//!
//! fn start() -> anyhow::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     init_logging(&config)?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{RedpError, Result};
