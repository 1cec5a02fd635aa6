//! Invocation payload and status types
//!
//! The job is triggered with an event carrying a single `extractDate`
//! string (plus an opaque context value that is ignored). On success it
//! answers with `{"statusCode": 200}`.

use redp_common::Result;
use serde::{Deserialize, Serialize};

/// Invocation payload selecting which partition of source objects to process
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractEvent {
    /// Partition key, e.g. "2024-01-15"
    #[serde(rename = "extractDate")]
    pub extract_date: String,
}

impl ExtractEvent {
    pub fn new(extract_date: impl Into<String>) -> Self {
        Self {
            extract_date: extract_date.into(),
        }
    }

    /// Parse an event from its JSON representation
    pub fn from_json(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }
}

/// Invocation result reported on success
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvocationStatus {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

impl InvocationStatus {
    /// The one status this job ever reports; failures propagate as errors
    pub fn ok() -> Self {
        Self { status_code: 200 }
    }
}
