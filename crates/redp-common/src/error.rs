//! Error types for REDP

use thiserror::Error;

/// Result type alias for REDP operations
pub type Result<T> = std::result::Result<T, RedpError>;

/// Main error type for REDP
#[derive(Error, Debug)]
pub enum RedpError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Object store error: {0}")]
    Storage(String),

    #[error("Flatten error: {0}")]
    Flatten(String),
}

impl RedpError {
    /// Create a configuration error for a missing environment variable
    pub fn missing_env(var: &str) -> Self {
        Self::Config(format!("environment variable {} is not set", var))
    }

    /// Create a flatten error with document context
    pub fn flatten(message: impl Into<String>) -> Self {
        Self::Flatten(message.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_env_names_the_variable() {
        let err = RedpError::missing_env("BUCKET_NAME");
        assert_eq!(
            err.to_string(),
            "Configuration error: environment variable BUCKET_NAME is not set"
        );
    }

    #[test]
    fn test_serde_error_converts() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: RedpError = parse_err.into();
        assert!(matches!(err, RedpError::Serialization(_)));
    }
}
