//! Error types for the nutrition analytics engine
//!
//! Computations never return these: insufficient or degenerate data is
//! reported through `Option`/empty results. Errors only surface from the
//! validating record constructors and from configuration loading.

use thiserror::Error;

/// Engine-wide error types
#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

impl From<validator::ValidationErrors> for AnalyticsError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AnalyticsError::Config(errors.to_string())
    }
}

/// Result alias for fallible engine operations
pub type Result<T> = std::result::Result<T, AnalyticsError>;
