//! Error types for part_pricing

use std::time::Duration;
use thiserror::Error;

/// Unified error type for part_pricing operations
#[derive(Debug, Error)]
pub enum PricingError {
    /// HTTP request failed (connection refused, reset, ...)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Request did not complete within the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    /// Failed to parse JSON response
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Aggregator endpoint answered 404
    #[error("Octopart server not found: {0}")]
    NotFound(String),
    /// API key missing or rejected
    #[error("Octopart key invalid (HTTP {0}), register one at https://www.octopart.com")]
    Unauthorized(reqwest::StatusCode),
    /// Any other HTTP error status code
    #[error("Octopart error: HTTP {0}")]
    HttpStatus(reqwest::StatusCode),
    /// Component list could not be read
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Distributor registry could not be built
    #[error(transparent)]
    Registry(#[from] parts_common::RegistryError),
}

impl PricingError {
    /// Transport failures worth another attempt.
    ///
    /// Authorization and not-found answers will not change on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PricingError::Network(_) | PricingError::Timeout(_) | PricingError::HttpStatus(_)
        )
    }
}

/// Crate-level error name
pub type Error = PricingError;

/// Result alias for part_pricing operations
pub type Result<T> = std::result::Result<T, PricingError>;
