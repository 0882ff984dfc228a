//! Error types for parts_common

use thiserror::Error;

/// Errors raised while building a distributor registry
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Registry file could not be read
    #[error("Failed to read distributor registry: {0}")]
    Io(#[from] std::io::Error),
    /// Registry file is not valid JSON or has the wrong shape
    #[error("Failed to parse distributor registry: {0}")]
    Parse(#[from] serde_json::Error),
    /// An entry has an empty id
    #[error("Distributor id must not be empty")]
    EmptyId,
    /// Two entries share the same id
    #[error("Duplicate distributor id: {0}")]
    DuplicateId(String),
    /// Two entries claim the same aggregator seller name
    #[error("Seller name '{seller}' is mapped to both '{first}' and '{second}'")]
    DuplicateSeller {
        seller: String,
        first: String,
        second: String,
    },
}

/// Result alias for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;
