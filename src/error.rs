//! Error types for permtree

use thiserror::Error;

/// The main error type for permtree operations
#[derive(Debug, Error)]
pub enum PermTreeError {
    #[error("Invalid permission path '{0}'")]
    InvalidPath(String),

    /// Catalog is not a well-formed tree with unique sibling names
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Role {0} not found")]
    RoleNotFound(u64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for permtree operations
pub type Result<T> = std::result::Result<T, PermTreeError>;

/// Convert any storage-layer error to PermTreeError
pub fn err<E: std::error::Error>(e: E) -> PermTreeError {
    PermTreeError::Storage(e.to_string())
}

/// Catalog shape error shorthand
pub(crate) fn invalid_catalog(msg: impl Into<String>) -> PermTreeError {
    PermTreeError::InvalidCatalog(msg.into())
}
