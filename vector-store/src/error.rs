//! Error types for the vector store boundary.

use thiserror::Error;

/// Result type alias for vector store operations.
pub type Result<T> = std::result::Result<T, VectorStoreError>;

/// Errors that can occur talking to a vector index.
#[derive(Error, Debug)]
pub enum VectorStoreError {
    /// Client not configured (missing API key).
    #[error("vector store not configured: {0}")]
    NotConfigured(String),

    /// The named index does not exist.
    #[error("index not found: {0}")]
    IndexNotFound(String),

    /// An index with this name already exists.
    #[error("index already exists: {0}")]
    IndexExists(String),

    /// A vector does not match the index dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Index did not become ready in time.
    #[error("index {0} did not become ready")]
    NotReady(String),

    /// The request was rejected before being sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// API request failed.
    #[error("vector store request failed ({status}): {message}")]
    ApiRequest { status: u16, message: String },

    /// Invalid response from the service.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
