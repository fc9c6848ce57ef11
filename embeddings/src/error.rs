//! Error types for the embeddings system.

use thiserror::Error;

/// Result type alias for embedding operations.
pub type Result<T> = std::result::Result<T, EmbeddingError>;

/// Errors that can occur in the embeddings system.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Provider not configured.
    #[error("embedding provider not configured")]
    ProviderNotConfigured,

    /// Embedding was requested for zero texts.
    #[error("embedding requires at least one input text")]
    EmptyInput,

    /// API request failed.
    #[error("embedding API request failed ({status}): {message}")]
    ApiRequest { status: u16, message: String },

    /// Invalid response envelope from provider.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// An embedding item could not be flattened into a vector.
    #[error("cannot normalize embedding: {0}")]
    Normalization(String),

    /// The provider returned a different number of embeddings than requested.
    #[error("provider returned {actual} embeddings for {expected} inputs")]
    CountMismatch { expected: usize, actual: usize },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
