//! Error types for indexing and retrieval.

use thiserror::Error;

/// Result type alias for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Errors that can occur while building or querying the index.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// Missing credentials or invalid settings.
    #[error("configuration error: {0}")]
    Config(String),

    /// Embedding error.
    #[error("embedding error: {0}")]
    Embedding(#[from] sukoon_embeddings::EmbeddingError),

    /// Vector store error.
    #[error("vector store error: {0}")]
    VectorStore(#[from] sukoon_vector_store::VectorStoreError),

    /// The corpus produced no chunks.
    #[error("corpus is empty: no chunks to index")]
    EmptyCorpus,

    /// Chunk-text store could not be read or written.
    #[error("chunk store error: {0}")]
    Storage(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
