//! Error types for the companion.

use thiserror::Error;

/// Result type alias for companion operations.
pub type Result<T> = std::result::Result<T, CompanionError>;

/// Errors that can occur while answering a user turn.
#[derive(Error, Debug)]
pub enum CompanionError {
    /// The user message was empty.
    #[error("Message is required")]
    EmptyMessage,

    /// Generation provider not configured.
    #[error("generation provider not configured: {0}")]
    ProviderNotConfigured(String),

    /// Generation API returned an error status.
    #[error("generation request failed with status {status}: {message}")]
    Generation { status: u16, message: String },

    /// Retrieval error.
    #[error("retrieval error: {0}")]
    Retrieval(#[from] sukoon_retrieval::RetrievalError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
