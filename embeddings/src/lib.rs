//! # Embeddings
//!
//! This crate turns text into fixed-length vectors for the Sukoon
//! retrieval pipeline.
//!
//! ## Features
//!
//! - **Embedding Client**: order-preserving, sub-batched embedding of text
//! - **Normalization**: heterogeneous provider payloads flattened to `Vec<f32>`
//! - **Providers**: Gemini REST API and a deterministic offline hashing provider
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Embeddings System                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  EmbeddingClient ──► EmbeddingProvider ──► raw items            │
//! │       │                                        │                │
//! │       ▼                                        ▼                │
//! │  sub-batching                          normalize_embedding      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod client;
pub mod error;
pub mod normalize;
pub mod provider;

pub use client::EmbeddingClient;
pub use error::{EmbeddingError, Result};
pub use normalize::normalize_embedding;
pub use provider::{EmbeddingProvider, EmbeddingResponse, GeminiEmbeddingProvider, HashingProvider};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;

/// Maximum number of texts sent to the embedding service in one request.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Default Gemini embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "gemini-embedding-001";
