//! # Retrieval Engine
//!
//! This crate builds and serves the Sukoon vector index:
//!
//! - **Chunker**: blank-line separated blocks grouped into chunks
//! - **Reconciler**: keeps the remote index dimension in step with the embedding model
//! - **Indexer**: batched embedding and upsert with preview-only metadata
//! - **Chunk Store**: full chunk texts on local disk, keyed by vector id
//! - **Retriever**: top-k query with chunk-store / preview fallback
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       build_index(corpus)                       │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  Chunker ──► detect dim ──► Reconciler ──► Indexer              │
//! │                                              │        │         │
//! │                                              ▼        ▼         │
//! │                                        VectorStore  ChunkStore  │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                         retrieve(query)                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  embed query ──► VectorStore::query ──► ChunkStore / preview    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sukoon_retrieval::{Credentials, RetrievalConfig, RetrievalEngine};
//!
//! let engine = RetrievalEngine::builder()
//!     .with_config(RetrievalConfig::default())
//!     .with_credentials(&Credentials::from_env()?)?
//!     .build()?;
//!
//! engine.build_index_from_file("Data/corpus.txt".as_ref()).await?;
//! let hits = engine.open_retriever().await?.retrieve("I feel anxious").await?;
//! ```

pub mod chunk_store;
pub mod chunker;
pub mod config;
pub mod engine;
pub mod error;
pub mod indexer;
pub mod reconciler;
pub mod retriever;

pub use chunk_store::{ChunkRecord, ChunkStore};
pub use chunker::{BLOCK_SEPARATOR, ChunkedCorpus, CorpusChunker, chunk_blocks, split_blocks};
pub use config::{Credentials, EmbeddingConfig, RetrievalConfig};
pub use engine::{IndexReport, RetrievalEngine, RetrievalEngineBuilder};
pub use error::{Result, RetrievalError};
pub use indexer::{CorpusIndexer, IndexingStats, safe_metadata};
pub use reconciler::{IndexReconciler, ReconcileOutcome};
pub use retriever::{RetrievalHit, Retriever, TextSource};

// Re-export from dependencies for convenience
pub use sukoon_embeddings::{EmbeddingClient, EmbeddingProvider};
pub use sukoon_vector_store::VectorStore;
