//! # Vector Store
//!
//! The boundary between the Sukoon pipeline and the external vector index.
//!
//! - [`VectorStore`]: list / describe / create / delete indexes, upsert and query
//! - [`PineconeClient`]: the production implementation over Pinecone's REST API
//! - [`MemoryVectorStore`]: brute-force in-process double for tests and local runs
//!
//! ```text
//! ┌──────────────┐   upsert / query   ┌───────────────────────────┐
//! │  Indexer /   │ ─────────────────► │  dyn VectorStore           │
//! │  Retriever   │                    │  ├── PineconeClient (REST) │
//! └──────────────┘                    │  └── MemoryVectorStore     │
//!                                     └───────────────────────────┘
//! ```

pub mod error;
pub mod memory;
pub mod pinecone;
pub mod similarity;
pub mod store;
pub mod types;

pub use error::{Result, VectorStoreError};
pub use memory::{MemoryVectorStore, OperationCounts};
pub use pinecone::PineconeClient;
pub use store::VectorStore;
pub use types::{IndexDescription, Metadata, Metric, QueryMatch, ServerlessSpec, Vector};
