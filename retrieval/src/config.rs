//! Configuration for indexing and retrieval.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sukoon_embeddings::{DEFAULT_BATCH_SIZE, DEFAULT_EMBEDDING_MODEL};
use sukoon_vector_store::{Metric, ServerlessSpec};

use crate::error::{Result, RetrievalError};

/// Default remote index name.
pub const DEFAULT_INDEX_NAME: &str = "sukoon-rag-index";

/// Default source tag stored in vector metadata.
pub const DEFAULT_SOURCE_TAG: &str = "Sukoon_RAG";

/// Configuration for indexing and retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Name of the remote vector index.
    pub index_name: String,

    /// Blocks concatenated into one chunk.
    pub blocks_per_chunk: usize,

    /// Texts per embedding request.
    pub embed_batch_size: usize,

    /// Vectors per upsert request.
    pub upsert_batch_size: usize,

    /// Characters of chunk text kept in vector metadata.
    pub preview_length: usize,

    /// Source tag stored in vector metadata.
    pub source_tag: String,

    /// Neighbours returned per query.
    pub top_k: usize,

    /// Metric for newly created indexes.
    pub metric: Metric,

    /// Placement for newly created indexes.
    pub serverless: ServerlessSpec,

    /// Where the full chunk texts are persisted.
    pub chunk_map_path: PathBuf,

    /// Seconds to wait after deleting an index before recreating it.
    pub deletion_settle_secs: u64,

    /// Embedding provider configuration.
    pub embedding: EmbeddingConfig,
}

impl RetrievalConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            index_name: DEFAULT_INDEX_NAME.to_string(),
            blocks_per_chunk: 4,
            embed_batch_size: DEFAULT_BATCH_SIZE,
            upsert_batch_size: 100,
            preview_length: 1000,
            source_tag: DEFAULT_SOURCE_TAG.to_string(),
            top_k: 5,
            metric: Metric::Cosine,
            serverless: ServerlessSpec::default(),
            chunk_map_path: PathBuf::from("chunk_map.json"),
            deletion_settle_secs: 3,
            embedding: EmbeddingConfig::default(),
        }
    }

    /// Set the index name.
    pub fn with_index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = name.into();
        self
    }

    /// Set where the chunk map is stored.
    pub fn with_chunk_map_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chunk_map_path = path.into();
        self
    }

    /// Set the deletion settle delay.
    pub fn with_deletion_settle(mut self, settle: Duration) -> Self {
        self.deletion_settle_secs = settle.as_secs();
        self
    }

    /// Set the result count for queries.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Deletion settle delay as a duration.
    pub fn deletion_settle(&self) -> Duration {
        Duration::from_secs(self.deletion_settle_secs)
    }

    /// Reject values that would make indexing or retrieval impossible.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("blocks_per_chunk", self.blocks_per_chunk),
            ("embed_batch_size", self.embed_batch_size),
            ("upsert_batch_size", self.upsert_batch_size),
            ("preview_length", self.preview_length),
            ("top_k", self.top_k),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(RetrievalError::Config(format!("{name} must be at least 1")));
        }
        if self.index_name.trim().is_empty() {
            return Err(RetrievalError::Config("index_name is empty".to_string()));
        }
        Ok(())
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for the embedding provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Model to use for embeddings.
    pub model: String,

    /// Override for the provider base URL.
    pub base_url: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            base_url: None,
        }
    }
}

/// API credentials and placement overrides read from the environment.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub gemini_api_key: String,
    pub pinecone_api_key: String,
    pub pinecone_cloud: Option<String>,
    pub pinecone_region: Option<String>,
}

impl Credentials {
    /// Read credentials from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through `lookup`; blank values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require = |key: &str| {
            read(key).ok_or_else(|| {
                RetrievalError::Config(format!("Set {key} in your env or .env file."))
            })
        };

        Ok(Self {
            gemini_api_key: require("GEMINI_API_KEY")?,
            pinecone_api_key: require("PINECONE_API_KEY")?,
            pinecone_cloud: read("PINECONE_CLOUD"),
            pinecone_region: read("PINECONE_REGION"),
        })
    }

    /// `base` with any cloud/region overrides applied.
    pub fn serverless_spec(&self, base: &ServerlessSpec) -> ServerlessSpec {
        ServerlessSpec {
            cloud: self.pinecone_cloud.clone().unwrap_or_else(|| base.cloud.clone()),
            region: self
                .pinecone_region
                .clone()
                .unwrap_or_else(|| base.region.clone()),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("gemini_api_key", &"<redacted>")
            .field("pinecone_api_key", &"<redacted>")
            .field("pinecone_cloud", &self.pinecone_cloud)
            .field("pinecone_region", &self.pinecone_region)
            .finish()
    }
}
