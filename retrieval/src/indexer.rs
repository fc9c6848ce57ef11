//! Corpus indexing.
//!
//! Embeds chunks in batches, gives each one a fresh id, persists the full
//! texts to the local [`ChunkStore`], then upserts `(id, vector, metadata)`
//! entries in batches. Metadata only ever holds a bounded preview.

use std::sync::Arc;

use serde_json::Value;
use sukoon_embeddings::EmbeddingClient;
use sukoon_vector_store::{Metadata, Vector, VectorStore};
use tracing::info;
use uuid::Uuid;

use crate::chunk_store::ChunkStore;
use crate::config::RetrievalConfig;
use crate::error::{Result, RetrievalError};

/// Metadata key holding the chunk preview.
pub const PREVIEW_KEY: &str = "preview";

/// Metadata key holding the source tag.
pub const SOURCE_KEY: &str = "source";

/// Metadata for one chunk: its first `preview_length` characters and a source tag.
pub fn safe_metadata(text: &str, preview_length: usize, source: &str) -> Metadata {
    let preview: String = text.chars().take(preview_length).collect();

    let mut metadata = Metadata::new();
    metadata.insert(PREVIEW_KEY.to_string(), Value::String(preview));
    metadata.insert(SOURCE_KEY.to_string(), Value::String(source.to_string()));
    metadata
}

/// Counters from one indexing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexingStats {
    /// Chunks embedded and recorded.
    pub chunks: usize,

    /// Vectors the store reported as written.
    pub vectors_upserted: usize,

    /// Embedding batches sent.
    pub embed_batches: usize,

    /// Upsert batches sent.
    pub upsert_batches: usize,
}

/// Writes chunks into the vector index and the local chunk store.
pub struct CorpusIndexer {
    embedder: EmbeddingClient,
    store: Arc<dyn VectorStore>,
    config: RetrievalConfig,
}

impl CorpusIndexer {
    pub fn new(
        embedder: EmbeddingClient,
        store: Arc<dyn VectorStore>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            config,
        }
    }

    /// Index `chunks` into the configured index.
    ///
    /// The chunk store at the configured path is replaced wholesale. Any
    /// failed batch aborts the run; nothing is resumed.
    pub async fn index(&self, chunks: &[String]) -> Result<IndexingStats> {
        if chunks.is_empty() {
            return Err(RetrievalError::EmptyCorpus);
        }

        let embed_batch_size = self.config.embed_batch_size.max(1);
        let upsert_batch_size = self.config.upsert_batch_size.max(1);
        let embed_batches = chunks.len().div_ceil(embed_batch_size);

        let mut chunk_store = ChunkStore::new(&self.config.chunk_map_path);
        let mut vectors = Vec::with_capacity(chunks.len());

        for (i, batch) in chunks.chunks(embed_batch_size).enumerate() {
            let embeddings = self.embedder.embed(batch).await?;

            for (text, values) in batch.iter().zip(embeddings) {
                let id = Uuid::new_v4().to_string();
                let metadata =
                    safe_metadata(text, self.config.preview_length, &self.config.source_tag);
                vectors.push(Vector::new(id.clone(), values).with_metadata(metadata));
                chunk_store.insert(id, text.clone());
            }
            info!("Embedded batch {}/{embed_batches}", i + 1);
        }

        chunk_store.save().await?;
        info!(
            "Prepared {} vectors; saved full chunks to {}",
            vectors.len(),
            chunk_store.path().display()
        );

        let upsert_batches = vectors.len().div_ceil(upsert_batch_size);
        let mut vectors_upserted = 0;
        for (i, batch) in vectors.chunks(upsert_batch_size).enumerate() {
            vectors_upserted += self.store.upsert(&self.config.index_name, batch).await?;
            info!("Upserted batch {}/{upsert_batches}", i + 1);
        }

        Ok(IndexingStats {
            chunks: chunks.len(),
            vectors_upserted,
            embed_batches,
            upsert_batches,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use sukoon_embeddings::HashingProvider;
    use sukoon_vector_store::{MemoryVectorStore, Metric, ServerlessSpec};
    use tempfile::TempDir;

    const DIM: usize = 16;

    async fn setup(dir: &TempDir) -> (Arc<MemoryVectorStore>, RetrievalConfig) {
        let store = Arc::new(MemoryVectorStore::new());
        store
            .create_index("test-index", DIM, Metric::Cosine, &ServerlessSpec::default())
            .await
            .unwrap();

        let mut config = RetrievalConfig::default()
            .with_index_name("test-index")
            .with_chunk_map_path(dir.path().join("chunk_map.json"))
            .with_deletion_settle(Duration::ZERO);
        config.embed_batch_size = 3;
        config.upsert_batch_size = 4;
        (store, config)
    }

    fn embedder() -> EmbeddingClient {
        EmbeddingClient::new(Arc::new(HashingProvider::new(DIM)))
    }

    #[test]
    fn test_safe_metadata_preview_bound() {
        let text = "x".repeat(1500);
        let metadata = safe_metadata(&text, 1000, "Sukoon_RAG");

        let preview = metadata[PREVIEW_KEY].as_str().unwrap();
        assert_eq!(preview.chars().count(), 1000);
        assert!(text.starts_with(preview));
        assert_eq!(metadata[SOURCE_KEY], Value::String("Sukoon_RAG".to_string()));
        assert_eq!(metadata.len(), 2);
    }

    #[test]
    fn test_safe_metadata_counts_characters() {
        let metadata = safe_metadata("सुकून मन", 3, "s");
        assert_eq!(metadata[PREVIEW_KEY].as_str().unwrap(), "सुक");

        let short = safe_metadata("calm", 1000, "s");
        assert_eq!(short[PREVIEW_KEY].as_str().unwrap(), "calm");
    }

    #[tokio::test]
    async fn test_index_batches_and_persists() {
        let dir = TempDir::new().unwrap();
        let (store, config) = setup(&dir).await;
        let indexer = CorpusIndexer::new(embedder(), store.clone(), config.clone());

        let chunks: Vec<String> = (0..10).map(|i| format!("chunk number {i}")).collect();
        let stats = indexer.index(&chunks).await.unwrap();

        assert_eq!(
            stats,
            IndexingStats {
                chunks: 10,
                vectors_upserted: 10,
                embed_batches: 4,
                upsert_batches: 3,
            }
        );
        assert_eq!(store.len("test-index").await, Some(10));
        assert_eq!(store.operation_counts().await.upsert, 3);

        let chunk_store = ChunkStore::load(&config.chunk_map_path).await.unwrap();
        assert_eq!(chunk_store.len(), 10);
    }

    #[tokio::test]
    async fn test_long_chunk_only_recoverable_from_chunk_store() {
        let dir = TempDir::new().unwrap();
        let (store, config) = setup(&dir).await;
        let indexer = CorpusIndexer::new(embedder(), store.clone(), config.clone());

        let long = "breathe slowly. ".repeat(100);
        indexer.index(std::slice::from_ref(&long)).await.unwrap();

        let chunk_store = ChunkStore::load(&config.chunk_map_path).await.unwrap();
        let hits = store
            .query("test-index", &HashingProvider::new(DIM).embed_text(&long), 1, true)
            .await
            .unwrap();
        let hit = &hits[0];

        let preview = hit.metadata_str(PREVIEW_KEY).unwrap();
        assert_eq!(preview.chars().count(), 1000);
        assert_ne!(preview, long);
        assert_eq!(chunk_store.get(&hit.id), Some(long.as_str()));
    }

    #[tokio::test]
    async fn test_empty_input_is_error() {
        let dir = TempDir::new().unwrap();
        let (store, config) = setup(&dir).await;
        let indexer = CorpusIndexer::new(embedder(), store.clone(), config.clone());

        let result = indexer.index(&[]).await;
        assert!(matches!(result, Err(RetrievalError::EmptyCorpus)));
        assert!(!config.chunk_map_path.exists());
    }

    #[tokio::test]
    async fn test_upsert_failure_aborts() {
        let dir = TempDir::new().unwrap();
        let (_, config) = setup(&dir).await;
        // No index exists in this store, so the first upsert fails.
        let empty_store = Arc::new(MemoryVectorStore::new());
        let indexer = CorpusIndexer::new(embedder(), empty_store, config);

        let result = indexer.index(&["a".to_string()]).await;
        assert!(matches!(result, Err(RetrievalError::VectorStore(_))));
    }
}
