//! Top-k retrieval over the vector index.

use std::sync::Arc;

use sukoon_embeddings::EmbeddingClient;
use sukoon_vector_store::{QueryMatch, VectorStore};
use tracing::{debug, warn};

use crate::chunk_store::ChunkStore;
use crate::config::RetrievalConfig;
use crate::error::Result;
use crate::indexer::PREVIEW_KEY;

/// Where a hit's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    /// Full chunk text from the local chunk store.
    ChunkStore,
    /// Bounded preview from vector metadata; may be truncated.
    MetadataPreview,
    /// No text was available.
    Missing,
}

/// One retrieved chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalHit {
    /// Vector id.
    pub id: String,

    /// Similarity score reported by the store.
    pub score: f32,

    /// Resolved chunk text; empty when nothing could be resolved.
    pub text: String,

    /// Origin of `text`.
    pub source: TextSource,
}

impl RetrievalHit {
    /// Whether the text came from a fallback rather than the chunk store.
    pub fn is_degraded(&self) -> bool {
        self.source != TextSource::ChunkStore
    }
}

/// Embeds queries and resolves nearest neighbours to chunk text.
pub struct Retriever {
    embedder: EmbeddingClient,
    store: Arc<dyn VectorStore>,
    chunks: Arc<ChunkStore>,
    index_name: String,
    top_k: usize,
}

impl Retriever {
    pub fn new(
        embedder: EmbeddingClient,
        store: Arc<dyn VectorStore>,
        chunks: Arc<ChunkStore>,
        config: &RetrievalConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            chunks,
            index_name: config.index_name.clone(),
            top_k: config.top_k,
        }
    }

    /// Retrieve the configured number of hits for `query`.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievalHit>> {
        self.retrieve_top_k(query, self.top_k).await
    }

    /// Retrieve up to `top_k` hits for `query`, in the store's ranking order.
    pub async fn retrieve_top_k(&self, query: &str, top_k: usize) -> Result<Vec<RetrievalHit>> {
        let vector = self.embedder.embed_one(query).await?;
        let matches = self
            .store
            .query(&self.index_name, &vector, top_k, true)
            .await?;
        debug!("Query returned {} matches from {}", matches.len(), self.index_name);

        let hits: Vec<RetrievalHit> = matches.into_iter().map(|m| self.resolve(m)).collect();

        let degraded = hits.iter().filter(|hit| hit.is_degraded()).count();
        if degraded > 0 {
            warn!(
                "{degraded} of {} hits fell back to metadata previews or empty text",
                hits.len()
            );
        }

        Ok(hits)
    }

    fn resolve(&self, m: QueryMatch) -> RetrievalHit {
        let (text, source) = match self.chunks.get(&m.id) {
            Some(text) => (text.to_string(), TextSource::ChunkStore),
            None => match m.metadata_str(PREVIEW_KEY) {
                Some(preview) => (preview.to_string(), TextSource::MetadataPreview),
                None => (String::new(), TextSource::Missing),
            },
        };

        RetrievalHit {
            id: m.id,
            score: m.score,
            text,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use sukoon_embeddings::HashingProvider;
    use sukoon_vector_store::{MemoryVectorStore, Metadata, Metric, ServerlessSpec, Vector};

    const DIM: usize = 32;

    fn preview(text: &str) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert(PREVIEW_KEY.to_string(), json!(text));
        metadata
    }

    async fn retriever(chunks: ChunkStore) -> Retriever {
        let provider = HashingProvider::new(DIM);
        let store = Arc::new(MemoryVectorStore::new());
        store
            .create_index("test-index", DIM, Metric::Cosine, &ServerlessSpec::default())
            .await
            .unwrap();
        store
            .upsert(
                "test-index",
                &[
                    Vector::new("stored", provider.embed_text("walk outside in the sun"))
                        .with_metadata(preview("walk outside")),
                    Vector::new("preview-only", provider.embed_text("write in a journal"))
                        .with_metadata(preview("write in a")),
                    Vector::new("bare", provider.embed_text("call a friend")),
                ],
            )
            .await
            .unwrap();

        let config = RetrievalConfig::default()
            .with_index_name("test-index")
            .with_top_k(2);
        Retriever::new(
            EmbeddingClient::new(Arc::new(provider)),
            store,
            Arc::new(chunks),
            &config,
        )
    }

    #[tokio::test]
    async fn test_resolves_from_chunk_store() {
        let mut chunks = ChunkStore::new("unused.json");
        chunks.insert("stored", "walk outside in the sun");
        let retriever = retriever(chunks).await;

        let hits = retriever.retrieve("walk outside in the sun").await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "stored");
        assert_eq!(hits[0].text, "walk outside in the sun");
        assert_eq!(hits[0].source, TextSource::ChunkStore);
        assert!(!hits[0].is_degraded());
        assert!(hits[0].score >= hits[1].score);
    }

    #[tokio::test]
    async fn test_falls_back_to_preview_then_empty() {
        let retriever = retriever(ChunkStore::new("unused.json")).await;

        let hits = retriever.retrieve_top_k("write in a journal", 3).await.unwrap();
        assert_eq!(hits.len(), 3);

        let by_id = |id: &str| hits.iter().find(|hit| hit.id == id).unwrap();
        assert_eq!(by_id("preview-only").text, "write in a");
        assert_eq!(by_id("preview-only").source, TextSource::MetadataPreview);
        assert_eq!(by_id("bare").text, "");
        assert_eq!(by_id("bare").source, TextSource::Missing);
        assert!(hits.iter().all(RetrievalHit::is_degraded));
    }
}
