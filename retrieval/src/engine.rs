//! Retrieval engine: the index build and retriever entry points.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sukoon_embeddings::{EmbeddingClient, EmbeddingProvider, GeminiEmbeddingProvider};
use sukoon_vector_store::{PineconeClient, VectorStore};
use tracing::info;

use crate::chunk_store::ChunkStore;
use crate::chunker::{ChunkedCorpus, CorpusChunker};
use crate::config::{Credentials, RetrievalConfig};
use crate::error::{Result, RetrievalError};
use crate::indexer::CorpusIndexer;
use crate::reconciler::{IndexReconciler, ReconcileOutcome};
use crate::retriever::Retriever;

/// Summary of one index build.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexReport {
    /// Non-empty blocks found in the corpus.
    pub blocks: usize,

    /// Chunks embedded and indexed.
    pub chunks: usize,

    /// Embedding dimension detected for this run.
    pub dimension: usize,

    /// What reconciliation did to the remote index.
    pub outcome: ReconcileOutcome,

    /// Vectors the store reported as written.
    pub vectors_upserted: usize,

    /// Where the full chunk texts were written.
    pub chunk_map_path: PathBuf,
}

/// Owns the embedding client and vector store shared by indexing and retrieval.
///
/// Indexing and serving are separate operations: [`build_index`] runs the
/// batch job, [`open_retriever`] loads the chunk store for query time without
/// touching the corpus.
///
/// [`build_index`]: RetrievalEngine::build_index
/// [`open_retriever`]: RetrievalEngine::open_retriever
pub struct RetrievalEngine {
    /// Configuration.
    config: RetrievalConfig,

    /// Embedding client, batched per the configuration.
    embedder: EmbeddingClient,

    /// Vector index backend.
    store: Arc<dyn VectorStore>,

    /// Corpus chunker, sized by `blocks_per_chunk`.
    chunker: CorpusChunker,
}

impl RetrievalEngine {
    /// Create a new retrieval engine builder.
    pub fn builder() -> RetrievalEngineBuilder {
        RetrievalEngineBuilder::new()
    }

    /// Create an engine from explicit dependencies.
    pub fn new(
        config: RetrievalConfig,
        embedder: EmbeddingClient,
        store: Arc<dyn VectorStore>,
    ) -> Result<Self> {
        config.validate()?;
        let embedder = embedder.with_batch_size(config.embed_batch_size);
        let chunker = CorpusChunker::new(config.blocks_per_chunk);

        info!(
            "Retrieval engine ready (index={}, embeddings={}, store={})",
            config.index_name,
            embedder.model(),
            store.name()
        );
        Ok(Self {
            config,
            embedder,
            store,
            chunker,
        })
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn embedder(&self) -> &EmbeddingClient {
        &self.embedder
    }

    pub fn store(&self) -> Arc<dyn VectorStore> {
        Arc::clone(&self.store)
    }

    /// Chunk `corpus`, reconcile the index to the embedding dimension, and
    /// index every chunk.
    pub async fn build_index(&self, corpus: &str) -> Result<IndexReport> {
        self.index_corpus(self.chunker.split(corpus)).await
    }

    /// [`build_index`](Self::build_index) over a UTF-8 corpus file.
    pub async fn build_index_from_file(&self, path: &Path) -> Result<IndexReport> {
        self.index_corpus(self.chunker.chunk_file(path).await?).await
    }

    async fn index_corpus(&self, corpus: ChunkedCorpus) -> Result<IndexReport> {
        let ChunkedCorpus { blocks, chunks } = corpus;
        info!("Loaded {blocks} blocks -> {} chunks", chunks.len());

        let Some(sample) = chunks.first() else {
            return Err(RetrievalError::EmptyCorpus);
        };

        let dimension = self.embedder.detect_dimension(sample).await?;
        info!("Detected embedding dimension: {dimension}");

        let reconciler = IndexReconciler::new(self.store(), &self.config);
        let outcome = reconciler.reconcile(dimension).await?;

        let indexer = CorpusIndexer::new(
            self.embedder.clone(),
            self.store(),
            self.config.clone(),
        );
        let stats = indexer.index(&chunks).await?;
        info!(
            "Indexed {} chunks into {} ({} vectors upserted)",
            stats.chunks, self.config.index_name, stats.vectors_upserted
        );

        Ok(IndexReport {
            blocks,
            chunks: stats.chunks,
            dimension,
            outcome,
            vectors_upserted: stats.vectors_upserted,
            chunk_map_path: self.config.chunk_map_path.clone(),
        })
    }

    /// Load the chunk store and return a retriever over the configured index.
    pub async fn open_retriever(&self) -> Result<Retriever> {
        let chunks = ChunkStore::load(&self.config.chunk_map_path).await?;
        Ok(Retriever::new(
            self.embedder.clone(),
            self.store(),
            Arc::new(chunks),
            &self.config,
        ))
    }
}

/// Builder for [`RetrievalEngine`].
pub struct RetrievalEngineBuilder {
    config: RetrievalConfig,
    provider: Option<Arc<dyn EmbeddingProvider>>,
    store: Option<Arc<dyn VectorStore>>,
}

impl RetrievalEngineBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            config: RetrievalConfig::default(),
            provider: None,
            store: None,
        }
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: RetrievalConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the index name.
    pub fn with_index_name(mut self, name: impl Into<String>) -> Self {
        self.config.index_name = name.into();
        self
    }

    /// Set where the chunk map is stored.
    pub fn with_chunk_map_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.chunk_map_path = path.into();
        self
    }

    /// Set the embedding provider.
    pub fn with_embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the vector store.
    pub fn with_vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use Gemini embeddings and Pinecone, authenticated with `credentials`.
    ///
    /// Call after [`with_config`](Self::with_config) so the configured model
    /// and placement are picked up.
    pub fn with_credentials(mut self, credentials: &Credentials) -> Result<Self> {
        let mut gemini = GeminiEmbeddingProvider::new()
            .with_api_key(credentials.gemini_api_key.clone())
            .with_model(self.config.embedding.model.clone());
        if let Some(url) = &self.config.embedding.base_url {
            gemini = gemini.with_base_url(url.clone());
        }

        self.config.serverless = credentials.serverless_spec(&self.config.serverless);
        self.provider = Some(Arc::new(gemini));
        self.store = Some(Arc::new(PineconeClient::new(&credentials.pinecone_api_key)?));
        Ok(self)
    }

    /// Build the engine.
    pub fn build(self) -> Result<RetrievalEngine> {
        let provider = self
            .provider
            .ok_or_else(|| RetrievalError::Config("no embedding provider set".to_string()))?;
        let store = self
            .store
            .ok_or_else(|| RetrievalError::Config("no vector store set".to_string()))?;

        RetrievalEngine::new(self.config, EmbeddingClient::new(provider), store)
    }
}

impl Default for RetrievalEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
