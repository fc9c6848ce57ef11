//! Order-preserving, sub-batched embedding client.

use std::sync::Arc;

use tracing::debug;

use crate::error::{EmbeddingError, Result};
use crate::normalize::normalize_embedding;
use crate::provider::EmbeddingProvider;
use crate::{DEFAULT_BATCH_SIZE, Embedding};

/// Embeds texts through an [`EmbeddingProvider`].
///
/// Inputs are split into sub-batches of at most `batch_size` texts, each
/// sub-batch is sent sequentially, and the normalized vectors are
/// concatenated back in input order. The output always has exactly one
/// vector per input.
#[derive(Clone)]
pub struct EmbeddingClient {
    provider: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
}

impl EmbeddingClient {
    /// Create a client with the default batch size.
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Set the maximum number of texts per provider request.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Maximum number of texts per provider request.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Model identifier of the underlying provider.
    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Embed a non-empty sequence of texts.
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let response = self.provider.embed_batch(batch).await?;
            if response.items.len() != batch.len() {
                return Err(EmbeddingError::CountMismatch {
                    expected: batch.len(),
                    actual: response.items.len(),
                });
            }
            for item in &response.items {
                embeddings.push(normalize_embedding(item)?);
            }
            debug!(
                "Embedded {} texts with {} ({}/{})",
                batch.len(),
                response.model,
                embeddings.len(),
                texts.len()
            );
        }

        if let Some(first) = embeddings.first() {
            let dimension = first.len();
            if let Some(odd) = embeddings.iter().find(|e| e.len() != dimension) {
                return Err(EmbeddingError::InvalidResponse(format!(
                    "mixed embedding dimensions {dimension} and {}",
                    odd.len()
                )));
            }
        }

        Ok(embeddings)
    }

    /// Embed a single text.
    pub async fn embed_one(&self, text: &str) -> Result<Embedding> {
        self.embed(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or(EmbeddingError::CountMismatch {
                expected: 1,
                actual: 0,
            })
    }

    /// Determine the embedding dimension by embedding one sample text.
    pub async fn detect_dimension(&self, sample: &str) -> Result<usize> {
        let dimension = self.embed_one(sample).await?.len();
        debug!("Detected embedding dimension {dimension} for {}", self.model());
        Ok(dimension)
    }
}
