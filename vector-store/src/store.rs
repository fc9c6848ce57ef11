//! The vector store trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{IndexDescription, Metric, QueryMatch, ServerlessSpec, Vector};

/// Operations the pipeline needs from a vector database.
///
/// Implementations are shared between the indexing run (writer) and
/// retrieval (reader) without any transactional coordination.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// List all indexes with their configured dimension.
    async fn list_indexes(&self) -> Result<Vec<IndexDescription>>;

    /// Describe one index.
    async fn describe_index(&self, name: &str) -> Result<IndexDescription>;

    /// Create an index. Returns once the index accepts writes.
    async fn create_index(
        &self,
        name: &str,
        dimension: usize,
        metric: Metric,
        spec: &ServerlessSpec,
    ) -> Result<()>;

    /// Delete an index and all its vectors.
    async fn delete_index(&self, name: &str) -> Result<()>;

    /// Insert or overwrite vectors by id. Returns the number written.
    async fn upsert(&self, index: &str, vectors: &[Vector]) -> Result<usize>;

    /// Nearest neighbours of `vector`, best match first.
    async fn query(
        &self,
        index: &str,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<QueryMatch>>;
}
