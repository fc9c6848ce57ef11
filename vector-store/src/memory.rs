//! In-process vector store.
//!
//! A brute-force implementation of [`VectorStore`] that keeps every index in
//! memory. It is a test double and local-run backend, not an ANN index:
//! queries score every stored vector.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{Result, VectorStoreError};
use crate::similarity::find_top_k;
use crate::store::VectorStore;
use crate::types::{IndexDescription, Metadata, Metric, QueryMatch, ServerlessSpec, Vector};

/// How many times each operation has been called.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationCounts {
    pub list: usize,
    pub describe: usize,
    pub create: usize,
    pub delete: usize,
    pub upsert: usize,
    pub query: usize,
}

/// An index held in memory.
struct MemoryIndex {
    dimension: usize,
    metric: Metric,
    /// Entries keyed by id; ordered so ties rank deterministically.
    entries: BTreeMap<String, (Vec<f32>, Option<Metadata>)>,
}

#[derive(Default)]
struct State {
    indexes: HashMap<String, MemoryIndex>,
    counts: OperationCounts,
}

/// A vector store that lives entirely in process memory.
#[derive(Default)]
pub struct MemoryVectorStore {
    state: RwLock<State>,
}

impl MemoryVectorStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vectors stored in `index`, if it exists.
    pub async fn len(&self, index: &str) -> Option<usize> {
        let state = self.state.read().await;
        state.indexes.get(index).map(|i| i.entries.len())
    }

    /// Fetch a stored vector and its metadata.
    pub async fn fetch(&self, index: &str, id: &str) -> Option<Vector> {
        let state = self.state.read().await;
        let (values, metadata) = state.indexes.get(index)?.entries.get(id)?;
        Some(Vector {
            id: id.to_string(),
            values: values.clone(),
            metadata: metadata.clone(),
        })
    }

    /// Snapshot of per-operation call counts.
    pub async fn operation_counts(&self) -> OperationCounts {
        self.state.read().await.counts
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn list_indexes(&self) -> Result<Vec<IndexDescription>> {
        let mut state = self.state.write().await;
        state.counts.list += 1;

        let mut indexes: Vec<IndexDescription> = state
            .indexes
            .iter()
            .map(|(name, index)| IndexDescription {
                name: name.clone(),
                dimension: index.dimension,
                metric: index.metric,
            })
            .collect();
        indexes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(indexes)
    }

    async fn describe_index(&self, name: &str) -> Result<IndexDescription> {
        let mut state = self.state.write().await;
        state.counts.describe += 1;

        let index = state
            .indexes
            .get(name)
            .ok_or_else(|| VectorStoreError::IndexNotFound(name.to_string()))?;
        Ok(IndexDescription {
            name: name.to_string(),
            dimension: index.dimension,
            metric: index.metric,
        })
    }

    async fn create_index(
        &self,
        name: &str,
        dimension: usize,
        metric: Metric,
        spec: &ServerlessSpec,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        state.counts.create += 1;

        if dimension == 0 {
            return Err(VectorStoreError::InvalidRequest(
                "dimension must be positive".to_string(),
            ));
        }
        if state.indexes.contains_key(name) {
            return Err(VectorStoreError::IndexExists(name.to_string()));
        }

        state.indexes.insert(
            name.to_string(),
            MemoryIndex {
                dimension,
                metric,
                entries: BTreeMap::new(),
            },
        );
        info!(
            "Created in-memory index {name} (dim={dimension}, {}/{})",
            spec.cloud, spec.region
        );
        Ok(())
    }

    async fn delete_index(&self, name: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.counts.delete += 1;

        state
            .indexes
            .remove(name)
            .ok_or_else(|| VectorStoreError::IndexNotFound(name.to_string()))?;
        info!("Deleted in-memory index {name}");
        Ok(())
    }

    async fn upsert(&self, index: &str, vectors: &[Vector]) -> Result<usize> {
        let mut state = self.state.write().await;
        state.counts.upsert += 1;

        let target = state
            .indexes
            .get_mut(index)
            .ok_or_else(|| VectorStoreError::IndexNotFound(index.to_string()))?;

        // Validate the whole batch before writing any of it.
        if let Some(bad) = vectors.iter().find(|v| v.values.len() != target.dimension) {
            return Err(VectorStoreError::DimensionMismatch {
                expected: target.dimension,
                actual: bad.values.len(),
            });
        }

        for vector in vectors {
            target.entries.insert(
                vector.id.clone(),
                (vector.values.clone(), vector.metadata.clone()),
            );
        }
        debug!("Upserted {} vectors into {index}", vectors.len());
        Ok(vectors.len())
    }

    async fn query(
        &self,
        index: &str,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<QueryMatch>> {
        let mut state = self.state.write().await;
        state.counts.query += 1;

        let target = state
            .indexes
            .get(index)
            .ok_or_else(|| VectorStoreError::IndexNotFound(index.to_string()))?;
        if vector.len() != target.dimension {
            return Err(VectorStoreError::DimensionMismatch {
                expected: target.dimension,
                actual: vector.len(),
            });
        }

        let candidates = target
            .entries
            .iter()
            .map(|(id, (values, _))| (id.as_str(), values.as_slice()));
        let ranked = find_top_k(target.metric, vector, candidates, top_k)?;

        Ok(ranked
            .into_iter()
            .map(|(id, score)| {
                let metadata = if include_metadata {
                    target.entries.get(&id).and_then(|(_, m)| m.clone())
                } else {
                    None
                };
                QueryMatch {
                    id,
                    score,
                    metadata,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn metadata(preview: &str) -> Metadata {
        let mut m = Metadata::new();
        m.insert("preview".to_string(), json!(preview));
        m
    }

    async fn store_with_index(dimension: usize) -> MemoryVectorStore {
        let store = MemoryVectorStore::new();
        store
            .create_index("test", dimension, Metric::Cosine, &ServerlessSpec::default())
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_create_list_describe_delete() {
        let store = store_with_index(3).await;

        let listed = store.list_indexes().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].dimension, 3);

        let described = store.describe_index("test").await.unwrap();
        assert_eq!(described.metric, Metric::Cosine);

        let err = store
            .create_index("test", 3, Metric::Cosine, &ServerlessSpec::default())
            .await
            .unwrap_err();
        assert!(matches!(err, VectorStoreError::IndexExists(_)));

        store.delete_index("test").await.unwrap();
        assert!(store.list_indexes().await.unwrap().is_empty());
        assert!(matches!(
            store.describe_index("test").await.unwrap_err(),
            VectorStoreError::IndexNotFound(_)
        ));

        let counts = store.operation_counts().await;
        assert_eq!(counts.create, 2);
        assert_eq!(counts.delete, 1);
        assert_eq!(counts.list, 2);
    }

    #[tokio::test]
    async fn test_query_ranks_and_includes_metadata() {
        let store = store_with_index(3).await;
        store
            .upsert(
                "test",
                &[
                    Vector::new("a", vec![1.0, 0.0, 0.0]).with_metadata(metadata("alpha")),
                    Vector::new("b", vec![0.0, 1.0, 0.0]).with_metadata(metadata("beta")),
                    Vector::new("c", vec![0.7, 0.7, 0.0]),
                ],
            )
            .await
            .unwrap();

        let matches = store.query("test", &[1.0, 0.0, 0.0], 2, true).await.unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "a");
        assert_eq!(matches[0].metadata_str("preview"), Some("alpha"));
        assert_eq!(matches[1].id, "c");
        assert!(matches[1].metadata.is_none());

        let bare = store.query("test", &[1.0, 0.0, 0.0], 1, false).await.unwrap();
        assert!(bare[0].metadata.is_none());
    }

    #[tokio::test]
    async fn test_upsert_overwrites_by_id() {
        let store = store_with_index(2).await;
        store
            .upsert("test", &[Vector::new("x", vec![1.0, 0.0])])
            .await
            .unwrap();
        store
            .upsert("test", &[Vector::new("x", vec![0.0, 1.0])])
            .await
            .unwrap();

        assert_eq!(store.len("test").await, Some(1));
        assert_eq!(store.fetch("test", "x").await.unwrap().values, vec![0.0, 1.0]);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_rejects_whole_batch() {
        let store = store_with_index(3).await;
        let err = store
            .upsert(
                "test",
                &[
                    Vector::new("ok", vec![1.0, 0.0, 0.0]),
                    Vector::new("bad", vec![1.0, 0.0]),
                ],
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VectorStoreError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
        assert_eq!(store.len("test").await, Some(0));

        let err = store.query("test", &[1.0], 1, true).await.unwrap_err();
        assert!(matches!(err, VectorStoreError::DimensionMismatch { .. }));
    }

    #[tokio::test]
    async fn test_missing_index() {
        let store = MemoryVectorStore::new();
        assert!(matches!(
            store.upsert("nope", &[]).await.unwrap_err(),
            VectorStoreError::IndexNotFound(_)
        ));
        assert!(matches!(
            store
                .create_index("zero", 0, Metric::Cosine, &ServerlessSpec::default())
                .await
                .unwrap_err(),
            VectorStoreError::InvalidRequest(_)
        ));
    }
}
