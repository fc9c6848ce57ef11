//! Index reconciliation.
//!
//! An index's dimension is fixed when it is created. Before indexing, the
//! reconciler makes sure the remote index matches the dimension the active
//! embedding model produces, recreating it when it does not.

use std::sync::Arc;
use std::time::Duration;

use sukoon_vector_store::{Metric, ServerlessSpec, VectorStore};
use tracing::{info, warn};

use crate::config::RetrievalConfig;
use crate::error::Result;

/// What the reconciler did to the remote index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The index existed with the right dimension.
    Reused,
    /// No index existed; a new one was created.
    Created,
    /// The index had another dimension and was replaced. Its vectors are gone.
    Recreated { previous_dimension: usize },
}

/// Ensures the target index exists with the expected dimension.
pub struct IndexReconciler {
    store: Arc<dyn VectorStore>,
    index_name: String,
    metric: Metric,
    spec: ServerlessSpec,
    settle: Duration,
}

impl IndexReconciler {
    pub fn new(store: Arc<dyn VectorStore>, config: &RetrievalConfig) -> Self {
        Self {
            store,
            index_name: config.index_name.clone(),
            metric: config.metric,
            spec: config.serverless.clone(),
            settle: config.deletion_settle(),
        }
    }

    /// Name of the index being reconciled.
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Make the index match `dimension`.
    ///
    /// On a mismatch the old index is deleted, the settle delay elapses, and
    /// a fresh index is created. Callers must reindex afterwards.
    pub async fn reconcile(&self, dimension: usize) -> Result<ReconcileOutcome> {
        let name = self.index_name.as_str();
        let existing = self.store.list_indexes().await?;

        if !existing.iter().any(|index| index.name == name) {
            info!("Creating index {name} (dim={dimension})");
            self.create(dimension).await?;
            return Ok(ReconcileOutcome::Created);
        }

        let description = self.store.describe_index(name).await?;
        if description.dimension == dimension {
            if description.metric != self.metric {
                warn!(
                    "Index {name} uses {:?} instead of {:?}; reusing it anyway",
                    description.metric, self.metric
                );
            }
            info!("Reusing index {name} (dim={dimension})");
            return Ok(ReconcileOutcome::Reused);
        }

        let previous_dimension = description.dimension;
        warn!(
            "Index {name} has dim={previous_dimension} but embeddings have dim={dimension}; recreating"
        );
        self.store.delete_index(name).await?;
        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }
        self.create(dimension).await?;

        Ok(ReconcileOutcome::Recreated { previous_dimension })
    }

    async fn create(&self, dimension: usize) -> Result<()> {
        self.store
            .create_index(&self.index_name, dimension, self.metric, &self.spec)
            .await?;
        Ok(())
    }
}
