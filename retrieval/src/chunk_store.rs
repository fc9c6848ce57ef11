//! Local chunk-text store.
//!
//! Full chunk texts live here, keyed by vector id, because vector metadata
//! only carries a bounded preview. The store is a single JSON document of
//! the form `{"<id>": {"text": "..."}}`, read and written wholesale.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{Result, RetrievalError};

/// Persisted text of one chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub text: String,
}

/// Mapping from vector id to full chunk text.
#[derive(Debug, Clone, Default)]
pub struct ChunkStore {
    path: PathBuf,
    records: HashMap<String, ChunkRecord>,
}

impl ChunkStore {
    /// Create an empty store that will be written to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: HashMap::new(),
        }
    }

    /// Load the store at `path`.
    ///
    /// A missing file yields an empty store; retrieval then falls back to
    /// metadata previews.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Chunk store {} not found; starting empty", path.display());
                return Ok(Self::new(path));
            }
            Err(e) => {
                return Err(RetrievalError::Storage(format!("{}: {e}", path.display())));
            }
        };

        let records: HashMap<String, ChunkRecord> = serde_json::from_str(&content)?;
        info!("Loaded {} chunk records from {}", records.len(), path.display());

        Ok(Self { path, records })
    }

    /// Record the text for `id`.
    pub fn insert(&mut self, id: impl Into<String>, text: impl Into<String>) {
        self.records.insert(id.into(), ChunkRecord { text: text.into() });
    }

    /// Text stored for `id`.
    pub fn get(&self, id: &str) -> Option<&str> {
        self.records.get(id).map(|record| record.text.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the whole store, replacing any previous file.
    pub async fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| RetrievalError::Storage(format!("{}: {e}", parent.display())))?;
        }

        let content = serde_json::to_string(&self.records)?;

        // Write atomically using a temp file
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &content)
            .await
            .map_err(|e| RetrievalError::Storage(format!("{}: {e}", temp_path.display())))?;

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| RetrievalError::Storage(format!("{}: {e}", self.path.display())))?;

        debug!("Saved {} chunk records to {}", self.len(), self.path.display());
        Ok(())
    }
}
