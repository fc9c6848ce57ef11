//! Config file for the `sukoon` binary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sukoon_companion::GenerationConfig;
use sukoon_retrieval::RetrievalConfig;

/// Contents of a `sukoon.toml` file.
///
/// ```toml
/// [retrieval]
/// index_name = "sukoon-rag-index"
/// top_k = 5
///
/// [generation]
/// model = "gemini-2.5-flash"
/// max_output_tokens = 300
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SukoonConfig {
    pub retrieval: RetrievalConfig,
    pub generation: GenerationConfig,
}

impl SukoonConfig {
    /// Load `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid config {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.retrieval.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides.
    pub fn with_overrides(
        mut self,
        index_name: Option<String>,
        chunk_map: Option<PathBuf>,
    ) -> Self {
        if let Some(name) = index_name {
            self.retrieval.index_name = name;
        }
        if let Some(path) = chunk_map {
            self.retrieval.chunk_map_path = path;
        }
        self
    }
}
