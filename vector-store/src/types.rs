//! Data types shared by all vector store implementations.

use serde::{Deserialize, Serialize};

/// Metadata stored alongside a vector.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Distance metric an index is created with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Cosine similarity (higher is closer).
    #[default]
    Cosine,
    /// Euclidean distance (lower is closer).
    Euclidean,
    /// Dot product (higher is closer).
    Dotproduct,
}

/// Serverless placement for a new index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerlessSpec {
    /// Cloud provider, e.g. `aws`.
    pub cloud: String,

    /// Region, e.g. `us-east-1`.
    pub region: String,
}

impl ServerlessSpec {
    pub fn new(cloud: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            cloud: cloud.into(),
            region: region.into(),
        }
    }
}

impl Default for ServerlessSpec {
    fn default() -> Self {
        Self::new("aws", "us-east-1")
    }
}

/// Configuration of an existing index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescription {
    /// Index name.
    pub name: String,

    /// Vector dimension fixed at creation.
    pub dimension: usize,

    /// Distance metric.
    pub metric: Metric,
}

/// A vector to upsert: `(id, values, metadata)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub id: String,

    pub values: Vec<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl Vector {
    pub fn new(id: impl Into<String>, values: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            values,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// One ranked query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMatch {
    pub id: String,

    #[serde(default)]
    pub score: f32,

    #[serde(default)]
    pub metadata: Option<Metadata>,
}

impl QueryMatch {
    /// A string field from the match metadata, if present.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.as_ref()?.get(key)?.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_metric_wire_format() {
        assert_eq!(serde_json::to_value(Metric::Cosine).unwrap(), json!("cosine"));
        assert_eq!(
            serde_json::from_value::<Metric>(json!("dotproduct")).unwrap(),
            Metric::Dotproduct
        );
    }

    #[test]
    fn test_match_metadata_lookup() {
        let m: QueryMatch = serde_json::from_value(json!({
            "id": "a",
            "score": 0.5,
            "metadata": { "preview": "hello", "count": 3 }
        }))
        .unwrap();
        assert_eq!(m.metadata_str("preview"), Some("hello"));
        assert_eq!(m.metadata_str("count"), None);
        assert_eq!(m.metadata_str("missing"), None);

        let bare: QueryMatch = serde_json::from_value(json!({ "id": "b" })).unwrap();
        assert_eq!(bare.metadata_str("preview"), None);
    }
}
