//! Pinecone REST client.
//!
//! Control-plane calls (list / describe / create / delete) go to
//! `api.pinecone.io`; data-plane calls (upsert / query) go to the per-index
//! host reported by `describe`, which is cached after the first lookup.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{Result, VectorStoreError};
use crate::store::VectorStore;
use crate::types::{IndexDescription, Metric, QueryMatch, ServerlessSpec, Vector};

/// Default control-plane URL.
pub const PINECONE_CONTROL_URL: &str = "https://api.pinecone.io";

/// API version pinned in every request.
pub const PINECONE_API_VERSION: &str = "2025-01";

/// Pinecone vector store client.
pub struct PineconeClient {
    /// HTTP client carrying the auth headers.
    client: reqwest::Client,

    /// Control-plane base URL.
    control_url: String,

    /// Index name -> data-plane base URL.
    hosts: RwLock<HashMap<String, String>>,

    /// Delay between readiness polls after create.
    ready_poll_interval: Duration,

    /// Maximum readiness polls before giving up.
    ready_max_polls: usize,
}

impl PineconeClient {
    /// Create a client authenticated with `api_key`.
    pub fn new(api_key: &str) -> Result<Self> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(VectorStoreError::NotConfigured(
                "missing Pinecone API key".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            "api-key",
            HeaderValue::from_str(api_key).map_err(|_| {
                VectorStoreError::NotConfigured("invalid Pinecone API key".to_string())
            })?,
        );
        headers.insert(
            "x-pinecone-api-version",
            HeaderValue::from_static(PINECONE_API_VERSION),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            control_url: PINECONE_CONTROL_URL.to_string(),
            hosts: RwLock::new(HashMap::new()),
            ready_poll_interval: Duration::from_secs(1),
            ready_max_polls: 120,
        })
    }

    /// Set the control-plane URL.
    pub fn with_control_url(mut self, url: impl Into<String>) -> Self {
        self.control_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Configure how long `create_index` waits for the index to be ready.
    pub fn with_ready_polling(mut self, interval: Duration, max_polls: usize) -> Self {
        self.ready_poll_interval = interval;
        self.ready_max_polls = max_polls.max(1);
        self
    }

    async fn describe_model(&self, name: &str) -> Result<IndexModel> {
        let response = self
            .client
            .get(format!("{}/indexes/{name}", self.control_url))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_from(response, name).await);
        }

        let model: IndexModel = response.json().await?;
        if let Some(host) = &model.host {
            self.hosts
                .write()
                .await
                .insert(name.to_string(), data_plane_url(host));
        }
        Ok(model)
    }

    async fn host_for(&self, name: &str) -> Result<String> {
        if let Some(host) = self.hosts.read().await.get(name) {
            return Ok(host.clone());
        }

        let model = self.describe_model(name).await?;
        model.host.as_deref().map(data_plane_url).ok_or_else(|| {
            VectorStoreError::InvalidResponse(format!("index {name} has no host"))
        })
    }

    async fn wait_until_ready(&self, name: &str) -> Result<()> {
        for attempt in 1..=self.ready_max_polls {
            let model = self.describe_model(name).await?;
            if model.status.is_some_and(|s| s.ready) {
                debug!("Index {name} ready after {attempt} polls");
                return Ok(());
            }
            tokio::time::sleep(self.ready_poll_interval).await;
        }
        Err(VectorStoreError::NotReady(name.to_string()))
    }
}

#[async_trait]
impl VectorStore for PineconeClient {
    fn name(&self) -> &str {
        "pinecone"
    }

    async fn list_indexes(&self) -> Result<Vec<IndexDescription>> {
        let response = self
            .client
            .get(format!("{}/indexes", self.control_url))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_from(response, "").await);
        }

        let list: IndexList = response.json().await?;
        Ok(list
            .indexes
            .into_iter()
            .map(IndexModel::into_description)
            .collect())
    }

    async fn describe_index(&self, name: &str) -> Result<IndexDescription> {
        Ok(self.describe_model(name).await?.into_description())
    }

    async fn create_index(
        &self,
        name: &str,
        dimension: usize,
        metric: Metric,
        spec: &ServerlessSpec,
    ) -> Result<()> {
        let body = json!({
            "name": name,
            "dimension": dimension,
            "metric": metric,
            "spec": {
                "serverless": { "cloud": spec.cloud, "region": spec.region }
            }
        });

        let response = self
            .client
            .post(format!("{}/indexes", self.control_url))
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_from(response, name).await);
        }

        info!(
            "Created Pinecone index {name} (dim={dimension}, {}/{})",
            spec.cloud, spec.region
        );
        self.wait_until_ready(name).await
    }

    async fn delete_index(&self, name: &str) -> Result<()> {
        let response = self
            .client
            .delete(format!("{}/indexes/{name}", self.control_url))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_from(response, name).await);
        }

        self.hosts.write().await.remove(name);
        info!("Deleted Pinecone index {name}");
        Ok(())
    }

    async fn upsert(&self, index: &str, vectors: &[Vector]) -> Result<usize> {
        let host = self.host_for(index).await?;
        let response = self
            .client
            .post(format!("{host}/vectors/upsert"))
            .json(&json!({ "vectors": vectors }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_from(response, index).await);
        }

        let result: UpsertResponse = response.json().await?;
        let count = result.upserted_count.unwrap_or(vectors.len());
        debug!("Upserted {count} vectors into {index}");
        Ok(count)
    }

    async fn query(
        &self,
        index: &str,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<QueryMatch>> {
        let host = self.host_for(index).await?;
        let body = json!({
            "vector": vector,
            "topK": top_k,
            "includeMetadata": include_metadata,
            "includeValues": false
        });

        let response = self
            .client
            .post(format!("{host}/query"))
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_from(response, index).await);
        }

        let result: QueryResponse = response.json().await?;
        debug!("Query on {index} returned {} matches", result.matches.len());
        Ok(result.matches)
    }
}

/// Data-plane hosts come back without a scheme.
fn data_plane_url(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

async fn error_from(response: reqwest::Response, name: &str) -> VectorStoreError {
    let status = response.status();
    let message = response.text().await.unwrap_or_default();
    match status {
        reqwest::StatusCode::NOT_FOUND if !name.is_empty() => {
            VectorStoreError::IndexNotFound(name.to_string())
        }
        reqwest::StatusCode::CONFLICT if !name.is_empty() => {
            VectorStoreError::IndexExists(name.to_string())
        }
        _ => VectorStoreError::ApiRequest {
            status: status.as_u16(),
            message,
        },
    }
}

#[derive(Debug, Deserialize)]
struct IndexList {
    #[serde(default)]
    indexes: Vec<IndexModel>,
}

#[derive(Debug, Deserialize)]
struct IndexModel {
    name: String,
    /// Absent for sparse indexes.
    #[serde(default)]
    dimension: Option<usize>,
    #[serde(default)]
    metric: Metric,
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    status: Option<IndexStatus>,
}

impl IndexModel {
    fn into_description(self) -> IndexDescription {
        IndexDescription {
            name: self.name,
            dimension: self.dimension.unwrap_or(0),
            metric: self.metric,
        }
    }
}

#[derive(Debug, Deserialize)]
struct IndexStatus {
    #[serde(default)]
    ready: bool,
}

#[derive(Debug, Deserialize)]
struct UpsertResponse {
    #[serde(rename = "upsertedCount")]
    upserted_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}
