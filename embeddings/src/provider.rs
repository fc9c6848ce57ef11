//! Embedding providers.
//!
//! Providers return raw embedding items exactly as the service shaped them;
//! flattening into vectors is the job of [`crate::normalize`].

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::DEFAULT_EMBEDDING_MODEL;
use crate::error::{EmbeddingError, Result};

/// Default Gemini REST API base URL.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Raw response from one embedding request.
#[derive(Debug, Clone)]
pub struct EmbeddingResponse {
    /// One raw item per input text, in input order.
    pub items: Vec<Value>,

    /// Model used to generate the embeddings.
    pub model: String,
}

/// Trait for embedding providers.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// Get the model identifier sent with each request.
    fn model(&self) -> &str;

    /// Embed one batch of texts, returning one raw item per text.
    async fn embed_batch(&self, texts: &[String]) -> Result<EmbeddingResponse>;

    /// Check if the provider is available (API key set, etc.).
    fn is_available(&self) -> bool;
}

/// Gemini embedding provider (`batchEmbedContents`).
pub struct GeminiEmbeddingProvider {
    /// API key.
    api_key: Option<String>,

    /// API base URL.
    base_url: String,

    /// HTTP client.
    client: reqwest::Client,

    /// Embedding model.
    model: String,
}

impl GeminiEmbeddingProvider {
    /// Create a new Gemini provider, reading `GEMINI_API_KEY` if present.
    pub fn new() -> Self {
        Self {
            api_key: std::env::var("GEMINI_API_KEY").ok(),
            base_url: GEMINI_BASE_URL.to_string(),
            client: reqwest::Client::new(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the embedding model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl Default for GeminiEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbeddingProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<EmbeddingResponse> {
        if texts.is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let api_key = self
            .api_key
            .as_ref()
            .ok_or(EmbeddingError::ProviderNotConfigured)?;

        debug!(
            "Requesting {} embeddings with model: {}",
            texts.len(),
            self.model
        );

        let model_path = format!("models/{}", self.model);
        let requests: Vec<Value> = texts
            .iter()
            .map(|text| {
                json!({
                    "model": model_path,
                    "content": { "parts": [{ "text": text }] }
                })
            })
            .collect();

        let response = self
            .client
            .post(format!(
                "{}/models/{}:batchEmbedContents",
                self.base_url, self.model
            ))
            .query(&[("key", api_key.as_str())])
            .json(&json!({ "requests": requests }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ApiRequest {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response.json().await?;
        let items = extract_items(body)?;

        info!("Received {} embeddings from {}", items.len(), self.name());

        Ok(EmbeddingResponse {
            items,
            model: self.model.clone(),
        })
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Pull the per-text items out of a response envelope.
///
/// Accepts batch envelopes (`{"embeddings": [...]}`), single envelopes
/// (`{"embedding": {...}}`) and OpenAI-style envelopes (`{"data": [...]}`).
pub fn extract_items(body: Value) -> Result<Vec<Value>> {
    let Value::Object(mut envelope) = body else {
        return Err(EmbeddingError::InvalidResponse(
            "response body is not a JSON object".to_string(),
        ));
    };

    if let Some(Value::Array(items)) = envelope.remove("embeddings") {
        return Ok(items);
    }
    if let Some(item) = envelope.remove("embedding") {
        return Ok(vec![item]);
    }
    if let Some(Value::Array(items)) = envelope.remove("data") {
        return Ok(items);
    }

    Err(EmbeddingError::InvalidResponse(
        "no embeddings in response".to_string(),
    ))
}

/// Deterministic offline provider based on feature hashing.
///
/// Each lower-cased alphanumeric token is hashed into one of `dimension`
/// buckets, so texts sharing vocabulary land near each other under cosine
/// similarity. Tokens are hashed with 64-bit FNV-1a, so vectors are stable
/// across builds and an index written by one binary can be queried by another.
/// Useful for local runs and tests; not a semantic model.
pub struct HashingProvider {
    dimension: usize,
    model: String,
}

impl HashingProvider {
    /// Create a provider producing vectors of `dimension` components.
    pub fn new(dimension: usize) -> Self {
        let dimension = dimension.max(1);
        Self {
            dimension,
            model: format!("hashing-{dimension}"),
        }
    }

    /// Embed a single text into a vector.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        let lowered = text.to_lowercase();
        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = fnv1a(token.as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            if let Some(slot) = vector.get_mut(bucket) {
                *slot += sign;
            }
        }
        vector
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;

    bytes.iter().fold(OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(PRIME)
    })
}

#[async_trait]
impl EmbeddingProvider for HashingProvider {
    fn name(&self) -> &str {
        "hashing"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<EmbeddingResponse> {
        if texts.is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let items = texts
            .iter()
            .map(|text| json!(self.embed_text(text)))
            .collect();

        Ok(EmbeddingResponse {
            items,
            model: self.model.clone(),
        })
    }

    fn is_available(&self) -> bool {
        true
    }
}
