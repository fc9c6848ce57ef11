//! Text generation providers and reply extraction.
//!
//! Providers hand back the raw JSON response; [`extract_reply`] turns any of
//! the shapes we have seen into a reply string.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::error::{CompanionError, Result};

/// Default Gemini REST API base URL.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default generation model.
pub const DEFAULT_GENERATION_MODEL: &str = "gemini-2.5-flash";

/// Configuration for the generation provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Model to generate replies with.
    pub model: String,

    /// Override for the provider base URL.
    pub base_url: Option<String>,

    /// Upper bound on reply length, if any.
    pub max_output_tokens: Option<u32>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_GENERATION_MODEL.to_string(),
            base_url: None,
            max_output_tokens: None,
        }
    }
}

/// Trait for generation providers.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// Get the model identifier sent with each request.
    fn model(&self) -> &str;

    /// Generate a completion for `prompt`, returning the raw response body.
    async fn generate(&self, prompt: &str) -> Result<Value>;

    /// Check if the provider is available (API key set, etc.).
    fn is_available(&self) -> bool;
}

/// Gemini generation provider (`generateContent`).
pub struct GeminiGenerator {
    /// API key.
    api_key: Option<String>,

    /// API base URL.
    base_url: String,

    /// HTTP client.
    client: reqwest::Client,

    /// Generation model.
    model: String,

    /// Optional reply length cap.
    max_output_tokens: Option<u32>,
}

impl GeminiGenerator {
    /// Create a new Gemini generator, reading `GEMINI_API_KEY` if present.
    pub fn new() -> Self {
        Self {
            api_key: std::env::var("GEMINI_API_KEY").ok(),
            base_url: GEMINI_BASE_URL.to_string(),
            client: reqwest::Client::new(),
            model: DEFAULT_GENERATION_MODEL.to_string(),
            max_output_tokens: None,
        }
    }

    /// Create a generator from configuration.
    pub fn from_config(config: &GenerationConfig) -> Self {
        let mut generator = Self::new().with_model(config.model.clone());
        if let Some(url) = &config.base_url {
            generator = generator.with_base_url(url.clone());
        }
        generator.max_output_tokens = config.max_output_tokens;
        generator
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

    /// Set the generation model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Cap the reply length.
    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }

    fn request_body(&self, prompt: &str) -> Value {
        let mut body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }]
        });
        if let Some(max_tokens) = self.max_output_tokens {
            body["generationConfig"] = json!({ "maxOutputTokens": max_tokens });
        }
        body
    }
}

impl Default for GeminiGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationProvider for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<Value> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            CompanionError::ProviderNotConfigured("GEMINI_API_KEY is not set".to_string())
        })?;

        debug!(
            "Requesting generation with model {} ({} prompt chars)",
            self.model,
            prompt.chars().count()
        );

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .query(&[("key", api_key.as_str())])
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CompanionError::Generation {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response.json().await?;
        info!("Received generation from {}", self.name());
        Ok(body)
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Reply text from a raw generation response.
///
/// Tries, in order: a top-level `text` field, the text parts of the first
/// candidate, the text segments of an `output` array, and finally the JSON
/// of the whole response.
pub fn extract_reply(response: &Value) -> String {
    direct_text(response)
        .or_else(|| output_segments(response))
        .unwrap_or_else(|| match response {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
}

fn direct_text(response: &Value) -> Option<String> {
    if let Some(text) = response.get("text").and_then(Value::as_str) {
        return Some(text.to_string());
    }

    let parts = response
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    (!text.is_empty()).then_some(text)
}

fn output_segments(response: &Value) -> Option<String> {
    let segments = response.get("output")?.as_array()?;
    let text: String = segments
        .iter()
        .filter_map(|segment| match segment {
            Value::String(text) => Some(text.as_str()),
            other => other.get("text").and_then(Value::as_str),
        })
        .collect();
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_extract_direct_text() {
        assert_eq!(extract_reply(&json!({ "text": "hello" })), "hello");
    }

    #[test]
    fn test_extract_candidate_parts() {
        let response = json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Take a " }, { "text": "breath." }] },
                "finishReason": "STOP"
            }]
        });
        assert_eq!(extract_reply(&response), "Take a breath.");
    }

    #[test]
    fn test_extract_output_segments() {
        let response = json!({ "output": [{ "text": "one " }, { "kind": "image" }, "two"] });
        assert_eq!(extract_reply(&response), "one two");
    }

    #[test]
    fn test_extract_falls_back_to_json() {
        let response = json!({ "candidates": [{ "finishReason": "SAFETY" }] });
        assert_eq!(extract_reply(&response), response.to_string());
        assert_eq!(extract_reply(&json!("plain")), "plain");
    }

    #[tokio::test]
    async fn test_gemini_generate_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{ "parts": [{ "text": "hi there" }] }],
                "generationConfig": { "maxOutputTokens": 300 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "Hello, friend." }] } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let generator = GeminiGenerator::new()
            .with_api_key("test-key")
            .with_base_url(server.uri())
            .with_max_output_tokens(300);
        let body = generator.generate("hi there").await.unwrap();

        assert_eq!(extract_reply(&body), "Hello, friend.");
    }

    #[tokio::test]
    async fn test_gemini_generate_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let generator = GeminiGenerator::new()
            .with_api_key("test-key")
            .with_base_url(server.uri());
        let err = generator.generate("hi").await.unwrap_err();

        assert!(matches!(
            err,
            CompanionError::Generation { status: 429, ref message } if message == "quota exceeded"
        ));
    }

    #[test]
    fn test_from_config() {
        let generator = GeminiGenerator::from_config(&GenerationConfig {
            model: "gemini-custom".to_string(),
            base_url: Some("http://localhost:1/".to_string()),
            max_output_tokens: Some(64),
        });
        assert_eq!(generator.model(), "gemini-custom");
        assert_eq!(generator.base_url, "http://localhost:1");
        assert_eq!(generator.max_output_tokens, Some(64));
    }
}
