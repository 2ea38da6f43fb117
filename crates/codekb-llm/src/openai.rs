use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LlmError, Result};
use crate::http::{REQUEST_TIMEOUT, embedding_client};
use crate::provider::EmbeddingProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "text-embedding-3-small";

/// Client for the OpenAI-compatible `/embeddings` endpoint.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl fmt::Debug for OpenAiEmbedder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiEmbedder")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiEmbedder {
    /// Embedder using [`embedding_client`] with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: String, mut base_url: String, model: String) -> Result<Self> {
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self {
            client: embedding_client(REQUEST_TIMEOUT)?,
            api_key,
            base_url,
            model,
        })
    }

    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn request(&self, input: EmbeddingInput<'_>) -> Result<Vec<EmbeddingData>> {
        let body = EmbeddingRequest {
            input,
            model: &self.model,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.map_err(LlmError::Http)?;

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!("OpenAI embedding API rate limited: {text}");
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            tracing::error!("OpenAI embedding API error {status}: {text}");
            return Err(LlmError::Status {
                status: status.as_u16(),
            });
        }

        let resp: EmbeddingResponse = serde_json::from_str(&text)?;
        if resp.data.is_empty() {
            return Err(LlmError::EmptyResponse { provider: "openai" });
        }
        Ok(resp.data)
    }
}

impl EmbeddingProvider for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let data = self.request(EmbeddingInput::Single(text)).await?;
        data.into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or(LlmError::EmptyResponse { provider: "openai" })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut data = self.request(EmbeddingInput::Batch(texts)).await?;
        if data.len() != texts.len() {
            return Err(LlmError::Other(format!(
                "OpenAI returned {} embeddings for {} inputs",
                data.len(),
                texts.len()
            )));
        }
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum EmbeddingInput<'a> {
    Single(&'a str),
    Batch(&'a [String]),
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: EmbeddingInput<'a>,
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}
