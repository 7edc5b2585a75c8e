//! Remote embedding API client
//!
//! Thin request/response wrapper around a hosted embedding endpoint. The
//! API returns pre-normalized vectors only at its native dimensionality;
//! anything smaller is normalized client-side so cosine similarity stays
//! accurate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{check_dimension, normalize, EmbeddingError, EmbeddingProvider};

/// Dimensionality at which the remote API already returns unit vectors
const NATIVE_DIMENSION: usize = 3072;

/// Embedding provider backed by a remote HTTP API
pub struct RemoteEmbeddingClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    dimension: usize,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
    dimension: usize,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl RemoteEmbeddingClient {
    pub fn new(
        endpoint: String,
        api_key: String,
        model: String,
        dimension: usize,
    ) -> Result<Self, EmbeddingError> {
        if api_key.is_empty() {
            return Err(EmbeddingError::Config {
                message: "api key must not be empty".to_string(),
            });
        }
        if dimension == 0 || dimension > NATIVE_DIMENSION {
            return Err(EmbeddingError::Config {
                message: format!(
                    "dimension must be between 1 and {NATIVE_DIMENSION}, got {dimension}"
                ),
            });
        }

        Ok(Self {
            http: reqwest::Client::new(),
            endpoint,
            api_key,
            model,
            dimension,
        })
    }

    async fn request(&self, input: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let request = EmbedRequest {
            model: &self.model,
            input,
            dimension: self.dimension,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: EmbedResponse = response.json().await?;

        let mut embeddings = parsed.embeddings;
        for embedding in &mut embeddings {
            check_dimension(embedding, self.dimension)?;
            // Native-dimension vectors arrive pre-normalized
            if self.dimension != NATIVE_DIMENSION {
                normalize(embedding);
            }
        }

        debug!(
            model = %self.model,
            count = embeddings.len(),
            dimension = self.dimension,
            "Generated embeddings"
        );

        Ok(embeddings)
    }
}

#[async_trait]
impl EmbeddingProvider for RemoteEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let input = [text.to_string()];
        let mut embeddings = self.request(&input).await?;
        embeddings.pop().ok_or(EmbeddingError::Api {
            status: 200,
            message: "API returned no embeddings".to_string(),
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let embeddings = self.request(texts).await?;
        if embeddings.len() != texts.len() {
            return Err(EmbeddingError::Api {
                status: 200,
                message: format!(
                    "API returned {} embeddings for {} inputs",
                    embeddings.len(),
                    texts.len()
                ),
            });
        }
        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.model
    }
}
