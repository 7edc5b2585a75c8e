//! Embedding provider boundary
//!
//! The deployment target stores memories as vectors; generating those
//! vectors is delegated to a remote embedding API behind the
//! [`EmbeddingProvider`] trait. The webhook core never calls this — it is
//! the interface contract for the surrounding system, shipped here so both
//! sides agree on it.
//!
//! Contract: returned vectors have exactly `dimension()` components, and
//! the provider is responsible for normalizing to unit length whenever the
//! underlying API does not already guarantee it. A dimensionality
//! disagreement is a provider error, never silently accepted.

mod remote;

pub use remote::RemoteEmbeddingClient;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from an embedding provider
#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Embedding provider misconfigured: {message}")]
    Config { message: String },

    #[error("Embedding request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Embedding API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// A source of text embeddings
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text into a vector of exactly `dimension()` components
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embed a batch of texts, preserving order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Number of components in every returned vector
    fn dimension(&self) -> usize;

    /// Short provider name for logging
    fn name(&self) -> &str;
}

/// Scale a vector to unit length in place. A zero vector is left untouched.
pub fn normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        return;
    }
    for component in vector.iter_mut() {
        *component /= norm;
    }
}

/// Check that a returned vector matches the requested dimensionality
pub(crate) fn check_dimension(vector: &[f32], expected: usize) -> Result<(), EmbeddingError> {
    if vector.len() != expected {
        return Err(EmbeddingError::DimensionMismatch {
            expected,
            actual: vector.len(),
        });
    }
    Ok(())
}
