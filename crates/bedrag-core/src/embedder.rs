//! Embedder trait

use async_trait::async_trait;

use crate::{EmbeddingVector, Result};

/// Trait for embedding services (e.g., Bedrock Titan, a local hasher, etc.)
///
/// Implementations perform one outbound call per invocation and fail with
/// [`Error::EmbeddingService`](crate::Error::EmbeddingService) when the call fails
/// or the service returns an empty vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<EmbeddingVector>;

    /// Identifier of the embedding model
    fn model_id(&self) -> &str;
}
