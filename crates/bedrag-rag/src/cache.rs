//! Memoizing embedder wrapper

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use bedrag_core::{Embedder, EmbeddingVector, Result};

/// Caches embeddings by exact text so repeated queries skip the service call.
///
/// Failures are not cached.
pub struct CachedEmbedder<E> {
    inner: E,
    cache: RwLock<HashMap<String, EmbeddingVector>>,
}

impl<E: Embedder> CachedEmbedder<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Number of cached texts
    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.read().await.is_empty()
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }
}

#[async_trait]
impl<E: Embedder> Embedder for CachedEmbedder<E> {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector> {
        if let Some(hit) = self.cache.read().await.get(text) {
            debug!(chars = text.len(), "embedding cache hit");
            return Ok(hit.clone());
        }

        let vector = self.inner.embed(text).await?;
        self.cache
            .write()
            .await
            .insert(text.to_string(), vector.clone());
        Ok(vector)
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }
}
