//! Top-K retrieval over a vector store

use std::sync::Arc;
use tracing::debug;

use bedrag_core::{Error, Result, RetrievalResult, VectorStore};

/// Retrieves the closest documents for a query vector.
///
/// When a similarity floor is set, hits scoring below it are dropped before
/// the result is truncated to `k`, so a low-scoring hit never takes a slot.
#[derive(Clone)]
pub struct Retriever {
    store: Arc<dyn VectorStore>,
    similarity_floor: Option<f32>,
}

impl Retriever {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self {
            store,
            similarity_floor: None,
        }
    }

    /// Drop hits whose score is below `floor`
    pub fn with_similarity_floor(mut self, floor: Option<f32>) -> Self {
        self.similarity_floor = floor;
        self
    }

    pub fn similarity_floor(&self) -> Option<f32> {
        self.similarity_floor
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    pub async fn retrieve(&self, query_vector: &[f32], k: usize) -> Result<RetrievalResult> {
        if k == 0 {
            return Err(Error::InvalidInput("k must be positive".to_string()));
        }

        let Some(floor) = self.similarity_floor else {
            return self.store.query(query_vector, k).await;
        };

        // Filtering before truncation needs the full ranking
        let total = self.store.count().await?;
        if total == 0 {
            return Ok(RetrievalResult::default());
        }
        let ranked = self.store.query(query_vector, total).await?;
        let candidates = ranked.len();

        let hits: Vec<_> = ranked
            .hits
            .into_iter()
            .filter(|hit| hit.score >= floor)
            .take(k)
            .collect();

        debug!(candidates, kept = hits.len(), floor, "applied similarity floor");
        Ok(RetrievalResult::new(hits))
    }
}
