//! Vector store trait

use async_trait::async_trait;

use crate::{Document, Result, RetrievalResult};

/// Trait for vector stores (in-memory, or backed by an external vector database)
///
/// This is the only contract the rest of the pipeline depends on.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert a document with its vector, replacing any entry with the same id
    async fn upsert(&self, document: Document, vector: Vec<f32>) -> Result<()>;

    /// Return the `k` documents most similar to `vector`, best first
    async fn query(&self, vector: &[f32], k: usize) -> Result<RetrievalResult>;

    /// Remove a document; absent ids are ignored
    async fn delete(&self, id: &str) -> Result<()>;

    /// Get a document by ID
    async fn get(&self, id: &str) -> Result<Option<Document>>;

    /// All stored documents in insertion order
    async fn documents(&self) -> Result<Vec<Document>>;

    /// Get the total number of documents
    async fn count(&self) -> Result<usize>;

    /// Clear all documents from the store
    async fn clear(&self) -> Result<()>;
}
