//! Document indexing: embed documents and store them

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use bedrag_core::{Document, Embedder, Error, Result, VectorStore};

/// Result of an indexing operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexingResult {
    pub documents_indexed: usize,
    pub documents_failed: usize,
    pub errors: Vec<String>,
}

impl IndexingResult {
    pub fn is_complete(&self) -> bool {
        self.documents_failed == 0
    }

    fn merge(&mut self, other: IndexingResult) {
        self.documents_indexed += other.documents_indexed;
        self.documents_failed += other.documents_failed;
        self.errors.extend(other.errors);
    }
}

/// Embeds documents with an [`Embedder`] and upserts them into a [`VectorStore`]
#[derive(Clone)]
pub struct DocumentIndexer {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
}

impl DocumentIndexer {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    async fn try_index(&self, document: Document) -> Result<()> {
        if document.text.trim().is_empty() {
            return Err(Error::InvalidInput(format!(
                "Document {} has no text",
                document.id
            )));
        }
        let vector = self.embedder.embed(&document.text).await?;
        self.store.upsert(document, vector).await
    }

    /// Index a single document
    pub async fn index_document(&self, document: Document) -> IndexingResult {
        let id = document.id.clone();
        match self.try_index(document).await {
            Ok(()) => IndexingResult {
                documents_indexed: 1,
                ..Default::default()
            },
            Err(e) => {
                warn!(id = %id, error = %e, "failed to index document");
                IndexingResult {
                    documents_failed: 1,
                    errors: vec![format!("{}: {}", id, e)],
                    ..Default::default()
                }
            }
        }
    }

    /// Index documents in order; a failure does not stop the remaining ones
    pub async fn index_documents(&self, documents: Vec<Document>) -> IndexingResult {
        let mut result = IndexingResult::default();
        for document in documents {
            result.merge(self.index_document(document).await);
        }

        info!(
            indexed = result.documents_indexed,
            failed = result.documents_failed,
            embedding_model = self.embedder.model_id(),
            "indexing finished"
        );
        result
    }
}
