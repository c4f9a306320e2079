//! In-memory vector store with optional JSON snapshots

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::RwLock;
use tracing::{debug, warn};

use bedrag_core::{
    cosine_similarity, Document, Error, Result, RetrievalResult, ScoredDocument, VectorStore,
};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    document: Document,
    vector: Vec<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    dimension: Option<usize>,
    #[serde(default)]
    embedding_model: Option<String>,
    saved_at: DateTime<Utc>,
    entries: Vec<Entry>,
}

/// Brute-force cosine store kept in insertion order.
///
/// All access goes through a single lock, so concurrent upserts and queries on
/// one instance are serialized.
#[derive(Default)]
pub struct InMemoryVectorStore {
    entries: RwLock<Vec<Entry>>,
    snapshot_model: Option<String>,
}

impl InMemoryVectorStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Dimensionality shared by every stored vector, `None` while empty
    pub fn dimension(&self) -> Result<Option<usize>> {
        let entries = self.read()?;
        Ok(entries.first().map(|e| e.vector.len()))
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<Entry>>> {
        self.entries
            .read()
            .map_err(|e| Error::Retrieval(format!("Lock error: {}", e)))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Vec<Entry>>> {
        self.entries
            .write()
            .map_err(|e| Error::Retrieval(format!("Lock error: {}", e)))
    }

    /// Embedding model recorded in the snapshot this store was loaded from
    pub fn snapshot_model(&self) -> Option<&str> {
        self.snapshot_model.as_deref()
    }

    /// Write every entry, in insertion order, to a JSON file tagged with the
    /// model that produced the vectors
    pub fn save_snapshot(&self, path: impl AsRef<Path>, embedding_model: &str) -> Result<()> {
        let entries = self.read()?;
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            dimension: entries.first().map(|e| e.vector.len()),
            embedding_model: Some(embedding_model.to_string()),
            saved_at: Utc::now(),
            entries: entries.clone(),
        };
        drop(entries);

        let content = serde_json::to_string_pretty(&snapshot)?;
        fs::write(path.as_ref(), content)?;
        debug!(path = %path.as_ref().display(), entries = snapshot.entries.len(), "saved snapshot");
        Ok(())
    }

    /// Rebuild a store from a snapshot written by [`save_snapshot`](Self::save_snapshot)
    pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(Error::Configuration(format!(
                "Unsupported snapshot version {} (expected {})",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }

        let expected = snapshot
            .dimension
            .or_else(|| snapshot.entries.first().map(|e| e.vector.len()));
        let mut seen = HashSet::new();
        for entry in &snapshot.entries {
            if let Some(expected) = expected {
                if entry.vector.len() != expected {
                    return Err(Error::DimensionMismatch {
                        expected,
                        actual: entry.vector.len(),
                    });
                }
            }
            if !seen.insert(entry.document.id.as_str()) {
                return Err(Error::InvalidInput(format!(
                    "Duplicate document id in snapshot: {}",
                    entry.document.id
                )));
            }
        }

        debug!(
            path = %path.as_ref().display(),
            entries = snapshot.entries.len(),
            saved_at = %snapshot.saved_at,
            "loaded snapshot"
        );
        Ok(Self {
            entries: RwLock::new(snapshot.entries),
            snapshot_model: snapshot.embedding_model,
        })
    }

    /// Load a snapshot whose vectors must come from `embedding_model`.
    ///
    /// Snapshots written before the model was recorded are accepted with a warning.
    pub fn load_snapshot_for(path: impl AsRef<Path>, embedding_model: &str) -> Result<Self> {
        let store = Self::load_snapshot(path.as_ref())?;
        match store.snapshot_model() {
            Some(model) if model != embedding_model => Err(Error::Configuration(format!(
                "Snapshot {} was built with embedding model {}, not {}",
                path.as_ref().display(),
                model,
                embedding_model
            ))),
            Some(_) => Ok(store),
            None => {
                warn!(path = %path.as_ref().display(), "snapshot does not record its embedding model");
                Ok(store)
            }
        }
    }
}

fn ensure_finite(vector: &[f32], owner: &str) -> Result<()> {
    match vector.iter().position(|x| !x.is_finite()) {
        Some(i) => Err(Error::InvalidInput(format!(
            "Non-finite component {} at index {} in vector for {}",
            vector[i], i, owner
        ))),
        None => Ok(()),
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, document: Document, vector: Vec<f32>) -> Result<()> {
        if vector.is_empty() {
            return Err(Error::InvalidInput(format!(
                "Empty vector for document {}",
                document.id
            )));
        }
        ensure_finite(&vector, &document.id)?;

        let mut entries = self.write()?;
        if let Some(first) = entries.first() {
            if first.vector.len() != vector.len() {
                return Err(Error::DimensionMismatch {
                    expected: first.vector.len(),
                    actual: vector.len(),
                });
            }
        }

        // A replaced document keeps its original insertion rank
        match entries.iter_mut().find(|e| e.document.id == document.id) {
            Some(existing) => {
                existing.document = document;
                existing.vector = vector;
            }
            None => entries.push(Entry { document, vector }),
        }
        Ok(())
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<RetrievalResult> {
        if k == 0 {
            return Err(Error::InvalidInput("k must be positive".to_string()));
        }
        ensure_finite(vector, "query")?;

        let entries = self.read()?;
        let Some(first) = entries.first() else {
            return Ok(RetrievalResult::default());
        };
        if first.vector.len() != vector.len() {
            return Err(Error::DimensionMismatch {
                expected: first.vector.len(),
                actual: vector.len(),
            });
        }

        let mut scored: Vec<(f32, &Entry)> = entries
            .iter()
            .map(|entry| (cosine_similarity(vector, &entry.vector), entry))
            .collect();

        // Stable sort: equal scores stay in insertion order
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        let hits = scored
            .into_iter()
            .take(k)
            .map(|(score, entry)| ScoredDocument {
                document: entry.document.clone(),
                score,
            })
            .collect();

        Ok(RetrievalResult::new(hits))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut entries = self.write()?;
        entries.retain(|e| e.document.id != id);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Document>> {
        let entries = self.read()?;
        Ok(entries
            .iter()
            .find(|e| e.document.id == id)
            .map(|e| e.document.clone()))
    }

    async fn documents(&self) -> Result<Vec<Document>> {
        let entries = self.read()?;
        Ok(entries.iter().map(|e| e.document.clone()).collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    async fn clear(&self) -> Result<()> {
        self.write()?.clear();
        Ok(())
    }
}
