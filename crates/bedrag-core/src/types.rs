//! Common types used across the RAG pipeline

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Fixed-length embedding produced by an [`Embedder`](crate::Embedder)
pub type EmbeddingVector = Vec<f32>;

/// Scalar metadata value attached to a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Integer(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(v) => write!(f, "{}", v),
            Scalar::Integer(v) => write!(f, "{}", v),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::String(v) => write!(f, "{}", v),
        }
    }
}

/// A text document stored in a vector store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Scalar>,
}

impl Document {
    /// Create a document without metadata
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A document paired with its similarity to a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub document: Document,
    pub score: f32,
}

/// Documents ordered by descending similarity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub hits: Vec<ScoredDocument>,
}

impl RetrievalResult {
    pub fn new(hits: Vec<ScoredDocument>) -> Self {
        Self { hits }
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Highest-scoring hit, if any
    pub fn top(&self) -> Option<&ScoredDocument> {
        self.hits.first()
    }

    /// Document texts in rank order
    pub fn texts(&self) -> Vec<&str> {
        self.hits.iter().map(|hit| hit.document.text.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoredDocument> {
        self.hits.iter()
    }
}

/// A fully rendered generation prompt
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Prompt(String);

impl Prompt {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.0.contains(needle)
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Token accounting reported by the generation service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Result of a text generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
    pub model_id: String,
    pub usage: Option<TokenUsage>,
    pub latency: Option<Duration>,
}

impl GenerationResult {
    pub fn new(text: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model_id: model_id.into(),
            usage: None,
            latency: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_metadata_builder() {
        let doc = Document::new("doc_0", "Paris is the capital of France.")
            .with_metadata("source", "atlas")
            .with_metadata("page", 12i64)
            .with_metadata("verified", true);

        assert_eq!(doc.metadata.len(), 3);
        assert_eq!(doc.metadata.get("source"), Some(&Scalar::from("atlas")));
        assert_eq!(doc.metadata.get("page").map(|v| v.to_string()), Some("12".to_string()));
    }

    #[test]
    fn test_scalar_untagged_json() {
        let doc = Document::new("a", "text")
            .with_metadata("n", 3i64)
            .with_metadata("ratio", 0.5f64)
            .with_metadata("tag", "x");

        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(
            json,
            r#"{"id":"a","text":"text","metadata":{"n":3,"ratio":0.5,"tag":"x"}}"#
        );

        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_retrieval_result_accessors() {
        let result = RetrievalResult::new(vec![
            ScoredDocument { document: Document::new("1", "first"), score: 0.9 },
            ScoredDocument { document: Document::new("2", "second"), score: 0.4 },
        ]);

        assert_eq!(result.len(), 2);
        assert_eq!(result.top().map(|h| h.document.id.as_str()), Some("1"));
        assert_eq!(result.texts(), vec!["first", "second"]);
        assert!(RetrievalResult::default().is_empty());
    }
}
