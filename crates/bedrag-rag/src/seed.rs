//! Sample documents for the demo knowledge base

use chrono::Utc;
use uuid::Uuid;

use bedrag_core::Document;

const SAMPLE_TEXTS: [&str; 10] = [
    "Amazon Bedrock is a fully managed service for foundation models.",
    "RAG systems combine retrieval and generation to improve responses.",
    "Embeddings are vector representations of text in high-dimensional spaces.",
    "Chroma is an efficient vector store for building AI applications.",
    "Foundation models can be fine-tuned for specific tasks and domains.",
    "Amazon Bedrock provides access to AI models from leading companies like Anthropic, AI21 Labs, and Amazon.",
    "RAG improves response accuracy by providing relevant context from stored knowledge.",
    "Embeddings enable searching for similar documents using cosine similarity.",
    "Claude is a language model developed by Anthropic available on Amazon Bedrock.",
    "RAG systems are especially useful for applications requiring domain-specific knowledge.",
];

/// The built-in knowledge base, ids `doc_0` through `doc_9`
pub fn sample_documents() -> Vec<Document> {
    SAMPLE_TEXTS
        .iter()
        .enumerate()
        .map(|(i, text)| Document::new(format!("doc_{}", i), *text).with_metadata("source", "sample"))
        .collect()
}

/// A document entered by the user, with a fresh id and the time it was added
pub fn user_document(text: &str) -> Document {
    Document::new(format!("user_{}", Uuid::new_v4()), text.trim())
        .with_metadata("source", "user")
        .with_metadata("added_at", Utc::now().to_rfc3339())
}
