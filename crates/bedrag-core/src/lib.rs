//! Core traits and types for bedrag
//!
//! This crate defines the capability-facing interfaces of the RAG pipeline:
//! embedding services, generation services and vector stores, together with the
//! shared data model, the error type, cosine similarity and retry helpers.
//! Concrete adapters live in `bedrag-bedrock`; the pipeline lives in `bedrag-rag`.

pub mod embedder;
pub mod error;
pub mod generator;
pub mod logging;
pub mod retry;
pub mod similarity;
pub mod types;
pub mod vector_store;

pub use embedder::Embedder;
pub use error::{Error, Result};
pub use generator::{GenerationConfig, Generator};
pub use retry::{retry_with_backoff, RetryConfig};
pub use similarity::cosine_similarity;
pub use types::*;
pub use vector_store::VectorStore;
