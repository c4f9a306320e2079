//! RAG (Retrieval-Augmented Generation) pipeline for bedrag
//!
//! This crate provides the in-memory vector store, the retriever, prompt
//! building, document indexing and the pipeline that ties them to an embedder
//! and a generator. It also ships an offline hash embedder and the sample
//! knowledge base used by the demo.

mod cache;
mod hash_embedder;
mod indexer;
mod pipeline;
mod prompt;
mod retriever;
mod seed;
mod vector_store;

#[cfg(test)]
mod testing;

pub use cache::CachedEmbedder;
pub use hash_embedder::{HashEmbedder, DEFAULT_HASH_DIMENSION};
pub use indexer::{DocumentIndexer, IndexingResult};
pub use pipeline::{Answer, Comparison, PipelineState, RagConfig, RagPipeline};
pub use prompt::{PromptBuilder, DEFAULT_ANSWER_CUE, DEFAULT_PREAMBLE};
pub use retriever::Retriever;
pub use seed::{sample_documents, user_document};
pub use vector_store::InMemoryVectorStore;

// Re-export core types for convenience
pub use bedrag_core::{
    Document, Embedder, Error, GenerationResult, Generator, Prompt, Result, RetrievalResult,
    ScoredDocument, VectorStore,
};
