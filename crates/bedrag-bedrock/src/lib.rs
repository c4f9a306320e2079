//! Amazon Bedrock integration for bedrag
//!
//! This crate provides the Bedrock implementations of the `Embedder` and
//! `Generator` traits, the HTTP client they share, and foundation-model listing.

mod client;
mod config;
mod embedder;
mod generator;
mod models;

#[cfg(test)]
mod testing;

pub use client::BedrockClient;
pub use config::BedrockConfig;
pub use embedder::TitanEmbedder;
pub use generator::BedrockGenerator;
pub use models::{chat_models, Completion, FoundationModel, InvocationBody, ModelFamily};

// Re-export core types for convenience
pub use bedrag_core::{
    Embedder, Error, GenerationConfig, GenerationResult, Generator, Prompt, Result, RetryConfig,
};
