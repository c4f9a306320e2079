//! Amazon Titan embedding adapter

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use bedrag_core::{Embedder, EmbeddingVector, Error, Result};

use crate::client::BedrockClient;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TitanEmbedRequest<'a> {
    input_text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TitanEmbedResponse {
    embedding: Vec<f32>,
    #[serde(default)]
    input_text_token_count: Option<u32>,
}

/// Embedder backed by a Titan embedding model on Bedrock
pub struct TitanEmbedder {
    client: Arc<BedrockClient>,
    model_id: String,
}

impl TitanEmbedder {
    /// Use the embedding model named in the client configuration
    pub fn new(client: Arc<BedrockClient>) -> Self {
        let model_id = client.config().embedding_model.clone();
        Self { client, model_id }
    }

    /// Use a specific embedding model
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }
}

#[async_trait]
impl Embedder for TitanEmbedder {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector> {
        let request = TitanEmbedRequest { input_text: text };
        let response: TitanEmbedResponse = self
            .client
            .invoke_model(&self.model_id, &request)
            .await
            .map_err(Error::embedding)?;

        if response.embedding.is_empty() {
            return Err(Error::EmbeddingService(format!(
                "{} returned an empty embedding",
                self.model_id
            )));
        }

        debug!(
            model_id = %self.model_id,
            dimension = response.embedding.len(),
            tokens = response.input_text_token_count,
            "embedded text"
        );
        Ok(response.embedding)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
