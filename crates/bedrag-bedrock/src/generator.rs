//! Text generation adapter for Bedrock-hosted models

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use bedrag_core::{Error, GenerationConfig, GenerationResult, Generator, Prompt, Result};

use crate::client::BedrockClient;
use crate::models::ModelFamily;

/// Generator that invokes a Bedrock text model in its native dialect
pub struct BedrockGenerator {
    client: Arc<BedrockClient>,
    model_id: String,
    family: ModelFamily,
    config: GenerationConfig,
}

impl BedrockGenerator {
    /// Use the text model named in the client configuration
    pub fn new(client: Arc<BedrockClient>) -> Result<Self> {
        let model_id = client.config().text_model.clone();
        Self::for_model(client, model_id)
    }

    /// Use a specific text model; fails for models with no known dialect
    pub fn for_model(client: Arc<BedrockClient>, model_id: impl Into<String>) -> Result<Self> {
        let model_id = model_id.into();
        let family = ModelFamily::for_model(&model_id)?;
        Ok(Self {
            client,
            model_id,
            family,
            config: GenerationConfig::default(),
        })
    }

    /// Override sampling settings
    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn family(&self) -> ModelFamily {
        self.family
    }
}

#[async_trait]
impl Generator for BedrockGenerator {
    async fn generate(&self, prompt: &Prompt, max_tokens: u32) -> Result<GenerationResult> {
        if max_tokens == 0 {
            return Err(Error::InvalidInput("max_tokens must be positive".to_string()));
        }

        let body = self.family.request_body(prompt.as_str(), max_tokens, &self.config);
        let started = Instant::now();
        let response: Value = self
            .client
            .invoke_model(&self.model_id, &body)
            .await
            .map_err(Error::generation)?;
        let latency = started.elapsed();

        let completion = self.family.parse_completion(&response)?;
        debug!(
            model_id = %self.model_id,
            latency_ms = latency.as_millis() as u64,
            chars = completion.text.len(),
            "generated completion"
        );

        Ok(GenerationResult {
            text: completion.text,
            model_id: self.model_id.clone(),
            usage: completion.usage,
            latency: Some(latency),
        })
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
