//! Generator trait and generation settings

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{GenerationResult, Prompt, Result};

/// Sampling settings for text generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
        }
    }
}

/// Trait for text generation services
///
/// Fails with [`Error::GenerationService`](crate::Error::GenerationService) on
/// transport or auth failure, or when the response carries no completion.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Complete a prompt, producing at most `max_tokens` tokens
    async fn generate(&self, prompt: &Prompt, max_tokens: u32) -> Result<GenerationResult>;

    /// Identifier of the generation model
    fn model_id(&self) -> &str;
}
