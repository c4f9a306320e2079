//! Model families and their request/response dialects
//!
//! Each text model hosted on Bedrock speaks the native body format of its
//! vendor. [`ModelFamily`] maps a model id to that format, renders invocation
//! bodies and extracts the completion from responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use bedrag_core::{Error, GenerationConfig, Result, TokenUsage};

const ANTHROPIC_BEDROCK_VERSION: &str = "bedrock-2023-05-31";

/// Models that only run through inference profiles, not on-demand invocation
const INFERENCE_PROFILE_ONLY: &[&str] = &["anthropic.claude-sonnet-4", "anthropic.claude-opus-4"];

/// Request/response dialect of a text generation model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelFamily {
    /// Anthropic Claude 3 and later (messages API)
    AnthropicMessages,
    /// Anthropic Claude v1/v2/instant (Human/Assistant text completion)
    AnthropicText,
    /// Amazon Titan text models
    Titan,
    /// Meta Llama
    Llama,
    /// Mistral and Mixtral
    Mistral,
}

impl ModelFamily {
    /// Detect the family from a Bedrock model id. Embedding and image models
    /// have no family.
    pub fn detect(model_id: &str) -> Option<ModelFamily> {
        let id = model_id.to_lowercase();

        if id.contains("embed") || id.contains("image") {
            return None;
        }
        if id.contains("claude") {
            if id.contains("claude-v") || id.contains("claude-instant") {
                return Some(ModelFamily::AnthropicText);
            }
            return Some(ModelFamily::AnthropicMessages);
        }
        if id.contains("titan") {
            return Some(ModelFamily::Titan);
        }
        if id.contains("llama") {
            return Some(ModelFamily::Llama);
        }
        if id.contains("mistral") || id.contains("mixtral") {
            return Some(ModelFamily::Mistral);
        }
        None
    }

    /// Like [`detect`](Self::detect), but unknown ids are a configuration error
    pub fn for_model(model_id: &str) -> Result<ModelFamily> {
        Self::detect(model_id).ok_or_else(|| {
            Error::Configuration(format!("Model not supported for text generation: {}", model_id))
        })
    }

    /// Build the invocation body for a prompt
    pub fn request_body(
        &self,
        prompt: &str,
        max_tokens: u32,
        config: &GenerationConfig,
    ) -> InvocationBody {
        match self {
            ModelFamily::AnthropicMessages => InvocationBody::AnthropicMessages(MessagesRequest {
                anthropic_version: ANTHROPIC_BEDROCK_VERSION,
                max_tokens,
                messages: vec![ChatMessage {
                    role: "user",
                    content: prompt.to_string(),
                }],
                temperature: config.temperature,
                top_p: config.top_p,
            }),
            ModelFamily::AnthropicText => InvocationBody::AnthropicText(AnthropicTextRequest {
                prompt: format!("\n\nHuman: {}\n\nAssistant:", prompt),
                max_tokens_to_sample: max_tokens,
                temperature: config.temperature,
                top_p: config.top_p,
            }),
            ModelFamily::Titan => InvocationBody::Titan(TitanTextRequest {
                input_text: prompt.to_string(),
                text_generation_config: TitanTextConfig {
                    max_token_count: max_tokens,
                    temperature: config.temperature,
                    top_p: config.top_p,
                },
            }),
            ModelFamily::Llama => InvocationBody::Llama(LlamaRequest {
                prompt: instruction_prompt(prompt),
                max_gen_len: max_tokens,
                temperature: config.temperature,
                top_p: config.top_p,
            }),
            ModelFamily::Mistral => InvocationBody::Mistral(MistralRequest {
                prompt: instruction_prompt(prompt),
                max_tokens,
                temperature: config.temperature,
                top_p: config.top_p,
            }),
        }
    }

    /// JSON pointer to the completion text in a response body
    fn completion_pointer(&self) -> &'static str {
        match self {
            ModelFamily::AnthropicMessages => "/content/0/text",
            ModelFamily::AnthropicText => "/completion",
            ModelFamily::Titan => "/results/0/outputText",
            ModelFamily::Llama => "/generation",
            ModelFamily::Mistral => "/outputs/0/text",
        }
    }

    /// JSON pointers to input/output token counts, where the family reports them
    fn usage_pointers(&self) -> Option<(&'static str, &'static str)> {
        match self {
            ModelFamily::AnthropicMessages => Some(("/usage/input_tokens", "/usage/output_tokens")),
            ModelFamily::Titan => Some(("/inputTextTokenCount", "/results/0/tokenCount")),
            ModelFamily::Llama => Some(("/prompt_token_count", "/generation_token_count")),
            ModelFamily::AnthropicText | ModelFamily::Mistral => None,
        }
    }

    /// Extract the completion from a response body
    pub fn parse_completion(&self, body: &Value) -> Result<Completion> {
        let pointer = self.completion_pointer();
        let text = body
            .pointer(pointer)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::GenerationService(format!("Response has no completion at {}", pointer))
            })?;

        let usage = self.usage_pointers().and_then(|(input, output)| {
            let count = |p: &str| body.pointer(p).and_then(Value::as_u64).map(|n| n as u32);
            Some(TokenUsage {
                input_tokens: count(input)?,
                output_tokens: count(output)?,
            })
        });

        Ok(Completion {
            text: text.trim().to_string(),
            usage,
        })
    }
}

fn instruction_prompt(prompt: &str) -> String {
    format!("<s>[INST] {} [/INST]", prompt)
}

/// Completion text extracted from a response
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

/// A serializable invocation body for any supported family
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum InvocationBody {
    AnthropicMessages(MessagesRequest),
    AnthropicText(AnthropicTextRequest),
    Titan(TitanTextRequest),
    Llama(LlamaRequest),
    Mistral(MistralRequest),
}

#[derive(Debug, Serialize)]
pub struct MessagesRequest {
    anthropic_version: &'static str,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
pub struct AnthropicTextRequest {
    prompt: String,
    max_tokens_to_sample: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanTextRequest {
    input_text: String,
    text_generation_config: TitanTextConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TitanTextConfig {
    max_token_count: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
pub struct LlamaRequest {
    prompt: String,
    max_gen_len: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
pub struct MistralRequest {
    prompt: String,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

/// Summary of a foundation model from the Bedrock control plane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundationModel {
    pub model_id: String,
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub provider_name: String,
    #[serde(default)]
    pub inference_types_supported: Vec<String>,
}

impl FoundationModel {
    /// Whether the model can be invoked without an inference profile
    pub fn supports_on_demand(&self) -> bool {
        self.inference_types_supported.is_empty()
            || self.inference_types_supported.iter().any(|t| t == "ON_DEMAND")
    }

    /// Conversational model usable with [`ModelFamily`] and on-demand invocation
    pub fn is_chat_model(&self) -> bool {
        let id = self.model_id.to_lowercase();
        ModelFamily::detect(&id).is_some()
            && !INFERENCE_PROFILE_ONLY.iter().any(|excluded| id.contains(excluded))
            && self.supports_on_demand()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListFoundationModelsResponse {
    #[serde(default)]
    pub model_summaries: Vec<FoundationModel>,
}

/// Keep the on-demand conversational models, preserving listing order
pub fn chat_models(models: Vec<FoundationModel>) -> Vec<FoundationModel> {
    models.into_iter().filter(FoundationModel::is_chat_model).collect()
}
