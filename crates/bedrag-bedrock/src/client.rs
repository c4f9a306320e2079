//! Bedrock HTTP client
//!
//! Thin JSON client over the Bedrock runtime (`/model/{id}/invoke`) and control
//! plane (`/foundation-models`) using bearer-token (API key) authentication.

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Instant;
use tokio::time::timeout;
use tracing::debug;
use url::Url;

use bedrag_core::{retry_with_backoff, Error, Result, RetryConfig};

use crate::config::BedrockConfig;
use crate::models::{chat_models, FoundationModel, ListFoundationModelsResponse};

/// Bedrock runtime and control-plane client
pub struct BedrockClient {
    config: BedrockConfig,
    client: Client,
    retry: RetryConfig,
}

impl BedrockClient {
    /// Create a new client from configuration
    pub fn new(config: BedrockConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            config,
            client,
            retry: RetryConfig::default(),
        })
    }

    /// Create a new client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = BedrockConfig::from_env()?;
        Self::new(config)
    }

    /// Override the retry policy for transient failures
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn config(&self) -> &BedrockConfig {
        &self.config
    }

    /// URL of the invoke endpoint for a model; the model id is percent-encoded
    pub fn invoke_url(&self, model_id: &str) -> Result<Url> {
        let mut url = Url::parse(&self.config.runtime_endpoint)
            .map_err(|e| Error::Configuration(format!("Invalid runtime endpoint: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Configuration("Runtime endpoint cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(["model", model_id, "invoke"]);
        Ok(url)
    }

    fn foundation_models_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.config.control_endpoint)
            .map_err(|e| Error::Configuration(format!("Invalid control endpoint: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Configuration("Control endpoint cannot be a base URL".to_string()))?
            .pop_if_empty()
            .push("foundation-models");
        Ok(url)
    }

    /// Invoke a model with a JSON body, retrying transient failures
    pub async fn invoke_model<B, R>(&self, model_id: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.invoke_url(model_id)?;
        let url = &url;
        retry_with_backoff(&self.retry, "invoke_model", move || {
            self.invoke_once(url, model_id, body)
        })
        .await
    }

    async fn invoke_once<B, R>(&self, url: &Url, model_id: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let started = Instant::now();
        let request = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send();

        let response = match timeout(self.config.timeout, request).await {
            Ok(result) => result.map_err(map_transport_error)?,
            Err(_) => {
                return Err(Error::Timeout(format!(
                    "invoke_model {} exceeded {:?}",
                    model_id, self.config.timeout
                )));
            }
        };

        let text = read_success_body(response).await?;
        debug!(
            model_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            bytes = text.len(),
            "invoke_model completed"
        );

        serde_json::from_str(&text).map_err(|e| {
            Error::Serialization(format!("Malformed response from {}: {}", model_id, e))
        })
    }

    /// List all foundation models visible to the account
    pub async fn list_foundation_models(&self) -> Result<Vec<FoundationModel>> {
        let url = self.foundation_models_url()?;
        let url = &url;
        retry_with_backoff(&self.retry, "list_foundation_models", move || self.list_once(url)).await
    }

    async fn list_once(&self, url: &Url) -> Result<Vec<FoundationModel>> {
        let request = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .bearer_auth(&self.config.api_key)
            .send();

        let response = match timeout(self.config.timeout, request).await {
            Ok(result) => result.map_err(map_transport_error)?,
            Err(_) => return Err(Error::Timeout("list_foundation_models timed out".to_string())),
        };

        let text = read_success_body(response).await?;
        let parsed: ListFoundationModelsResponse = serde_json::from_str(&text)?;
        debug!(models = parsed.model_summaries.len(), "listed foundation models");
        Ok(parsed.model_summaries)
    }

    /// List on-demand conversational models
    pub async fn list_chat_models(&self) -> Result<Vec<FoundationModel>> {
        Ok(chat_models(self.list_foundation_models().await?))
    }
}

async fn read_success_body(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    let error_type = response
        .headers()
        .get("x-amzn-errortype")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(':').next().unwrap_or(v).to_string());

    let text = response.text().await.map_err(map_transport_error)?;

    if !status.is_success() {
        return Err(error_from_status(status, error_type.as_deref(), &text));
    }
    Ok(text)
}

fn map_transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout(err.to_string())
    } else if err.is_decode() {
        Error::Serialization(err.to_string())
    } else {
        Error::Network(err.to_string())
    }
}

/// Map a non-success HTTP status to an error kind
pub(crate) fn error_from_status(status: StatusCode, error_type: Option<&str>, body: &str) -> Error {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("Message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string());

    let detail = match error_type {
        Some(kind) => format!("{} ({}): {}", status, kind, message),
        None => format!("{}: {}", status, message),
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Authentication(format!(
            "{}. Verify that the API key is valid and the account has access to this model",
            detail
        )),
        StatusCode::TOO_MANY_REQUESTS => Error::Throttled(detail),
        StatusCode::REQUEST_TIMEOUT => Error::Timeout(detail),
        s if s.is_server_error() => Error::ServiceUnavailable(detail),
        _ if error_type == Some("ValidationException") => Error::ProviderApi(format!(
            "{}. The model may require an inference profile or may not be available in this region",
            detail
        )),
        _ => Error::ProviderApi(detail),
    }
}
