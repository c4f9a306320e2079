//! Bedrock configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::time::Duration;
use url::Url;

use bedrag_core::{Error, Result};

/// Configuration for the Bedrock runtime and control-plane clients
#[derive(Clone, Serialize, Deserialize)]
pub struct BedrockConfig {
    #[serde(skip_serializing, default)]
    pub api_key: String,
    pub region: String,
    pub runtime_endpoint: String,
    pub control_endpoint: String,
    pub embedding_model: String,
    pub text_model: String,
    pub timeout: Duration,
}

impl BedrockConfig {
    pub const DEFAULT_REGION: &'static str = "us-east-1";
    pub const DEFAULT_EMBEDDING_MODEL: &'static str = "amazon.titan-embed-text-v1";
    pub const DEFAULT_TEXT_MODEL: &'static str = "anthropic.claude-3-haiku-20240307-v1:0";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

    /// Create configuration from environment variables (and `.env`, if present)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("AWS_BEARER_TOKEN_BEDROCK")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                Error::Configuration(
                    "AWS_BEARER_TOKEN_BEDROCK environment variable not found".to_string(),
                )
            })?;

        let region = lookup("AWS_REGION")
            .or_else(|| lookup("AWS_DEFAULT_REGION"))
            .unwrap_or_else(|| Self::DEFAULT_REGION.to_string());

        let mut config = Self::new(api_key, region);

        if let Some(endpoint) = lookup("BEDROCK_RUNTIME_ENDPOINT") {
            config.runtime_endpoint = endpoint;
        }
        if let Some(endpoint) = lookup("BEDROCK_ENDPOINT") {
            config.control_endpoint = endpoint;
        }
        if let Some(model) = lookup("BEDROCK_EMBEDDING_MODEL") {
            config.embedding_model = model;
        }
        if let Some(model) = lookup("BEDROCK_TEXT_MODEL") {
            config.text_model = model;
        }
        if let Some(secs) = lookup("BEDROCK_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                Error::Configuration(format!("BEDROCK_TIMEOUT_SECS is not a number: {}", secs))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Create configuration with explicit values and default endpoints/models
    pub fn new(api_key: String, region: String) -> Self {
        Self {
            api_key,
            runtime_endpoint: format!("https://bedrock-runtime.{}.amazonaws.com", region),
            control_endpoint: format!("https://bedrock.{}.amazonaws.com", region),
            region,
            embedding_model: Self::DEFAULT_EMBEDDING_MODEL.to_string(),
            text_model: Self::DEFAULT_TEXT_MODEL.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set the text generation model
    pub fn with_text_model(mut self, model_id: impl Into<String>) -> Self {
        self.text_model = model_id.into();
        self
    }

    fn validate(&self) -> Result<()> {
        for (name, endpoint) in [
            ("runtime", &self.runtime_endpoint),
            ("control", &self.control_endpoint),
        ] {
            Url::parse(endpoint).map_err(|e| {
                Error::Configuration(format!("Invalid {} endpoint {}: {}", name, endpoint, e))
            })?;
        }
        if self.timeout.is_zero() {
            return Err(Error::Configuration("Request timeout must be positive".to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for BedrockConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BedrockConfig")
            .field("api_key", &"<redacted>")
            .field("region", &self.region)
            .field("runtime_endpoint", &self.runtime_endpoint)
            .field("control_endpoint", &self.control_endpoint)
            .field("embedding_model", &self.embedding_model)
            .field("text_model", &self.text_model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = BedrockConfig::from_lookup(lookup(&[("AWS_BEARER_TOKEN_BEDROCK", "tok")])).unwrap();

        assert_eq!(config.api_key, "tok");
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.runtime_endpoint, "https://bedrock-runtime.us-east-1.amazonaws.com");
        assert_eq!(config.control_endpoint, "https://bedrock.us-east-1.amazonaws.com");
        assert_eq!(config.embedding_model, "amazon.titan-embed-text-v1");
        assert_eq!(config.text_model, "anthropic.claude-3-haiku-20240307-v1:0");
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_overrides() {
        let config = BedrockConfig::from_lookup(lookup(&[
            ("AWS_BEARER_TOKEN_BEDROCK", "tok"),
            ("AWS_DEFAULT_REGION", "eu-west-3"),
            ("BEDROCK_TEXT_MODEL", "meta.llama3-8b-instruct-v1:0"),
            ("BEDROCK_RUNTIME_ENDPOINT", "http://localhost:4566"),
            ("BEDROCK_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.region, "eu-west-3");
        assert_eq!(config.control_endpoint, "https://bedrock.eu-west-3.amazonaws.com");
        assert_eq!(config.runtime_endpoint, "http://localhost:4566");
        assert_eq!(config.text_model, "meta.llama3-8b-instruct-v1:0");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_region_precedence() {
        let config = BedrockConfig::from_lookup(lookup(&[
            ("AWS_BEARER_TOKEN_BEDROCK", "tok"),
            ("AWS_REGION", "us-west-2"),
            ("AWS_DEFAULT_REGION", "eu-west-3"),
        ]))
        .unwrap();
        assert_eq!(config.region, "us-west-2");
    }

    #[test]
    fn test_missing_api_key() {
        let err = BedrockConfig::from_lookup(lookup(&[("AWS_REGION", "us-east-1")])).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let err = BedrockConfig::from_lookup(lookup(&[("AWS_BEARER_TOKEN_BEDROCK", "  ")])).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_invalid_values() {
        let err = BedrockConfig::from_lookup(lookup(&[
            ("AWS_BEARER_TOKEN_BEDROCK", "tok"),
            ("BEDROCK_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let err = BedrockConfig::from_lookup(lookup(&[
            ("AWS_BEARER_TOKEN_BEDROCK", "tok"),
            ("BEDROCK_ENDPOINT", "not a url"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = BedrockConfig::new("super-secret".to_string(), "us-east-1".to_string());
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
