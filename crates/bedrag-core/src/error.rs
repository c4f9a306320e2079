//! Error types for bedrag

use thiserror::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the RAG pipeline and its service adapters
#[derive(Error, Debug)]
pub enum Error {
    #[error("Embedding service error: {0}")]
    EmbeddingService(String),

    #[error("Dimension mismatch: store holds {expected}-dimensional vectors, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Generation service error: {0}")]
    GenerationService(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("Provider API error: {0}")]
    ProviderApi(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Throttled by provider: {0}")]
    Throttled(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Wrap any failure as an embedding service error
    pub fn embedding(err: impl std::fmt::Display) -> Self {
        Self::EmbeddingService(err.to_string())
    }

    /// Wrap any failure as a generation service error
    pub fn generation(err: impl std::fmt::Display) -> Self {
        Self::GenerationService(err.to_string())
    }

    /// Transient transport failures that are worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout(_) | Self::Throttled(_) | Self::ServiceUnavailable(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
