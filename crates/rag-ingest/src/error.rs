//! Error types for the ingestion pipeline

use std::path::Path;

use thiserror::Error;

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ingestion errors
///
/// Legacy and unknown formats come back as degraded text, so there is no
/// "unsupported format" variant.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing credentials or invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// File could not be read, or a parser rejected its contents
    #[error("Failed to extract '{path}': {message}")]
    ExtractionIo { path: String, message: String },

    /// Embedding service answered with a non-success status
    #[error("Embedding API error (HTTP {status}): {body}")]
    EmbeddingApi { status: u16, body: String },

    /// Embedding service answered 2xx but the body is not usable
    #[error("Malformed embedding response: {0}")]
    EmbeddingResponse(String),

    /// Transport-level HTTP failure (connect, timeout, body read)
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an extraction error for a file
    pub fn extraction(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::ExtractionIo {
            path: path.as_ref().display().to_string(),
            message: message.into(),
        }
    }

    /// Create a malformed-response error
    pub fn embedding_response(message: impl Into<String>) -> Self {
        Self::EmbeddingResponse(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether this error came from the embedding stage
    pub fn is_embedding_error(&self) -> bool {
        matches!(
            self,
            Self::EmbeddingApi { .. } | Self::EmbeddingResponse(_) | Self::Http(_)
        )
    }

    /// Whether retrying the same request could plausibly succeed
    ///
    /// Transport failures, rate limiting and server-side errors are transient;
    /// everything else (auth, bad request, malformed body) is not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::EmbeddingApi { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
