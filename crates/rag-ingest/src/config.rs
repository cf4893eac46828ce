//! Configuration for the ingestion pipeline

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Default embedding endpoint (DashScope text-embedding service)
pub const DEFAULT_EMBEDDING_ENDPOINT: &str =
    "https://dashscope.aliyuncs.com/api/v1/services/embeddings/text-embedding/text-embedding";

/// Environment variable consulted when no API key is configured explicitly
pub const DEFAULT_API_KEY_ENV: &str = "DASHSCOPE_API_KEY";

/// Main ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IngestConfig {
    /// Embedding service configuration
    #[serde(default)]
    pub embeddings: EmbeddingConfig,
    /// Text extraction configuration
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Batch processing configuration
    #[serde(default)]
    pub processing: ProcessingConfig,
}

impl IngestConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw).map_err(|e| match e {
            Error::Configuration(msg) => {
                Error::configuration(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| Error::configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.embeddings.dimensions == 0 {
            return Err(Error::configuration("embeddings.dimensions must be > 0"));
        }
        if self.embeddings.batch_size == 0 {
            return Err(Error::configuration("embeddings.batch_size must be > 0"));
        }
        if self.processing.parallel_files == 0 {
            return Err(Error::configuration("processing.parallel_files must be > 0"));
        }
        Ok(())
    }
}

/// Usage hint sent to the embedding service alongside each text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextType {
    /// Text is a search query
    #[default]
    Query,
    /// Text is a document to be indexed
    Document,
}

impl TextType {
    /// Wire value for the `text_type` parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Document => "document",
        }
    }
}

/// Embedding service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// API key; when absent, read from `api_key_env`
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,
    /// Vector dimension requested from (and enforced on) the service
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
    /// Texts per batch; calls inside a batch run concurrently
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Usage hint for texts passed to `embed_documents`
    #[serde(default)]
    pub document_text_type: TextType,
    /// Retry policy for failed calls
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_api_key_env() -> String { DEFAULT_API_KEY_ENV.to_string() }
fn default_endpoint() -> String { DEFAULT_EMBEDDING_ENDPOINT.to_string() }
fn default_model() -> String { "text-embedding-v3".to_string() }
fn default_dimensions() -> usize { 1024 }
fn default_batch_size() -> usize { 1 }
fn default_timeout_secs() -> u64 { 60 }

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_api_key_env(),
            endpoint: default_endpoint(),
            model: default_model(),
            dimensions: default_dimensions(),
            batch_size: default_batch_size(),
            timeout_secs: default_timeout_secs(),
            document_text_type: TextType::Query,
            retry: RetryConfig::default(),
        }
    }
}

impl EmbeddingConfig {
    /// Resolve the API key: explicit value first, then the environment
    ///
    /// Blank values count as missing.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Retry configuration for the embedding client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt (0 = never retry)
    #[serde(default)]
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Upper bound on any single delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_base_delay_ms() -> u64 { 500 }
fn default_max_delay_ms() -> u64 { 30_000 }

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

/// Text extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Time allowed for pdf-extract before falling back to the raw content scan
    #[serde(default = "default_pdf_timeout_secs")]
    pub pdf_timeout_secs: u64,
    /// pdf-extract threads allowed at once, timed-out ones included
    #[serde(default = "default_pdf_max_workers")]
    pub pdf_max_workers: usize,
}

fn default_pdf_timeout_secs() -> u64 { 60 }
fn default_pdf_max_workers() -> usize { crate::extraction::DEFAULT_PDF_WORKERS }

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            pdf_timeout_secs: default_pdf_timeout_secs(),
            pdf_max_workers: default_pdf_max_workers(),
        }
    }
}

impl ExtractionConfig {
    /// PDF text extraction timeout
    pub fn pdf_timeout(&self) -> Duration {
        Duration::from_secs(self.pdf_timeout_secs)
    }
}

/// Batch processing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Files ingested concurrently within one batch (default: 1, sequential)
    #[serde(default = "default_parallel_files")]
    pub parallel_files: usize,
}

fn default_parallel_files() -> usize { 1 }

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            parallel_files: default_parallel_files(),
        }
    }
}
