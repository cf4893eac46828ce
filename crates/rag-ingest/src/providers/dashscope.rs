//! DashScope text-embedding provider
//!
//! One HTTP call per text: `{ model, input: { texts: [text] }, parameters }`
//! answered with `output.embeddings[0].embedding`.

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::time::sleep;

use crate::config::{EmbeddingConfig, TextType};
use crate::error::{Error, Result};
use crate::types::EmbeddingVector;

use super::embedding::EmbeddingProvider;
use super::retry::{policy_from_config, RetryPolicy};

/// DashScope embedding provider
///
/// Holds only immutable configuration, so one instance can be shared across
/// concurrent ingestions.
pub struct DashScopeEmbedder {
    client: Client,
    config: EmbeddingConfig,
    api_key: String,
    retry: Arc<dyn RetryPolicy>,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: EmbedInput<'a>,
    parameters: EmbedParameters,
}

#[derive(Serialize)]
struct EmbedInput<'a> {
    texts: [&'a str; 1],
}

#[derive(Serialize)]
struct EmbedParameters {
    text_type: &'static str,
    dimensions: usize,
}

#[derive(Deserialize)]
struct EmbedResponse {
    output: Option<EmbedOutput>,
}

#[derive(Deserialize)]
struct EmbedOutput {
    #[serde(default)]
    embeddings: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}

impl DashScopeEmbedder {
    /// Create a new embedder
    ///
    /// Fails with [`Error::Configuration`] when no API key can be resolved;
    /// nothing touches the network before that check.
    pub fn new(config: EmbeddingConfig) -> Result<Self> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            Error::configuration(format!(
                "no embedding API key: set embeddings.api_key or the {} environment variable",
                config.api_key_env
            ))
        })?;

        let client = Client::builder()
            .timeout(config.timeout())
            .pool_max_idle_per_host(5)
            .build()?;

        let retry = policy_from_config(&config.retry);

        tracing::debug!(
            "Embedding client ready: model={}, dimensions={}, batch_size={}",
            config.model,
            config.dimensions,
            config.batch_size
        );

        Ok(Self {
            client,
            config,
            api_key,
            retry,
        })
    }

    /// Replace the retry policy taken from the config
    pub fn with_retry_policy(mut self, policy: impl RetryPolicy + 'static) -> Self {
        self.retry = Arc::new(policy);
        self
    }

    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }

    /// One embedding call, no retries
    async fn request_embedding(&self, text: &str, text_type: TextType) -> Result<EmbeddingVector> {
        let request = EmbedRequest {
            model: &self.config.model,
            input: EmbedInput { texts: [text] },
            parameters: EmbedParameters {
                text_type: text_type.as_str(),
                dimensions: self.config.dimensions,
            },
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::EmbeddingApi {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        self.parse_embedding(&body)
    }

    /// Pull `output.embeddings[0].embedding` out of a success body
    fn parse_embedding(&self, body: &str) -> Result<EmbeddingVector> {
        let parsed: EmbedResponse = serde_json::from_str(body)
            .map_err(|e| Error::embedding_response(format!("unexpected body: {}", e)))?;

        let embedding = parsed
            .output
            .and_then(|o| o.embeddings.into_iter().next())
            .map(|item| item.embedding)
            .ok_or_else(|| Error::embedding_response("missing output.embeddings[0].embedding"))?;

        if embedding.len() != self.config.dimensions {
            return Err(Error::embedding_response(format!(
                "expected {} dimensions, got {}",
                self.config.dimensions,
                embedding.len()
            )));
        }

        Ok(embedding)
    }

    /// One embedding under the retry policy
    async fn embed_one(&self, text: &str, text_type: TextType) -> Result<EmbeddingVector> {
        let mut attempt = 0;
        loop {
            match self.request_embedding(text, text_type).await {
                Ok(embedding) => return Ok(embedding),
                Err(e) => match self.retry.next_delay(attempt, &e) {
                    Some(delay) => {
                        tracing::warn!(
                            "Embedding request failed (attempt {}): {}, retrying in {:?}",
                            attempt + 1,
                            e,
                            delay
                        );
                        sleep(delay).await;
                        attempt += 1;
                    }
                    None => return Err(e),
                },
            }
        }
    }
}

#[async_trait]
impl EmbeddingProvider for DashScopeEmbedder {
    async fn embed_query(&self, text: &str) -> Result<EmbeddingVector> {
        self.embed_one(text, TextType::Query).await
    }

    /// Batches run one after another; texts inside a batch are embedded concurrently
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>> {
        let batch_size = self.config.batch_size.max(1);
        let text_type = self.config.document_text_type;
        let mut embeddings = Vec::with_capacity(texts.len());

        for (index, batch) in texts.chunks(batch_size).enumerate() {
            tracing::debug!(
                "Embedding batch {} ({} texts) with {}",
                index + 1,
                batch.len(),
                self.config.model
            );

            // join_all yields results in submission order, not completion order
            let results = join_all(batch.iter().map(|t| self.embed_one(t, text_type))).await;
            for result in results {
                embeddings.push(result?);
            }
        }

        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn name(&self) -> &str {
        "dashscope"
    }
}
