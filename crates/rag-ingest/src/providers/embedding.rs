//! Embedding provider trait for generating text embeddings

use async_trait::async_trait;

use crate::error::Result;
use crate::types::EmbeddingVector;

/// Trait for generating text embeddings
///
/// Implementations:
/// - `DashScopeEmbedder`: DashScope text-embedding service over HTTP
///
/// Every successful call returns exactly one vector of [`dimensions`](Self::dimensions)
/// floats per input text, in input order.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single search query
    async fn embed_query(&self, text: &str) -> Result<EmbeddingVector>;

    /// Embed document texts, preserving order
    ///
    /// Default implementation calls `embed_query` sequentially.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed_query(text).await?);
        }
        Ok(embeddings)
    }

    /// Vector dimension (e.g., 1024 for text-embedding-v3)
    fn dimensions(&self) -> usize;

    /// Provider name for logging
    fn name(&self) -> &str;
}
