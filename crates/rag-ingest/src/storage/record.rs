//! Records handed to the document store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::types::{EmbeddingVector, ExtractedDocument, IngestFile, IngestionOutcome};

/// One row for the store's `documents` collection
///
/// `embedding` is a JSON-encoded float array; readers decode it with
/// [`parse_embedding`] before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Name the file was uploaded as
    pub source: String,
    /// Text the embedding was computed from
    pub content: String,
    /// Format, page count, parser info, content hash and ingestion time
    pub metadata: serde_json::Value,
    /// JSON array of floats
    pub embedding: String,
}

impl DocumentRecord {
    /// Build a record for one embedded text of a document
    pub fn new(
        source: &str,
        document: &ExtractedDocument,
        content: &str,
        vector: &EmbeddingVector,
        ingested_at: DateTime<Utc>,
    ) -> Result<Self> {
        let metadata = serde_json::json!({
            "format": document.format,
            "page_count": document.page_count,
            "info": document.info,
            "content_hash": hash_content(content),
            "ingested_at": ingested_at,
        });

        Ok(Self {
            source: source.to_string(),
            content: content.to_string(),
            metadata,
            embedding: serde_json::to_string(vector)?,
        })
    }

    /// Records for a successful outcome; other outcomes have nothing to store
    pub fn from_outcome(file: &IngestFile, outcome: &IngestionOutcome) -> Result<Vec<Self>> {
        let IngestionOutcome::Success { document, vectors } = outcome else {
            return Ok(Vec::new());
        };

        let source = file.display_name();
        let now = Utc::now();
        vectors
            .iter()
            .map(|vector| Self::new(&source, document, &document.text, vector, now))
            .collect()
    }

    /// Decoded embedding
    pub fn vector(&self) -> Result<EmbeddingVector> {
        parse_embedding(&self.embedding)
    }
}

/// Decode a stored JSON-encoded embedding
pub fn parse_embedding(raw: &str) -> Result<EmbeddingVector> {
    serde_json::from_str(raw).map_err(Error::from)
}

/// Hash content for deduplication
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
