//! rag-ingest: document ingestion for retrieval-augmented generation
//!
//! Turns uploaded files (PDF, DOCX, XLSX/XLS, Markdown, text, CSV, JSON) into
//! normalized text, then into fixed-dimension embedding vectors from an
//! external HTTP embedding service. Batches report an outcome per document so
//! one bad file never sinks the rest.

pub mod config;
pub mod error;
pub mod extraction;
pub mod processing;
pub mod providers;
pub mod storage;
pub mod types;

pub use config::IngestConfig;
pub use error::{Error, Result};
pub use extraction::FormatExtractor;
pub use processing::IngestionPipeline;
pub use providers::{DashScopeEmbedder, EmbeddingProvider};
pub use types::{
    BatchReport, EmbeddingVector, ExtractedDocument, IngestFile, IngestionOutcome, OutcomeStatus,
};
