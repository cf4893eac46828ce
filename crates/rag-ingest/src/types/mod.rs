//! Core types for the ingestion pipeline

pub mod document;
pub mod outcome;

pub use document::{dispatch_extension, DocumentFormat, EmbeddingVector, ExtractedDocument, IngestFile};
pub use outcome::{BatchReport, FileReport, IngestionOutcome, OutcomeStatus};
