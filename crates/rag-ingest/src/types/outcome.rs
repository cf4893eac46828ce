//! Per-document ingestion outcomes and batch reports

use std::fmt;

use crate::error::Error;

use super::document::{EmbeddingVector, ExtractedDocument, IngestFile};

/// Result of ingesting one file
#[derive(Debug)]
pub enum IngestionOutcome {
    /// Text extracted and embedded (no vectors when the text was empty)
    Success {
        document: ExtractedDocument,
        vectors: Vec<EmbeddingVector>,
    },
    /// Text extracted but embedding failed; the text can be re-embedded later
    PartialFailure {
        document: ExtractedDocument,
        error: Error,
    },
    /// Extraction failed, nothing recovered
    Failure { error: Error },
}

impl IngestionOutcome {
    /// Coarse status of this outcome
    pub fn status(&self) -> OutcomeStatus {
        match self {
            Self::Success { .. } => OutcomeStatus::Success,
            Self::PartialFailure { .. } => OutcomeStatus::PartialFailure,
            Self::Failure { .. } => OutcomeStatus::Failure,
        }
    }

    /// Extracted document, if extraction succeeded
    pub fn document(&self) -> Option<&ExtractedDocument> {
        match self {
            Self::Success { document, .. } | Self::PartialFailure { document, .. } => {
                Some(document)
            }
            Self::Failure { .. } => None,
        }
    }

    /// Error, if any stage failed
    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Success { .. } => None,
            Self::PartialFailure { error, .. } | Self::Failure { error } => Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Coarse outcome status for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeStatus {
    Success,
    PartialFailure,
    Failure,
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Success => "success",
            Self::PartialFailure => "partial failure",
            Self::Failure => "failure",
        };
        f.write_str(label)
    }
}

/// Outcome of one file within a batch
#[derive(Debug)]
pub struct FileReport {
    pub file: IngestFile,
    pub outcome: IngestionOutcome,
}

/// Per-file outcomes of a batch, in input order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    /// Number of files with the given status
    pub fn count(&self, status: OutcomeStatus) -> usize {
        self.files
            .iter()
            .filter(|r| r.outcome.status() == status)
            .count()
    }

    pub fn succeeded(&self) -> usize {
        self.count(OutcomeStatus::Success)
    }

    pub fn partially_failed(&self) -> usize {
        self.count(OutcomeStatus::PartialFailure)
    }

    pub fn failed(&self) -> usize {
        self.count(OutcomeStatus::Failure)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Statuses in input order
    pub fn statuses(&self) -> Vec<OutcomeStatus> {
        self.files.iter().map(|r| r.outcome.status()).collect()
    }
}
