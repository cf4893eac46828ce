//! Extraction → embedding orchestration with per-document error containment

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;

use crate::config::IngestConfig;
use crate::error::{Error, Result};
use crate::extraction::FormatExtractor;
use crate::providers::{DashScopeEmbedder, EmbeddingProvider};
use crate::types::{BatchReport, ExtractedDocument, FileReport, IngestFile, IngestionOutcome};

/// Turns files into text and vectors, one outcome per file
///
/// A failing file never aborts the others: extraction errors become
/// [`IngestionOutcome::Failure`], embedding errors become
/// [`IngestionOutcome::PartialFailure`] with the text kept.
#[derive(Clone)]
pub struct IngestionPipeline {
    extractor: Arc<FormatExtractor>,
    embedder: Arc<dyn EmbeddingProvider>,
    parallel_files: usize,
}

impl IngestionPipeline {
    /// Create a pipeline from its two stages
    pub fn new(extractor: FormatExtractor, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            extractor: Arc::new(extractor),
            embedder,
            parallel_files: 1,
        }
    }

    /// Pipeline with the built-in extractors and the DashScope embedder
    pub fn from_config(config: &IngestConfig) -> Result<Self> {
        config.validate()?;
        let embedder = DashScopeEmbedder::new(config.embeddings.clone())?;
        Ok(Self::new(FormatExtractor::new(&config.extraction), Arc::new(embedder))
            .with_parallel_files(config.processing.parallel_files))
    }

    /// Files processed concurrently by [`ingest_batch`](Self::ingest_batch)
    pub fn with_parallel_files(mut self, parallel_files: usize) -> Self {
        self.parallel_files = parallel_files.max(1);
        self
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    /// Ingest one file
    pub async fn ingest(&self, file: &IngestFile) -> IngestionOutcome {
        let name = file.display_name();
        let start = Instant::now();

        let document = match self.extract(file).await {
            Ok(document) => document,
            Err(error) => {
                tracing::error!("[{}] Extraction failed: {}", name, error);
                return IngestionOutcome::Failure { error };
            }
        };

        tracing::info!(
            "[{}] Extracted {} chars as {} ({:?} pages)",
            name,
            document.text.len(),
            document.format.display_name(),
            document.page_count
        );

        let outcome = self.embed_document(document).await;
        match &outcome {
            IngestionOutcome::Success { vectors, .. } => tracing::info!(
                "[{}] Ingested with {} vectors in {:.1}s",
                name,
                vectors.len(),
                start.elapsed().as_secs_f64()
            ),
            IngestionOutcome::PartialFailure { error, .. } => {
                tracing::warn!("[{}] Embedding failed, text kept: {}", name, error)
            }
            IngestionOutcome::Failure { .. } => {}
        }
        outcome
    }

    /// Embed an already-extracted document
    ///
    /// Used by [`ingest`](Self::ingest), and by callers re-embedding the text of
    /// a [`IngestionOutcome::PartialFailure`] without parsing the file again.
    pub async fn embed_document(&self, document: ExtractedDocument) -> IngestionOutcome {
        if document.text.is_empty() {
            tracing::debug!("No text to embed");
            return IngestionOutcome::Success {
                document,
                vectors: Vec::new(),
            };
        }

        let texts = [document.text.clone()];
        match self.embedder.embed_documents(&texts).await {
            Ok(vectors) if vectors.len() == texts.len() => {
                IngestionOutcome::Success { document, vectors }
            }
            Ok(vectors) => IngestionOutcome::PartialFailure {
                document,
                error: Error::embedding_response(format!(
                    "{} returned {} vectors for {} texts",
                    self.embedder.name(),
                    vectors.len(),
                    texts.len()
                )),
            },
            Err(error) => IngestionOutcome::PartialFailure { document, error },
        }
    }

    /// Ingest many files; the report lists one outcome per file, in input order
    pub async fn ingest_batch(&self, files: Vec<IngestFile>) -> BatchReport {
        tracing::info!(
            "Ingesting {} files ({} at a time)",
            files.len(),
            self.parallel_files
        );

        let reports: Vec<FileReport> = stream::iter(files)
            .map(|file| async move {
                let outcome = self.ingest(&file).await;
                FileReport { file, outcome }
            })
            .buffered(self.parallel_files)
            .collect()
            .await;

        let report = BatchReport { files: reports };
        tracing::info!(
            "Batch complete: {} succeeded, {} partially failed, {} failed",
            report.succeeded(),
            report.partially_failed(),
            report.failed()
        );
        report
    }

    /// Extraction is blocking file and CPU work; keep it off the async workers
    async fn extract(&self, file: &IngestFile) -> Result<ExtractedDocument> {
        let extractor = Arc::clone(&self.extractor);
        let path = file.path.clone();
        let original_name = file.original_name.clone();

        tokio::task::spawn_blocking(move || extractor.extract(&path, original_name.as_deref()))
            .await
            .map_err(|e| Error::internal(format!("Extraction task failed: {}", e)))?
    }
}
