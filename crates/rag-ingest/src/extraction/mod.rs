//! Format-aware text extraction
//!
//! Files are dispatched on their lower-cased extension through an
//! [`ExtractorRegistry`]. Adding a format means registering another
//! [`Extractor`]; unregistered extensions extract to empty text.

mod office;
mod pdf;
mod spreadsheet;
mod text;

pub use office::{DocxExtractor, LegacyDocExtractor, LEGACY_DOC_SENTINEL};
pub use pdf::{PdfExtractor, DEFAULT_PDF_WORKERS};
pub use spreadsheet::SpreadsheetExtractor;
pub use text::PlainTextExtractor;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::config::ExtractionConfig;
use crate::error::{Error, Result};
use crate::types::{dispatch_extension, DocumentFormat, ExtractedDocument};

/// One extraction strategy
pub trait Extractor: Send + Sync {
    /// Format reported on extracted documents
    fn format(&self) -> DocumentFormat;

    /// Lower-cased extensions this strategy handles
    fn extensions(&self) -> &'static [&'static str];

    /// Whether the file bytes are needed; when false only existence is checked
    fn reads_content(&self) -> bool {
        true
    }

    /// Extract text from file bytes; `path` is for diagnostics only
    fn extract(&self, path: &Path, data: &[u8]) -> Result<ExtractedDocument>;
}

/// Extension → strategy dispatch table
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    by_extension: HashMap<String, Arc<dyn Extractor>>,
}

impl ExtractorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in strategy
    pub fn with_defaults(config: &ExtractionConfig) -> Self {
        let mut registry = Self::new();
        registry.register(
            PdfExtractor::new(config.pdf_timeout()).with_max_workers(config.pdf_max_workers),
        );
        registry.register(DocxExtractor);
        registry.register(LegacyDocExtractor);
        registry.register(SpreadsheetExtractor);
        registry.register(PlainTextExtractor);
        registry
    }

    /// Register a strategy for all of its extensions, replacing earlier entries
    pub fn register<E: Extractor + 'static>(&mut self, extractor: E) {
        let extractor: Arc<dyn Extractor> = Arc::new(extractor);
        for ext in extractor.extensions() {
            self.by_extension
                .insert(ext.to_lowercase(), Arc::clone(&extractor));
        }
    }

    /// Strategy for a lower-cased extension
    pub fn get(&self, extension: &str) -> Option<Arc<dyn Extractor>> {
        self.by_extension.get(extension).cloned()
    }

    /// Registered extensions, sorted
    pub fn extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.by_extension.keys().map(String::as_str).collect();
        exts.sort_unstable();
        exts
    }
}

/// Turns files into [`ExtractedDocument`]s
///
/// Read-only: the source file is never modified.
#[derive(Clone)]
pub struct FormatExtractor {
    registry: ExtractorRegistry,
}

impl FormatExtractor {
    /// Extractor with the built-in strategies
    pub fn new(config: &ExtractionConfig) -> Self {
        Self::with_registry(ExtractorRegistry::with_defaults(config))
    }

    /// Extractor over a custom registry
    pub fn with_registry(registry: ExtractorRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ExtractorRegistry {
        &self.registry
    }

    /// Extract the file at `path`, dispatching on `original_name`'s extension
    /// (or `path`'s when no original name is given)
    ///
    /// Fails only when the file cannot be read or its parser rejects it;
    /// legacy and unknown formats produce degraded text instead.
    pub fn extract(&self, path: &Path, original_name: Option<&str>) -> Result<ExtractedDocument> {
        let extension = dispatch_extension(path, original_name);

        let Some(extractor) = self.registry.get(&extension) else {
            ensure_readable(path)?;
            tracing::debug!(
                "No extractor for extension '{}', returning empty text for {}",
                extension,
                path.display()
            );
            return Ok(ExtractedDocument::empty());
        };

        let data = if extractor.reads_content() {
            std::fs::read(path).map_err(|e| {
                tracing::error!("Failed to read {}: {}", path.display(), e);
                Error::extraction(path, e.to_string())
            })?
        } else {
            ensure_readable(path)?;
            Vec::new()
        };

        Self::run(extractor.as_ref(), path, &data)
    }

    /// Extract an upload already held in memory
    pub fn extract_bytes(&self, filename: &str, data: &[u8]) -> Result<ExtractedDocument> {
        let path = Path::new(filename);
        match self.registry.get(&dispatch_extension(path, None)) {
            Some(extractor) => Self::run(extractor.as_ref(), path, data),
            None => Ok(ExtractedDocument::empty()),
        }
    }

    fn run(extractor: &dyn Extractor, path: &Path, data: &[u8]) -> Result<ExtractedDocument> {
        tracing::debug!(
            "Extracting {} as {} ({} bytes)",
            path.display(),
            extractor.format().display_name(),
            data.len()
        );

        extractor.extract(path, data).map_err(|e| {
            tracing::error!("Extraction failed for {}: {}", path.display(), e);
            match e {
                Error::ExtractionIo { .. } => e,
                other => Error::extraction(path, other.to_string()),
            }
        })
    }
}

fn ensure_readable(path: &Path) -> Result<()> {
    std::fs::metadata(path).map(|_| ()).map_err(|e| {
        tracing::error!("Failed to stat {}: {}", path.display(), e);
        Error::extraction(path, e.to_string())
    })
}
