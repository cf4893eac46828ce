//! Plain text strategy

use std::path::Path;

use crate::error::Result;
use crate::types::{DocumentFormat, ExtractedDocument};

use super::Extractor;

/// Reads text-like files verbatim; invalid UTF-8 is replaced, not rejected
pub struct PlainTextExtractor;

impl Extractor for PlainTextExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::PlainText
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["md", "txt", "csv", "json"]
    }

    fn extract(&self, _path: &Path, data: &[u8]) -> Result<ExtractedDocument> {
        let text = String::from_utf8_lossy(data).into_owned();
        Ok(ExtractedDocument::new(DocumentFormat::PlainText, text, Some(1)))
    }
}
