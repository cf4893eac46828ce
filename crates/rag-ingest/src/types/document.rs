//! Extracted document and input file types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// An embedding vector; its length is fixed by the embedding model
pub type EmbeddingVector = Vec<f32>;

/// Extraction strategy that produced a document
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    /// PDF document
    Pdf,
    /// Microsoft Word document (.docx)
    Docx,
    /// Legacy binary Word document (.doc), never parsed
    LegacyDoc,
    /// Excel workbook (.xlsx / .xls)
    Spreadsheet,
    /// Text read verbatim (.md, .txt, .csv, .json)
    PlainText,
    /// Unrecognised extension
    Unknown,
}

impl DocumentFormat {
    /// Display name for logs and reports
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "Word Document (.docx)",
            Self::LegacyDoc => "Word Document (.doc)",
            Self::Spreadsheet => "Spreadsheet",
            Self::PlainText => "Text File",
            Self::Unknown => "Unknown",
        }
    }
}

/// Text and structural metadata extracted from one source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// Strategy that produced this document
    pub format: DocumentFormat,
    /// Normalized text (may be empty, never absent)
    pub text: String,
    /// Page count, where the format has one (sheets for spreadsheets)
    pub page_count: Option<u32>,
    /// Parser-reported metadata
    pub info: Option<HashMap<String, String>>,
}

impl ExtractedDocument {
    /// Document with text and a page count
    pub fn new(format: DocumentFormat, text: String, page_count: Option<u32>) -> Self {
        Self {
            format,
            text,
            page_count,
            info: None,
        }
    }

    /// Document for an extension no strategy handles
    pub fn empty() -> Self {
        Self::new(DocumentFormat::Unknown, String::new(), None)
    }

    /// Attach parser metadata
    pub fn with_info(mut self, info: HashMap<String, String>) -> Self {
        self.info = Some(info);
        self
    }

    /// Whether any text was extracted; whitespace counts
    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }
}

/// A file submitted for ingestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestFile {
    /// Where the bytes live (often a temporary upload path without extension)
    pub path: PathBuf,
    /// Name the user uploaded the file under
    pub original_name: Option<String>,
}

impl IngestFile {
    /// File identified by its path alone
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            original_name: None,
        }
    }

    /// File stored at `path` but uploaded as `original_name`
    pub fn with_original_name(path: impl Into<PathBuf>, original_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            original_name: Some(original_name.into()),
        }
    }

    /// Name used for reporting: the upload name, else the file name
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.original_name {
            return name.clone();
        }
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Lower-cased extension of `original_name`, falling back to `path`
pub fn dispatch_extension(path: &Path, original_name: Option<&str>) -> String {
    let from = |p: &Path| {
        p.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    };

    original_name
        .and_then(|name| from(Path::new(name)))
        .or_else(|| from(path))
        .unwrap_or_default()
}
