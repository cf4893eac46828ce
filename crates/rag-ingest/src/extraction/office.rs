//! Word document strategies

use std::path::Path;

use docx_rs::{DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent, TableChild, TableRowChild};

use crate::error::{Error, Result};
use crate::types::{DocumentFormat, ExtractedDocument};

use super::Extractor;

/// Text returned for legacy `.doc` files instead of parsing them
pub const LEGACY_DOC_SENTINEL: &str = "[Error: .doc format not supported, please convert to .docx]";

/// DOCX strategy
///
/// Pagination needs a layout engine, so the page count is always 1.
pub struct DocxExtractor;

impl DocxExtractor {
    fn paragraph_text(paragraph: &Paragraph, out: &mut String) {
        for child in &paragraph.children {
            Self::paragraph_child_text(child, out);
        }
    }

    fn paragraph_child_text(child: &ParagraphChild, out: &mut String) {
        match child {
            ParagraphChild::Run(run) => {
                for run_child in &run.children {
                    match run_child {
                        RunChild::Text(t) => out.push_str(&t.text),
                        RunChild::Tab(_) => out.push('\t'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => {
                for inner in &link.children {
                    Self::paragraph_child_text(inner, out);
                }
            }
            _ => {}
        }
    }

    /// One line per row, cells separated by tabs
    fn table_text(table: &Table, out: &mut String) {
        for TableChild::TableRow(row) in &table.rows {
            let mut cells = Vec::with_capacity(row.cells.len());
            for TableRowChild::TableCell(cell) in &row.cells {
                let mut cell_text = String::new();
                for content in &cell.children {
                    let mut part = String::new();
                    match content {
                        TableCellContent::Paragraph(p) => Self::paragraph_text(p, &mut part),
                        // Nested rows are flattened into the enclosing cell
                        TableCellContent::Table(nested) => {
                            let mut rows = String::new();
                            Self::table_text(nested, &mut rows);
                            part = rows.lines().collect::<Vec<_>>().join(" ");
                        }
                        _ => continue,
                    }
                    if part.is_empty() {
                        continue;
                    }
                    if !cell_text.is_empty() {
                        cell_text.push(' ');
                    }
                    cell_text.push_str(&part);
                }
                cells.push(cell_text);
            }

            if cells.iter().any(|c| !c.trim().is_empty()) {
                out.push_str(&cells.join("\t"));
                out.push('\n');
            }
        }
    }
}

impl Extractor for DocxExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["docx"]
    }

    fn extract(&self, path: &Path, data: &[u8]) -> Result<ExtractedDocument> {
        let doc = docx_rs::read_docx(data)
            .map_err(|e| Error::extraction(path, format!("Failed to read DOCX: {}", e)))?;

        let mut text = String::new();
        for child in &doc.document.children {
            match child {
                DocumentChild::Paragraph(p) => {
                    Self::paragraph_text(p, &mut text);
                    text.push('\n');
                }
                DocumentChild::Table(t) => Self::table_text(t, &mut text),
                _ => {}
            }
        }

        Ok(ExtractedDocument::new(DocumentFormat::Docx, text, Some(1)))
    }
}

/// Legacy `.doc` strategy: never parsed, answers with a sentinel
pub struct LegacyDocExtractor;

impl Extractor for LegacyDocExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::LegacyDoc
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["doc"]
    }

    fn reads_content(&self) -> bool {
        false
    }

    fn extract(&self, path: &Path, _data: &[u8]) -> Result<ExtractedDocument> {
        tracing::warn!(
            "Legacy .doc format is not supported, skipping {}",
            path.display()
        );
        Ok(ExtractedDocument::new(
            DocumentFormat::LegacyDoc,
            LEGACY_DOC_SENTINEL.to_string(),
            None,
        ))
    }
}
