//! PDF text extraction

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use lopdf::{Document, Object};

use crate::error::{Error, Result};
use crate::types::{DocumentFormat, ExtractedDocument};

use super::Extractor;

/// Glyph names some PDF fonts leak into extracted text, with their plain-text form
const GLYPH_NAMES: &[(&str, &str)] = &[
    ("uni2010", "-"),
    ("uni2011", "-"),
    ("uni2012", "-"),
    ("uni2013", "-"),
    ("uni2014", "--"),
    ("uni2015", "--"),
    ("uni2018", "'"),
    ("uni2019", "'"),
    ("uni201A", ","),
    ("uni201C", "\""),
    ("uni201D", "\""),
    ("uni201E", "\""),
    ("uni2022", "* "),
    ("uni2026", "..."),
    ("uni00A0", " "),
    ("uni2002", " "),
    ("uni2003", " "),
    ("uni2009", " "),
    ("uni2212", "-"),
    ("uni00D7", "\u{00D7}"),
    ("uni00F7", "\u{00F7}"),
    ("uni20AC", "\u{20AC}"),
    ("uni00A3", "\u{00A3}"),
    ("uni00A5", "\u{00A5}"),
    ("uni00AE", "\u{00AE}"),
    ("uni2122", "\u{2122}"),
    ("uni00A9", "\u{00A9}"),
    ("f_f_i", "ffi"),
    ("f_f_l", "ffl"),
    ("f_i", "fi"),
    ("f_l", "fl"),
    ("f_f", "ff"),
];

/// Typographic characters folded to ASCII
const TYPOGRAPHIC: &[(char, &str)] = &[
    ('\u{2010}', "-"),
    ('\u{2011}', "-"),
    ('\u{2013}', "-"),
    ('\u{2014}', "--"),
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{2022}', "* "),
    ('\u{2026}', "..."),
    ('\u{00A0}', " "),
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
];

/// Normalize raw PDF text: glyph names, ligatures, NULs and blank lines
fn cleanup_pdf_text(text: &str) -> String {
    let mut result = text.replace('\0', "");

    for (glyph, plain) in GLYPH_NAMES {
        if result.contains(glyph) {
            result = result.replace(glyph, plain);
        }
    }
    for (ch, plain) in TYPOGRAPHIC {
        if result.contains(*ch) {
            result = result.replace(*ch, plain);
        }
    }

    result
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default number of pdf-extract worker threads allowed at once
pub const DEFAULT_PDF_WORKERS: usize = 4;

/// PDF strategy: pdf-extract on a watchdog thread, lopdf as fallback
///
/// A worker that outlives its timeout cannot be killed and keeps running
/// detached with its own copy of the bytes. At most `max_workers` workers run
/// at once, timed-out ones included; when all slots are taken the lopdf
/// fallback is used directly.
pub struct PdfExtractor {
    timeout: Duration,
    max_workers: usize,
    workers: Arc<AtomicUsize>,
}

/// Occupied worker slot, released when the worker thread ends
struct WorkerSlot(Arc<AtomicUsize>);

impl Drop for WorkerSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl PdfExtractor {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            max_workers: DEFAULT_PDF_WORKERS,
            workers: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Cap on concurrent pdf-extract threads, including timed-out ones
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    fn acquire_slot(&self) -> Option<WorkerSlot> {
        self.workers
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.max_workers).then_some(n + 1)
            })
            .ok()
            .map(|_| WorkerSlot(Arc::clone(&self.workers)))
    }

    /// Run pdf-extract on its own thread so a pathological font cannot hang the caller
    ///
    /// Pages are joined with a newline. A panic inside pdf-extract drops the
    /// sender and shows up as `Disconnected`.
    fn extract_with_timeout(&self, data: &[u8]) -> Option<String> {
        let Some(slot) = self.acquire_slot() else {
            tracing::warn!(
                "All {} pdf-extract workers busy, using fallback",
                self.max_workers
            );
            return None;
        };

        let data = data.to_vec();
        let (tx, rx) = mpsc::channel();

        let spawned = thread::Builder::new()
            .name("pdf-extract".to_string())
            .spawn(move || {
                let _slot = slot;
                let _ = tx.send(pdf_extract::extract_text_from_mem_by_pages(&data));
            });
        if let Err(e) = spawned {
            tracing::warn!("Could not spawn pdf-extract thread: {}", e);
            return None;
        }

        match rx.recv_timeout(self.timeout) {
            Ok(Ok(pages)) => Some(pages.join("\n")),
            Ok(Err(e)) => {
                tracing::warn!("pdf-extract failed: {}, trying fallback", e);
                None
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::error!(
                    "pdf-extract timed out after {:?}, trying fallback",
                    self.timeout
                );
                None
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                tracing::error!("pdf-extract thread crashed, trying fallback");
                None
            }
        }
    }

    /// Fallback extraction straight from lopdf's page content streams
    fn extract_with_lopdf(doc: &Document, path: &Path) -> Result<String> {
        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        doc.extract_text(&page_numbers)
            .map_err(|e| Error::extraction(path, format!("PDF text extraction failed: {}", e)))
    }
}

impl Extractor for PdfExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["pdf"]
    }

    fn extract(&self, path: &Path, data: &[u8]) -> Result<ExtractedDocument> {
        let doc = Document::load_mem(data)
            .map_err(|e| Error::extraction(path, format!("Failed to load PDF: {}", e)))?;

        let raw = match self.extract_with_timeout(data) {
            Some(text) => text,
            None => Self::extract_with_lopdf(&doc, path)?,
        };

        let text = cleanup_pdf_text(&raw);
        if text.is_empty() {
            tracing::warn!(
                "No extractable text in {} (image-based or encrypted PDF?)",
                path.display()
            );
        }

        let page_count = doc.get_pages().len() as u32;
        Ok(ExtractedDocument::new(DocumentFormat::Pdf, text, Some(page_count))
            .with_info(document_info(&doc)))
    }
}

/// Trailer `/Info` entries plus the PDF version
fn document_info(doc: &Document) -> HashMap<String, String> {
    let mut info = HashMap::new();
    info.insert("PDFFormatVersion".to_string(), doc.version.clone());

    let dict = match doc.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => doc.get_dictionary(*id).ok(),
        Ok(Object::Dictionary(dict)) => Some(dict),
        _ => None,
    };

    if let Some(dict) = dict {
        for (key, value) in dict.iter() {
            if let Some(value) = object_to_string(value) {
                info.insert(String::from_utf8_lossy(key).into_owned(), value);
            }
        }
    }

    info
}

fn object_to_string(object: &Object) -> Option<String> {
    match object {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        Object::Integer(i) => Some(i.to_string()),
        Object::Real(r) => Some(r.to_string()),
        Object::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Decode a PDF text string: UTF-16BE with BOM, otherwise byte-per-char
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|&b| b as char).collect()
}
