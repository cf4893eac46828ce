//! Spreadsheet strategy (.xlsx / .xls)

use std::path::Path;

use calamine::{Data, Reader};

use crate::error::{Error, Result};
use crate::types::{DocumentFormat, ExtractedDocument};

use super::Extractor;

/// Cell delimiter within a rendered row
const CELL_SEPARATOR: &str = "\t";

/// Renders every sheet as a `Sheet: <name>` header followed by its rows
///
/// The page count is the number of sheets.
pub struct SpreadsheetExtractor;

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        _ => String::new(),
    }
}

impl Extractor for SpreadsheetExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Spreadsheet
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["xlsx", "xls"]
    }

    fn extract(&self, path: &Path, data: &[u8]) -> Result<ExtractedDocument> {
        let cursor = std::io::Cursor::new(data);
        let mut workbook = calamine::open_workbook_auto_from_rs(cursor)
            .map_err(|e| Error::extraction(path, format!("Failed to open workbook: {}", e)))?;

        let sheet_names = workbook.sheet_names().to_vec();
        let mut sheets = Vec::with_capacity(sheet_names.len());

        for sheet_name in &sheet_names {
            let mut sheet_text = format!("Sheet: {}", sheet_name);

            let range = workbook.worksheet_range(sheet_name).map_err(|e| {
                Error::extraction(path, format!("Failed to read sheet '{}': {}", sheet_name, e))
            })?;
            for row in range.rows() {
                let cells: Vec<String> = row.iter().map(cell_text).collect();
                if cells.iter().all(|c| c.is_empty()) {
                    continue;
                }
                sheet_text.push('\n');
                sheet_text.push_str(&cells.join(CELL_SEPARATOR));
            }

            sheets.push(sheet_text);
        }

        Ok(ExtractedDocument::new(
            DocumentFormat::Spreadsheet,
            sheets.join("\n\n"),
            Some(sheet_names.len() as u32),
        ))
    }
}
