//! Shared fixtures: documents built in memory and a stub embedding service

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use rag_ingest::config::EmbeddingConfig;
use wiremock::{Request, Respond, ResponseTemplate};

pub const DIMENSIONS: usize = 1024;

/// Write `bytes` to `dir/name` and return the path
pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// DOCX with one paragraph per entry
pub fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    use docx_rs::{Docx, Paragraph, Run};

    let mut docx = Docx::new();
    for text in paragraphs {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)));
    }
    let mut buf = Cursor::new(Vec::new());
    docx.build().pack(&mut buf).unwrap();
    buf.into_inner()
}

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Minimal XLSX workbook; each sheet is `(name, rows)` with inline string cells
pub fn xlsx_bytes(sheets: &[(&str, &[&[&str]])]) -> Vec<u8> {
    let parts: Vec<(&str, String)> = sheets
        .iter()
        .map(|(name, rows)| (*name, sheet_xml(rows)))
        .collect();
    xlsx_from_sheet_parts(&parts)
}

/// Worksheet part with one inline string cell per value
pub fn sheet_xml(rows: &[&[&str]]) -> String {
    let mut data = String::new();
    for (r, row) in rows.iter().enumerate() {
        data.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, value) in row.iter().enumerate() {
            let col = (b'A' + c as u8) as char;
            data.push_str(&format!(
                r#"<c r="{col}{}" t="inlineStr"><is><t>{value}</t></is></c>"#,
                r + 1
            ));
        }
        data.push_str("</row>");
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="{MAIN_NS}"><sheetData>{data}</sheetData></worksheet>"#
    )
}

/// XLSX package around raw worksheet parts `(name, xml)`
pub fn xlsx_from_sheet_parts(sheets: &[(&str, String)]) -> Vec<u8> {
    use zip::write::SimpleFileOptions;

    const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
    const DOC_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    let mut overrides = String::new();
    let mut sheet_entries = String::new();
    let mut sheet_rels = String::new();
    for (i, (name, _)) in sheets.iter().enumerate() {
        let n = i + 1;
        overrides.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
        sheet_entries.push_str(&format!(r#"<sheet name="{name}" sheetId="{n}" r:id="rId{n}"/>"#));
        sheet_rels.push_str(&format!(
            r#"<Relationship Id="rId{n}" Type="{DOC_REL}/worksheet" Target="worksheets/sheet{n}.xml"/>"#
        ));
    }

    let content_types = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>{overrides}</Types>"#
    );
    let root_rels = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{REL_NS}"><Relationship Id="rId1" Type="{DOC_REL}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
    );
    let workbook = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="{MAIN_NS}" xmlns:r="{DOC_REL}"><sheets>{sheet_entries}</sheets></workbook>"#
    );
    let workbook_rels = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{REL_NS}">{sheet_rels}</Relationships>"#
    );

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let mut add = |name: &str, body: &str| {
        zip.start_file(name, SimpleFileOptions::default()).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    };

    add("[Content_Types].xml", &content_types);
    add("_rels/.rels", &root_rels);
    add("xl/workbook.xml", &workbook);
    add("xl/_rels/workbook.xml.rels", &workbook_rels);

    for (i, (_, xml)) in sheets.iter().enumerate() {
        add(&format!("xl/worksheets/sheet{}.xml", i + 1), xml);
    }

    zip.finish().unwrap().into_inner()
}

/// PDF with one Courier text line per page and an `/Info` title
pub fn pdf_bytes(title: &str, pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(title),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Deterministic vector derived from the text, so responses can be matched to inputs
pub fn stub_vector(text: &str) -> Vec<f32> {
    let seed = text
        .bytes()
        .fold(7u32, |h, b| h.wrapping_mul(31).wrapping_add(b as u32));
    (0..DIMENSIONS as u32)
        .map(|i| (seed.wrapping_add(i.wrapping_mul(17)) % 1000) as f32 / 1000.0)
        .collect()
}

/// Answers each request with `stub_vector` of its single input text
pub struct StubEmbeddings;

impl Respond for StubEmbeddings {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: serde_json::Value = match serde_json::from_slice(&request.body) {
            Ok(body) => body,
            Err(_) => return ResponseTemplate::new(400),
        };
        let Some(text) = body["input"]["texts"][0].as_str() else {
            return ResponseTemplate::new(400);
        };
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "output": { "embeddings": [{ "text_index": 0, "embedding": stub_vector(text) }] },
            "usage": { "total_tokens": text.len() },
            "request_id": "stub"
        }))
    }
}

/// Embedding config pointed at a mock server
pub fn embedding_config(server_uri: &str) -> EmbeddingConfig {
    EmbeddingConfig {
        api_key: Some("sk-test".to_string()),
        endpoint: format!("{}/embeddings", server_uri),
        timeout_secs: 5,
        ..EmbeddingConfig::default()
    }
}
