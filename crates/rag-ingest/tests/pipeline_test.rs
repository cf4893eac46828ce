//! End-to-end ingestion: real files, mock embedding service

mod common;

use std::sync::Arc;

use rag_ingest::config::ExtractionConfig;
use rag_ingest::storage::{DocumentRecord, DocumentSink, JsonLinesSink, MemorySink};
use rag_ingest::types::DocumentFormat;
use rag_ingest::{
    DashScopeEmbedder, Error, FormatExtractor, IngestConfig, IngestFile, IngestionOutcome,
    IngestionPipeline, OutcomeStatus,
};
use serde_json::json;
use tempfile::tempdir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{embedding_config, stub_vector, write_file, xlsx_bytes, StubEmbeddings, DIMENSIONS};

async fn stub_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(StubEmbeddings)
        .mount(&server)
        .await;
    server
}

fn pipeline(server: &MockServer) -> IngestionPipeline {
    let embedder = DashScopeEmbedder::new(embedding_config(&server.uri())).unwrap();
    IngestionPipeline::new(FormatExtractor::new(&ExtractionConfig::default()), Arc::new(embedder))
}

#[tokio::test]
async fn test_text_file_is_extracted_and_embedded() {
    let server = stub_server().await;
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "greeting.txt", b"hello world");

    let outcome = pipeline(&server).ingest(&IngestFile::new(path)).await;

    match outcome {
        IngestionOutcome::Success { document, vectors } => {
            assert_eq!(document.text, "hello world");
            assert_eq!(document.format, DocumentFormat::PlainText);
            assert_eq!(vectors.len(), 1);
            assert_eq!(vectors[0].len(), DIMENSIONS);
            assert_eq!(vectors[0], stub_vector("hello world"));
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn test_spreadsheet_keeps_sheet_markers() {
    let server = stub_server().await;
    let dir = tempdir().unwrap();
    let bytes = xlsx_bytes(&[
        ("Sheet1", &[&["name", "score"], &["ada", "10"]]),
        ("Sheet2", &[&["total"], &["10"]]),
    ]);
    let path = write_file(dir.path(), "scores.xlsx", &bytes);

    let outcome = pipeline(&server).ingest(&IngestFile::new(path)).await;

    assert!(outcome.is_success(), "{outcome:?}");
    let document = outcome.document().unwrap();
    assert_eq!(document.page_count, Some(2));
    assert!(document.text.contains("Sheet: Sheet1"));
    assert!(document.text.contains("Sheet: Sheet2"));
}

#[tokio::test]
async fn test_upload_name_selects_extractor() {
    let server = stub_server().await;
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "tmp_upload_3f9a", b"# Notes\nbody");

    let file = IngestFile::with_original_name(path, "notes.md");
    let outcome = pipeline(&server).ingest(&file).await;

    assert!(outcome.is_success());
    assert_eq!(outcome.document().unwrap().text, "# Notes\nbody");
    assert_eq!(file.display_name(), "notes.md");
}

#[tokio::test]
async fn test_batch_isolates_failing_file() {
    let server = stub_server().await;
    let dir = tempdir().unwrap();
    let first = write_file(dir.path(), "a.txt", b"first");
    let third = write_file(dir.path(), "c.md", b"third");

    let report = pipeline(&server)
        .with_parallel_files(3)
        .ingest_batch(vec![
            IngestFile::new(first),
            IngestFile::new(dir.path().join("missing.pdf")),
            IngestFile::new(third),
        ])
        .await;

    assert_eq!(
        report.statuses(),
        vec![
            OutcomeStatus::Success,
            OutcomeStatus::Failure,
            OutcomeStatus::Success
        ]
    );
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);
    assert!(matches!(
        report.files[1].outcome.error(),
        Some(Error::ExtractionIo { .. })
    ));
    assert_eq!(report.files[2].outcome.document().unwrap().text, "third");
}

#[tokio::test]
async fn test_embedding_failure_keeps_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model overloaded"))
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "report.txt", b"quarterly summary");

    let outcome = pipeline(&server).ingest(&IngestFile::new(path)).await;

    match outcome {
        IngestionOutcome::PartialFailure { document, error } => {
            assert_eq!(document.text, "quarterly summary");
            assert!(error.is_embedding_error());
            assert!(matches!(error, Error::EmbeddingApi { status: 500, .. }));
        }
        other => panic!("expected partial failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_partial_failure_can_be_re_embedded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(StubEmbeddings)
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "retry.txt", b"second time lucky");

    let pipeline = pipeline(&server);
    let IngestionOutcome::PartialFailure { document, .. } =
        pipeline.ingest(&IngestFile::new(path)).await
    else {
        panic!("first attempt should fail to embed");
    };

    let retried = pipeline.embed_document(document).await;
    match retried {
        IngestionOutcome::Success { vectors, .. } => {
            assert_eq!(vectors, vec![stub_vector("second time lucky")])
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_text_succeeds_without_embedding_calls() {
    let server = stub_server().await;
    let dir = tempdir().unwrap();
    let empty = write_file(dir.path(), "empty.txt", b"");
    let unknown = write_file(dir.path(), "image.png", b"\x89PNG\r\n");

    let report = pipeline(&server)
        .ingest_batch(vec![IngestFile::new(empty), IngestFile::new(unknown)])
        .await;

    for entry in &report.files {
        match &entry.outcome {
            IngestionOutcome::Success { document, vectors } => {
                assert!(document.text.is_empty());
                assert!(vectors.is_empty());
            }
            other => panic!("expected success, got {other:?}"),
        }
    }
    assert_eq!(server.received_requests().await.unwrap().len(), 0);
}

#[tokio::test]
async fn test_whitespace_only_text_is_still_embedded() {
    let server = stub_server().await;
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "blank.txt", b"   \n");

    let outcome = pipeline(&server).ingest(&IngestFile::new(path)).await;

    match outcome {
        IngestionOutcome::Success { document, vectors } => {
            assert_eq!(document.text, "   \n");
            assert_eq!(vectors, vec![stub_vector("   \n")]);
        }
        other => panic!("expected success, got {other:?}"),
    }
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_legacy_doc_sentinel_is_embedded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "input": { "texts": ["[Error: .doc format not supported, please convert to .docx]"] }
        })))
        .respond_with(StubEmbeddings)
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "old.doc", b"\xD0\xCF\x11\xE0");

    let outcome = pipeline(&server).ingest(&IngestFile::new(path)).await;
    assert!(outcome.is_success());
}

#[tokio::test]
async fn test_from_config_requires_api_key() {
    let mut config = IngestConfig::default();
    config.embeddings.api_key = None;
    config.embeddings.api_key_env = "RAG_INGEST_PIPELINE_KEY_NEVER_SET".to_string();

    let err = IngestionPipeline::from_config(&config).err().unwrap();
    assert!(matches!(err, Error::Configuration(_)));
}

#[tokio::test]
async fn test_successful_outcomes_become_records() {
    let server = stub_server().await;
    let dir = tempdir().unwrap();
    let good = write_file(dir.path(), "kb.md", b"refunds take five days");

    let report = pipeline(&server)
        .ingest_batch(vec![
            IngestFile::new(good),
            IngestFile::new(dir.path().join("gone.docx")),
        ])
        .await;

    let memory = MemorySink::new();
    let jsonl = JsonLinesSink::open(dir.path().join("records.jsonl")).await.unwrap();
    let mut stored = 0;
    for entry in &report.files {
        let records = DocumentRecord::from_outcome(&entry.file, &entry.outcome).unwrap();
        stored += memory.store(&records).await.unwrap();
        jsonl.store(&records).await.unwrap();
    }

    assert_eq!(stored, 1);
    let records = memory.records();
    assert_eq!(records[0].source, "kb.md");
    assert_eq!(records[0].content, "refunds take five days");
    assert_eq!(records[0].metadata["format"], "plain_text");
    assert_eq!(records[0].vector().unwrap(), stub_vector("refunds take five days"));

    let written = std::fs::read_to_string(jsonl.path()).unwrap();
    assert_eq!(written.lines().count(), 1);
    let decoded: DocumentRecord = serde_json::from_str(written.trim()).unwrap();
    assert_eq!(decoded, records[0]);
}
