//! Document sinks: where records go after ingestion

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::error::Result;

use super::record::DocumentRecord;

/// Receives records for durable storage
///
/// Implementations:
/// - `JsonLinesSink`: one JSON object per line in a local file
/// - `MemorySink`: in-process buffer
#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Store records, returning how many were written
    async fn store(&self, records: &[DocumentRecord]) -> Result<usize>;

    /// Sink name for logging
    fn name(&self) -> &str;
}

/// Appends records to a JSON-lines file
pub struct JsonLinesSink {
    path: PathBuf,
    file: tokio::sync::Mutex<tokio::fs::File>,
}

impl JsonLinesSink {
    /// Open `path` for appending, creating it if needed
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        Ok(Self {
            path,
            file: tokio::sync::Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DocumentSink for JsonLinesSink {
    async fn store(&self, records: &[DocumentRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut buf = Vec::new();
        for record in records {
            serde_json::to_writer(&mut buf, record)?;
            buf.push(b'\n');
        }

        let mut file = self.file.lock().await;
        file.write_all(&buf).await?;
        file.flush().await?;

        tracing::debug!("Wrote {} records to {}", records.len(), self.path.display());
        Ok(records.len())
    }

    fn name(&self) -> &str {
        "jsonl"
    }
}

/// Keeps records in memory
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<DocumentRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything stored so far
    pub fn records(&self) -> Vec<DocumentRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl DocumentSink for MemorySink {
    async fn store(&self, records: &[DocumentRecord]) -> Result<usize> {
        self.records.lock().extend_from_slice(records);
        Ok(records.len())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
