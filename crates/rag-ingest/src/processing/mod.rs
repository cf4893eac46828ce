//! Document ingestion orchestration

mod pipeline;

pub use pipeline::IngestionPipeline;
