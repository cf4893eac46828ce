//! Batch ingestion command
//!
//! Run with: cargo run -p rag-ingest --features cli -- <files or directories>

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rag_ingest::storage::{DocumentRecord, DocumentSink, JsonLinesSink};
use rag_ingest::{IngestConfig, IngestFile, IngestionPipeline, OutcomeStatus};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "rag-ingest", version, about = "Extract and embed documents for RAG")]
struct Args {
    /// Files or directories to ingest (directories are walked recursively)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Append embedded records to this JSON-lines file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Files processed concurrently (overrides the config)
    #[arg(short, long)]
    parallel: Option<usize>,
}

fn collect_files(inputs: &[PathBuf]) -> Vec<IngestFile> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
                if entry.file_type().is_file() {
                    files.push(IngestFile::new(entry.into_path()));
                }
            }
        } else {
            // Missing paths are kept so they show up as failures in the report
            files.push(IngestFile::new(input.clone()));
        }
    }
    files
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rag_ingest=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => IngestConfig::from_file(path)?,
        None => IngestConfig::default(),
    };
    if let Some(parallel) = args.parallel {
        config.processing.parallel_files = parallel;
    }

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!("  - Embedding dimensions: {}", config.embeddings.dimensions);
    tracing::info!("  - Batch size: {}", config.embeddings.batch_size);

    let pipeline = IngestionPipeline::from_config(&config)?;
    let sink = match &args.output {
        Some(path) => Some(JsonLinesSink::open(path).await?),
        None => None,
    };

    let files = collect_files(&args.inputs);
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")?);
    spinner.set_message(format!("Ingesting {} files", files.len()));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let report = pipeline.ingest_batch(files).await;
    spinner.finish_and_clear();

    let mut stored = 0;
    for entry in &report.files {
        let name = entry.file.display_name();
        match entry.outcome.status() {
            OutcomeStatus::Success => println!("{} {}", style("ok     ").green(), name),
            OutcomeStatus::PartialFailure => println!("{} {}", style("partial").yellow(), name),
            OutcomeStatus::Failure => println!("{} {}", style("failed ").red(), name),
        }
        if let Some(error) = entry.outcome.error() {
            println!("        {}", style(error).dim());
        }

        if let Some(sink) = &sink {
            let records = DocumentRecord::from_outcome(&entry.file, &entry.outcome)?;
            stored += sink.store(&records).await?;
        }
    }

    println!(
        "\n{} succeeded, {} partially failed, {} failed",
        report.succeeded(),
        report.partially_failed(),
        report.failed()
    );
    if let Some(sink) = &sink {
        println!("{} records written to {}", stored, sink.path().display());
    }

    if report.succeeded() == report.len() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
