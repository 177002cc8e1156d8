//! Ingest command - one batch run over a document folder

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::builder::DocumentBuilder;
use crate::infrastructure::chunking::TitleChunker;
use crate::infrastructure::embedding::{HttpClient, RemoteEmbedder};
use crate::infrastructure::extraction::RemoteExtractionClient;
use crate::infrastructure::logging;
use crate::infrastructure::parsing::html::HtmlParser;
use crate::infrastructure::parsing::markdown::MarkdownParser;
use crate::infrastructure::parsing::pdf::PdfParser;
use crate::infrastructure::parsing::pptx::PptxParser;
use crate::infrastructure::parsing::ParserRegistry;
use crate::infrastructure::pipeline::IngestPipeline;
use crate::infrastructure::store::{DocumentSink, PgVectorStore};

#[derive(Args)]
pub struct IngestArgs {
    /// Folder to ingest; overrides the configured default
    #[arg(long)]
    pub folder: Option<PathBuf>,
}

pub async fn run(args: IngestArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);

    let folder = args
        .folder
        .unwrap_or_else(|| PathBuf::from(&config.ingest.folder));

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await
        .context("failed to connect to database")?;

    let sink = Arc::new(PgVectorStore::new(
        pool,
        &config.store,
        config.embedding.dimensions,
        config.embedding.on_failure,
    ));
    // Without a schema nothing downstream can succeed.
    sink.ensure_schema()
        .await
        .context("schema initialization failed")?;

    let extractor = Arc::new(RemoteExtractionClient::new(config.extraction.clone())?);
    let registry = ParserRegistry::new()
        .with_parser(Arc::new(MarkdownParser::new()))
        .with_parser(Arc::new(HtmlParser::new()))
        .with_parser(Arc::new(PptxParser::new()))
        .with_parser(Arc::new(PdfParser::new(extractor, &config.extraction)));

    let http_client = HttpClient::with_timeout(Duration::from_secs(config.embedding.timeout_secs))?;
    let embedder = Arc::new(RemoteEmbedder::new(http_client, &config.embedding));

    let pipeline = IngestPipeline::new(
        registry,
        Box::new(TitleChunker::new(&config.chunking)),
        DocumentBuilder::new(&config.ingest),
        embedder,
        sink,
    );

    let report = pipeline.run(&folder).await?;

    if report.nothing_to_ingest {
        info!(files = report.files_seen, "no content to ingest");
    } else {
        info!(
            files = report.files_seen,
            elements = report.elements_extracted,
            chunks = report.chunks_produced,
            rows = report.write.total_seen(),
            written = report.write.written,
            skipped_empty = report.write.skipped_empty,
            skipped_zero = report.write.skipped_zero,
            failed = report.write.failed,
            "done"
        );
    }

    Ok(())
}
