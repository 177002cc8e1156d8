//! Ingestion run orchestration
//!
//! Drives parse, chunk, build, embed and write over every regular file
//! directly inside a folder. Stages run sequentially; per-file and
//! per-passage failures are contained so one bad input never aborts a
//! run. Chunking runs once over the combined element sequence, so a
//! short trailing section of one file may fold into the next file's
//! opening title.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{Element, IngestError, PassageDocument};
use crate::infrastructure::builder::DocumentBuilder;
use crate::infrastructure::chunking::Chunker;
use crate::infrastructure::embedding::Embedder;
use crate::infrastructure::parsing::ParserRegistry;
use crate::infrastructure::store::{DocumentSink, WriteStats};

/// Aggregate counts for one ingestion run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub files_seen: usize,
    pub elements_extracted: usize,
    pub chunks_produced: usize,
    pub passages_built: usize,
    pub write: WriteStats,
    /// True when no file yielded any element; later stages were skipped.
    pub nothing_to_ingest: bool,
}

pub struct IngestPipeline {
    registry: ParserRegistry,
    chunker: Box<dyn Chunker>,
    builder: DocumentBuilder,
    embedder: Arc<dyn Embedder>,
    sink: Arc<dyn DocumentSink>,
}

impl IngestPipeline {
    pub fn new(
        registry: ParserRegistry,
        chunker: Box<dyn Chunker>,
        builder: DocumentBuilder,
        embedder: Arc<dyn Embedder>,
        sink: Arc<dyn DocumentSink>,
    ) -> Self {
        Self {
            registry,
            chunker,
            builder,
            embedder,
            sink,
        }
    }

    /// Direct child regular files sorted by name. Subfolders are ignored.
    async fn list_files(folder: &Path) -> Result<Vec<std::path::PathBuf>, IngestError> {
        let mut entries = tokio::fs::read_dir(folder)
            .await
            .map_err(|e| IngestError::io(format!("cannot read {}: {e}", folder.display())))?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| IngestError::io(e.to_string()))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| IngestError::io(e.to_string()))?;
            if file_type.is_file() {
                files.push(entry.path());
            }
        }

        files.sort();
        Ok(files)
    }

    async fn extract_all(&self, files: &[std::path::PathBuf]) -> Vec<Element> {
        let mut elements = Vec::new();

        for path in files {
            info!(file = %path.display(), "processing");
            match self.registry.parse_file(path).await {
                Ok(extracted) => {
                    info!(
                        file = %path.display(),
                        elements = extracted.len(),
                        "extracted"
                    );
                    elements.extend(extracted);
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "extraction failed, skipping file");
                }
            }
        }

        elements
    }

    pub async fn run(&self, folder: &Path) -> Result<RunReport, IngestError> {
        let mut report = RunReport::default();

        let files = Self::list_files(folder).await?;
        report.files_seen = files.len();
        info!(folder = %folder.display(), files = files.len(), "starting ingestion");

        let elements = self.extract_all(&files).await;
        report.elements_extracted = elements.len();

        if elements.is_empty() {
            report.nothing_to_ingest = true;
            info!("nothing to ingest");
            return Ok(report);
        }

        let chunks = self.chunker.chunk(&elements);
        report.chunks_produced = chunks.len();

        let passages: Vec<_> = chunks
            .iter()
            .filter_map(|chunk| self.builder.build(chunk))
            .collect();
        report.passages_built = passages.len();
        info!(
            chunks = report.chunks_produced,
            passages = report.passages_built,
            "chunking complete"
        );

        let mut documents = Vec::with_capacity(passages.len());
        for passage in passages {
            let embedding = self.embedder.embed(&passage.content).await;
            documents.push(PassageDocument::new(passage, embedding));
        }

        report.write = self.sink.write_batch(&documents).await?;

        info!(
            files = report.files_seen,
            elements = report.elements_extracted,
            chunks = report.chunks_produced,
            written = report.write.written,
            "ingestion complete"
        );
        Ok(report)
    }
}
