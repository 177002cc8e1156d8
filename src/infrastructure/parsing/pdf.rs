//! PDF element extractor
//!
//! PDFs are segmented by the remote structure service, which handles
//! scanned pages and table layouts. Failure handling is policy-driven:
//! either retry the remote call a bounded number of times, or drop
//! straight to a local text extractor that yields plain narrative text
//! without layout awareness.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use super::{ElementParser, ParserInput};
use crate::config::{ExtractFailurePolicy, ExtractionConfig};
use crate::domain::{Element, ElementMetadata, IngestError};
use crate::infrastructure::extraction::StructureExtractor;

/// Parser for PDF files
pub struct PdfParser {
    extractor: Arc<dyn StructureExtractor>,
    policy: ExtractFailurePolicy,
    max_attempts: u32,
    retry_delay: Duration,
}

impl PdfParser {
    pub fn new(extractor: Arc<dyn StructureExtractor>, config: &ExtractionConfig) -> Self {
        Self {
            extractor,
            policy: config.on_failure,
            max_attempts: config.max_attempts.max(1),
            retry_delay: Duration::from_secs(config.retry_delay_secs),
        }
    }

    async fn extract_with_retry(
        &self,
        filename: &str,
        bytes: &[u8],
    ) -> Result<Vec<Element>, IngestError> {
        let mut attempt = 1;
        loop {
            match self.extractor.extract(filename, bytes).await {
                Ok(elements) => return Ok(elements),
                Err(e) if attempt < self.max_attempts => {
                    warn!(
                        filename,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "extraction failed, retrying"
                    );
                    tokio::time::sleep(self.retry_delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Local fallback: plain text split on blank lines, no structural
    /// segmentation.
    fn extract_locally(filename: &str, bytes: &[u8]) -> Result<Vec<Element>, IngestError> {
        let text = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| IngestError::extraction(filename, e.to_string()))?;

        let metadata = ElementMetadata::new().with_filename(filename);
        Ok(text
            .split("\n\n")
            .map(str::trim)
            .filter(|paragraph| !paragraph.is_empty())
            .map(|paragraph| Element::narrative(paragraph, metadata.clone()))
            .collect())
    }
}

#[async_trait]
impl ElementParser for PdfParser {
    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    async fn parse(&self, input: ParserInput) -> Result<Vec<Element>, IngestError> {
        match self.policy {
            ExtractFailurePolicy::Retry => {
                self.extract_with_retry(&input.filename, &input.bytes).await
            }
            ExtractFailurePolicy::LocalFallback => {
                match self.extractor.extract(&input.filename, &input.bytes).await {
                    Ok(elements) => Ok(elements),
                    Err(e) => {
                        warn!(
                            filename = %input.filename,
                            error = %e,
                            "extraction failed, falling back to local text extraction"
                        );
                        Self::extract_locally(&input.filename, &input.bytes)
                    }
                }
            }
        }
    }
}
