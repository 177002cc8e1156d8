//! Chunk-to-passage normalization

use chrono::Utc;

use crate::config::IngestConfig;
use crate::domain::Passage;
use crate::infrastructure::chunking::Chunk;

/// Turns chunks into normalized passages ready for embedding.
///
/// Blank chunks are dropped here so no embedding call or storage row is
/// wasted on them.
pub struct DocumentBuilder {
    strip_language_metadata: bool,
}

impl DocumentBuilder {
    pub fn new(config: &IngestConfig) -> Self {
        Self {
            strip_language_metadata: config.strip_language_metadata,
        }
    }

    /// Returns `None` when the chunk has no content worth persisting.
    pub fn build(&self, chunk: &Chunk) -> Option<Passage> {
        let content = chunk.text.trim();
        if content.is_empty() {
            return None;
        }

        let mut metadata = chunk.metadata.to_json_map();

        if self.strip_language_metadata {
            metadata.remove("languages");
        }

        let source = chunk.metadata.filename.clone().unwrap_or_default();
        metadata
            .entry("source".to_string())
            .or_insert_with(|| serde_json::Value::String(source));
        metadata.insert(
            "ingested_at".to_string(),
            serde_json::Value::String(Utc::now().to_rfc3339()),
        );

        Some(Passage::new(content, metadata))
    }
}
