//! Format-dispatching parse layer
//!
//! Each supported format registers an [`ElementParser`] keyed by file
//! extension; new formats are additive registrations, not new branches.

pub mod html;
pub mod markdown;
pub mod pdf;
pub mod pptx;

pub use html::HtmlParser;
pub use markdown::MarkdownParser;
pub use pdf::PdfParser;
pub use pptx::PptxParser;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Element, IngestError};

/// Raw file handed to a parser
#[derive(Debug, Clone)]
pub struct ParserInput {
    pub bytes: Vec<u8>,
    pub filename: String,
}

impl ParserInput {
    pub fn new(bytes: impl Into<Vec<u8>>, filename: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            filename: filename.into(),
        }
    }

    /// Decode the content as UTF-8 text
    pub fn text(&self) -> Result<String, IngestError> {
        String::from_utf8(self.bytes.clone())
            .map_err(|e| IngestError::extraction(&self.filename, format!("invalid UTF-8: {}", e)))
    }
}

/// A format-specific extractor producing a finite element sequence
#[async_trait]
pub trait ElementParser: Send + Sync {
    /// File extensions this parser handles, lowercase without the dot
    fn supported_extensions(&self) -> &[&str];

    async fn parse(&self, input: ParserInput) -> Result<Vec<Element>, IngestError>;
}

/// Maps file extensions to parsers.
#[derive(Default)]
pub struct ParserRegistry {
    parsers: HashMap<String, Arc<dyn ElementParser>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, parser: Arc<dyn ElementParser>) {
        for ext in parser.supported_extensions() {
            self.parsers.insert(ext.to_lowercase(), Arc::clone(&parser));
        }
    }

    pub fn with_parser(mut self, parser: Arc<dyn ElementParser>) -> Self {
        self.register(parser);
        self
    }

    pub fn supports(&self, extension: &str) -> bool {
        self.parsers.contains_key(&extension.to_lowercase())
    }

    /// Parse one file, dispatching by extension. Unknown extensions are
    /// skipped with a notice, not treated as errors.
    pub async fn parse_file(&self, path: &Path) -> Result<Vec<Element>, IngestError> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let Some(parser) = self.parsers.get(&extension) else {
            tracing::warn!(file = %filename, "Unsupported file type, skipping");
            return Ok(Vec::new());
        };

        tracing::info!(file = %filename, "Parsing file");

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| IngestError::io(format!("failed to read '{}': {}", filename, e)))?;

        parser.parse(ParserInput::new(bytes, filename)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ElementMetadata;

    struct StubParser;

    #[async_trait]
    impl ElementParser for StubParser {
        fn supported_extensions(&self) -> &[&str] {
            &["stub", "stb"]
        }

        async fn parse(&self, input: ParserInput) -> Result<Vec<Element>, IngestError> {
            Ok(vec![Element::narrative(
                input.text()?,
                ElementMetadata::new().with_filename(input.filename),
            )])
        }
    }

    #[test]
    fn test_registry_registers_all_extensions() {
        let registry = ParserRegistry::new().with_parser(Arc::new(StubParser));
        assert!(registry.supports("stub"));
        assert!(registry.supports("STB"));
        assert!(!registry.supports("pdf"));
    }

    #[tokio::test]
    async fn test_parse_file_dispatches_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.stub");
        std::fs::write(&path, "hello").unwrap();

        let registry = ParserRegistry::new().with_parser(Arc::new(StubParser));
        let elements = registry.parse_file(&path).await.unwrap();

        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].text, "hello");
        assert_eq!(elements[0].metadata.filename.as_deref(), Some("note.stub"));
    }

    #[tokio::test]
    async fn test_unsupported_extension_yields_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.xyz");
        std::fs::write(&path, "data").unwrap();

        let registry = ParserRegistry::new().with_parser(Arc::new(StubParser));
        let elements = registry.parse_file(&path).await.unwrap();

        assert!(elements.is_empty());
    }
}
