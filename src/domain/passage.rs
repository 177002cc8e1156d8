//! Persisted passage types

use std::collections::HashMap;

/// A normalized passage ready for embedding: trimmed non-empty text plus
/// enriched metadata. The `source` key is always present.
#[derive(Debug, Clone)]
pub struct Passage {
    pub content: String,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Passage {
    pub fn new(content: impl Into<String>, metadata: HashMap<String, serde_json::Value>) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }

    pub fn source(&self) -> Option<&str> {
        self.metadata.get("source").and_then(|v| v.as_str())
    }
}

/// The unit persisted to the vector store
#[derive(Debug, Clone)]
pub struct PassageDocument {
    pub content: String,
    pub metadata: HashMap<String, serde_json::Value>,
    pub embedding: Vec<f32>,
}

impl PassageDocument {
    pub fn new(passage: Passage, embedding: Vec<f32>) -> Self {
        Self {
            content: passage.content,
            metadata: passage.metadata,
            embedding,
        }
    }

    /// True when the embedding is the all-zero fallback produced on
    /// embedding failure. Used by the store's skip policy.
    pub fn is_zero_embedding(&self) -> bool {
        self.embedding.iter().all(|v| *v == 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_accessor() {
        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), serde_json::json!("report.pdf"));
        let passage = Passage::new("body", metadata);
        assert_eq!(passage.source(), Some("report.pdf"));
    }

    #[test]
    fn test_zero_embedding_detection() {
        let passage = Passage::new("text", HashMap::new());
        let doc = PassageDocument::new(passage.clone(), vec![0.0, 0.0, 0.0]);
        assert!(doc.is_zero_embedding());

        let doc = PassageDocument::new(passage, vec![0.0, 0.1, 0.0]);
        assert!(!doc.is_zero_embedding());
    }
}
