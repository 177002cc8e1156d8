//! Typed units of extracted document structure

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Structural category of an extracted element.
///
/// Remote extraction services tag elements with a richer vocabulary;
/// anything we do not recognize collapses into `NarrativeText`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    Title,
    NarrativeText,
    ListItem,
    Table,
}

impl ElementKind {
    /// Map a remote service's element tag onto our vocabulary.
    pub fn from_remote_tag(tag: &str) -> Self {
        match tag {
            "Title" | "Header" => Self::Title,
            "ListItem" => Self::ListItem,
            "Table" => Self::Table,
            _ => Self::NarrativeText,
        }
    }

    pub fn is_title(&self) -> bool {
        matches!(self, Self::Title)
    }
}

/// Structural facts about where an element came from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementMetadata {
    /// Originating file name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Page or slide number (1-indexed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    /// Detected languages, if the extractor reports them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
}

impl ElementMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_page_number(mut self, page: u32) -> Self {
        self.page_number = Some(page);
        self
    }

    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        self.languages = Some(languages);
        self
    }

    /// Convert to a JSON value map for persistence
    pub fn to_json_map(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();

        if let Some(ref filename) = self.filename {
            map.insert(
                "filename".to_string(),
                serde_json::Value::String(filename.clone()),
            );
        }

        if let Some(page) = self.page_number {
            map.insert("page_number".to_string(), serde_json::json!(page));
        }

        if let Some(ref languages) = self.languages {
            map.insert("languages".to_string(), serde_json::json!(languages));
        }

        map
    }
}

/// One atomic unit of extracted document structure.
///
/// Immutable after creation; produced by parsers, consumed by the chunker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub text: String,
    #[serde(default)]
    pub metadata: ElementMetadata,
}

impl Element {
    pub fn new(kind: ElementKind, text: impl Into<String>, metadata: ElementMetadata) -> Self {
        Self {
            kind,
            text: text.into(),
            metadata,
        }
    }

    pub fn title(text: impl Into<String>, metadata: ElementMetadata) -> Self {
        Self::new(ElementKind::Title, text, metadata)
    }

    pub fn narrative(text: impl Into<String>, metadata: ElementMetadata) -> Self {
        Self::new(ElementKind::NarrativeText, text, metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_tag_mapping() {
        assert_eq!(ElementKind::from_remote_tag("Title"), ElementKind::Title);
        assert_eq!(ElementKind::from_remote_tag("Table"), ElementKind::Table);
        assert_eq!(
            ElementKind::from_remote_tag("ListItem"),
            ElementKind::ListItem
        );
        assert_eq!(
            ElementKind::from_remote_tag("UncategorizedText"),
            ElementKind::NarrativeText
        );
        assert_eq!(
            ElementKind::from_remote_tag("FigureCaption"),
            ElementKind::NarrativeText
        );
    }

    #[test]
    fn test_metadata_to_json_map() {
        let meta = ElementMetadata::new()
            .with_filename("deck.pptx")
            .with_page_number(3);

        let map = meta.to_json_map();
        assert_eq!(
            map.get("filename"),
            Some(&serde_json::Value::String("deck.pptx".to_string()))
        );
        assert_eq!(map.get("page_number"), Some(&serde_json::json!(3)));
        assert!(!map.contains_key("languages"));
    }

    #[test]
    fn test_element_builders() {
        let el = Element::title("Intro", ElementMetadata::new().with_filename("a.md"));
        assert!(el.kind.is_title());
        assert_eq!(el.text, "Intro");
        assert_eq!(el.metadata.filename.as_deref(), Some("a.md"));
    }
}
