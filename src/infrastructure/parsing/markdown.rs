//! Markdown element extractor

use async_trait::async_trait;
use pulldown_cmark::{Event, Options, Parser, Tag};

use super::{ElementParser, ParserInput};
use crate::domain::{Element, ElementKind, ElementMetadata, IngestError};

/// Parser for Markdown files
#[derive(Debug, Clone, Default)]
pub struct MarkdownParser;

impl MarkdownParser {
    pub fn new() -> Self {
        Self
    }

    fn extract_elements(markdown: &str, metadata: &ElementMetadata) -> Vec<Element> {
        let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES);

        let mut elements = Vec::new();
        let mut buffer = String::new();
        let mut kind: Option<ElementKind> = None;
        let mut table_rows: Vec<Vec<String>> = Vec::new();
        let mut in_table = false;

        let mut flush = |buffer: &mut String, kind: &mut Option<ElementKind>,
                         elements: &mut Vec<Element>| {
            if let Some(k) = kind.take() {
                let text = buffer.trim().to_string();
                if !text.is_empty() {
                    elements.push(Element::new(k, text, metadata.clone()));
                }
            }
            buffer.clear();
        };

        for event in parser {
            match event {
                Event::Start(Tag::Heading(..)) => {
                    flush(&mut buffer, &mut kind, &mut elements);
                    kind = Some(ElementKind::Title);
                }
                Event::Start(Tag::Paragraph) if !in_table => {
                    flush(&mut buffer, &mut kind, &mut elements);
                    kind = Some(ElementKind::NarrativeText);
                }
                Event::Start(Tag::Item) => {
                    flush(&mut buffer, &mut kind, &mut elements);
                    kind = Some(ElementKind::ListItem);
                }
                Event::Start(Tag::CodeBlock(_)) => {
                    flush(&mut buffer, &mut kind, &mut elements);
                    kind = Some(ElementKind::NarrativeText);
                }
                Event::End(Tag::Heading(..))
                | Event::End(Tag::Item)
                | Event::End(Tag::CodeBlock(_)) => {
                    flush(&mut buffer, &mut kind, &mut elements);
                }
                Event::End(Tag::Paragraph) if !in_table => {
                    flush(&mut buffer, &mut kind, &mut elements);
                }
                Event::Start(Tag::Table(_)) => {
                    flush(&mut buffer, &mut kind, &mut elements);
                    in_table = true;
                    table_rows.clear();
                }
                Event::Start(Tag::TableHead) | Event::Start(Tag::TableRow) => {
                    table_rows.push(Vec::new());
                }
                Event::Start(Tag::TableCell) => {
                    buffer.clear();
                }
                Event::End(Tag::TableCell) => {
                    if let Some(row) = table_rows.last_mut() {
                        row.push(buffer.trim().to_string());
                    }
                    buffer.clear();
                }
                Event::End(Tag::Table(_)) => {
                    in_table = false;
                    let text = table_rows
                        .iter()
                        .map(|row| row.join(" | "))
                        .collect::<Vec<_>>()
                        .join("\n")
                        .trim()
                        .to_string();
                    if !text.is_empty() {
                        elements.push(Element::new(ElementKind::Table, text, metadata.clone()));
                    }
                    table_rows.clear();
                }
                Event::Text(t) | Event::Code(t) => {
                    buffer.push_str(&t);
                }
                Event::SoftBreak | Event::HardBreak => {
                    buffer.push(' ');
                }
                _ => {}
            }
        }

        // Trailing text outside any closed block
        if let Some(k) = kind {
            let text = buffer.trim().to_string();
            if !text.is_empty() {
                elements.push(Element::new(k, text, metadata.clone()));
            }
        }

        elements
    }
}

#[async_trait]
impl ElementParser for MarkdownParser {
    fn supported_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    async fn parse(&self, input: ParserInput) -> Result<Vec<Element>, IngestError> {
        let raw = input.text()?;
        let metadata = ElementMetadata::new().with_filename(&input.filename);
        Ok(Self::extract_elements(&raw, &metadata))
    }
}
