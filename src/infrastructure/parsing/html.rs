//! HTML element extractor

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use super::{ElementParser, ParserInput};
use crate::domain::{Element, ElementKind, ElementMetadata, IngestError};

/// Parser for HTML files
#[derive(Debug, Clone, Default)]
pub struct HtmlParser;

impl HtmlParser {
    pub fn new() -> Self {
        Self
    }

    fn extract_elements(document: &Html, metadata: &ElementMetadata) -> Vec<Element> {
        let mut elements = Vec::new();

        if let Ok(body_selector) = Selector::parse("body") {
            if let Some(body) = document.select(&body_selector).next() {
                Self::walk(&body, metadata, &mut elements);
            }
        }

        elements
    }

    fn walk(element: &ElementRef, metadata: &ElementMetadata, out: &mut Vec<Element>) {
        for node in element.children() {
            let Some(el) = ElementRef::wrap(node) else {
                continue;
            };

            let tag_name = el.value().name();

            if matches!(tag_name, "script" | "style" | "noscript" | "head") {
                continue;
            }

            match tag_name {
                "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                    Self::push(ElementKind::Title, &Self::inner_text(&el), metadata, out);
                }
                "p" => {
                    Self::push(
                        ElementKind::NarrativeText,
                        &Self::inner_text(&el),
                        metadata,
                        out,
                    );
                }
                "li" => {
                    Self::push(ElementKind::ListItem, &Self::inner_text(&el), metadata, out);
                }
                "table" => {
                    Self::push(ElementKind::Table, &Self::table_text(&el), metadata, out);
                }
                _ => {
                    // Container tags: recurse into div/section/article/ul/...
                    Self::walk(&el, metadata, out);
                }
            }
        }
    }

    fn push(kind: ElementKind, text: &str, metadata: &ElementMetadata, out: &mut Vec<Element>) {
        let text = text.trim();
        if !text.is_empty() {
            out.push(Element::new(kind, text, metadata.clone()));
        }
    }

    fn inner_text(element: &ElementRef) -> String {
        let text = element.text().collect::<String>();
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn table_text(table: &ElementRef) -> String {
        let (Ok(row_selector), Ok(cell_selector)) =
            (Selector::parse("tr"), Selector::parse("td, th"))
        else {
            return Self::inner_text(table);
        };

        table
            .select(&row_selector)
            .map(|row| {
                row.select(&cell_selector)
                    .map(|cell| Self::inner_text(&cell))
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl ElementParser for HtmlParser {
    fn supported_extensions(&self) -> &[&str] {
        &["html", "htm"]
    }

    async fn parse(&self, input: ParserInput) -> Result<Vec<Element>, IngestError> {
        let raw = input.text()?;
        let document = Html::parse_document(&raw);
        let metadata = ElementMetadata::new().with_filename(&input.filename);
        Ok(Self::extract_elements(&document, &metadata))
    }
}
