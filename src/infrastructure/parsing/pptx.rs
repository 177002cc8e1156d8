//! PowerPoint (.pptx) element extractor
//!
//! A .pptx file is a zip archive with one XML part per slide under
//! `ppt/slides/slideN.xml`. Visible text lives in `<a:t>` runs grouped
//! into `<a:p>` paragraphs. The first non-empty paragraph of each slide
//! is treated as that slide's title.

use std::io::{Cursor, Read};

use async_trait::async_trait;
use quick_xml::Reader;
use quick_xml::events::Event;

use super::{ElementParser, ParserInput};
use crate::domain::{Element, ElementKind, ElementMetadata, IngestError};

/// Parser for PowerPoint presentations
#[derive(Debug, Clone, Default)]
pub struct PptxParser;

impl PptxParser {
    pub fn new() -> Self {
        Self
    }

    /// Collect the text paragraphs of a single slide, in document order.
    fn slide_paragraphs(xml: &str) -> Vec<String> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut paragraphs = Vec::new();
        let mut current = String::new();
        let mut in_text_run = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    if e.local_name().as_ref() == b"t" {
                        in_text_run = true;
                    }
                }
                Ok(Event::Text(e)) => {
                    if in_text_run {
                        if let Ok(text) = e.unescape() {
                            current.push_str(&text);
                        }
                    }
                }
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"t" => in_text_run = false,
                    b"p" => {
                        let paragraph = current.trim().to_string();
                        if !paragraph.is_empty() {
                            paragraphs.push(paragraph);
                        }
                        current.clear();
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(_) => break,
                _ => {}
            }
        }

        let trailing = current.trim();
        if !trailing.is_empty() {
            paragraphs.push(trailing.to_string());
        }

        paragraphs
    }

    /// Slide part names sorted by slide number rather than lexically,
    /// so slide10 follows slide9.
    fn sorted_slide_names<R: Read + std::io::Seek>(archive: &zip::ZipArchive<R>) -> Vec<String> {
        let slide_number = |name: &str| {
            name.trim_start_matches("ppt/slides/slide")
                .trim_end_matches(".xml")
                .parse::<u32>()
                .unwrap_or(0)
        };

        let mut names: Vec<String> = archive
            .file_names()
            .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
            .map(|name| name.to_string())
            .collect();

        names.sort_by_key(|name| slide_number(name));
        names
    }
}

#[async_trait]
impl ElementParser for PptxParser {
    fn supported_extensions(&self) -> &[&str] {
        &["pptx"]
    }

    async fn parse(&self, input: ParserInput) -> Result<Vec<Element>, IngestError> {
        let cursor = Cursor::new(input.bytes);
        let mut archive = zip::ZipArchive::new(cursor)
            .map_err(|e| IngestError::extraction(&input.filename, e.to_string()))?;

        let slide_names = Self::sorted_slide_names(&archive);
        let mut elements = Vec::new();

        for (index, slide_name) in slide_names.iter().enumerate() {
            let slide_number = (index + 1) as u32;

            let mut xml = String::new();
            {
                let mut part = archive
                    .by_name(slide_name)
                    .map_err(|e| IngestError::extraction(&input.filename, e.to_string()))?;
                part.read_to_string(&mut xml)
                    .map_err(|e| IngestError::extraction(&input.filename, e.to_string()))?;
            }

            let metadata = ElementMetadata::new()
                .with_filename(&input.filename)
                .with_page_number(slide_number);

            for (position, paragraph) in Self::slide_paragraphs(&xml).into_iter().enumerate() {
                let kind = if position == 0 {
                    ElementKind::Title
                } else {
                    ElementKind::NarrativeText
                };
                elements.push(Element::new(kind, paragraph, metadata.clone()));
            }
        }

        Ok(elements)
    }
}
