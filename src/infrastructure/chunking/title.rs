//! Title-anchored chunking
//!
//! Walks the element sequence in order with one open chunk. A title
//! closes the open chunk once it has accumulated more than
//! `combine_text_under_n_chars` characters; short sections are folded
//! into the following one instead of producing tiny passages. Two
//! consecutive titles never share a chunk.

use tracing::debug;

use super::{Chunk, Chunker};
use crate::config::ChunkingConfig;
use crate::domain::Element;

pub struct TitleChunker {
    combine_text_under_n_chars: usize,
    /// Advisory sizing target. Oversized single elements pass through
    /// intact; downstream truncation handles the hard ceiling.
    max_characters: usize,
}

impl TitleChunker {
    pub fn new(config: &ChunkingConfig) -> Self {
        Self {
            combine_text_under_n_chars: config.combine_text_under_n_chars,
            max_characters: config.max_characters,
        }
    }

    fn flush(&self, open: &mut Option<Chunk>, out: &mut Vec<Chunk>) {
        if let Some(chunk) = open.take() {
            if !chunk.text.trim().is_empty() {
                let chars = chunk.text.chars().count();
                if chars > self.max_characters {
                    debug!(
                        chars,
                        max = self.max_characters,
                        "chunk exceeds advisory size target"
                    );
                }
                out.push(chunk);
            }
        }
    }
}

impl Chunker for TitleChunker {
    fn chunk(&self, elements: &[Element]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut open: Option<Chunk> = None;
        let mut last_was_title = false;

        for element in elements {
            let text = element.text.trim();
            if text.is_empty() {
                continue;
            }

            if element.kind.is_title() {
                let close = match &open {
                    // A short section folds into the next one, but two
                    // adjacent titles always get separate chunks. The
                    // threshold is in characters, not bytes.
                    Some(chunk) => {
                        chunk.text.chars().count() > self.combine_text_under_n_chars
                            || last_was_title
                    }
                    None => false,
                };
                if close {
                    self.flush(&mut open, &mut chunks);
                }
            }

            match &mut open {
                Some(chunk) => {
                    chunk.text.push('\n');
                    chunk.text.push_str(text);
                }
                None => {
                    open = Some(Chunk {
                        text: text.to_string(),
                        metadata: element.metadata.clone(),
                    });
                }
            }

            last_was_title = element.kind.is_title();
        }

        self.flush(&mut open, &mut chunks);
        chunks
    }
}
