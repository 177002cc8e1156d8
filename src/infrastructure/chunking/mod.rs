//! Merging extracted elements into embeddable passages

pub mod title;

pub use title::TitleChunker;

use crate::domain::ElementMetadata;

/// A title-anchored merge of one or more consecutive elements.
///
/// Transient; exists only between extraction and document building.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Newline-joined element texts
    pub text: String,
    /// Metadata of the element that opened the chunk
    pub metadata: ElementMetadata,
}

/// Groups a flat element sequence into chunks.
pub trait Chunker: Send + Sync {
    fn chunk(&self, elements: &[crate::domain::Element]) -> Vec<Chunk>;
}
