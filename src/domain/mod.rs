//! Domain types for the ingestion pipeline
//!
//! This module provides:
//! - `Element`: one typed unit of extracted document structure
//! - `Passage` / `PassageDocument`: the units built and persisted
//! - `IngestError`: the error taxonomy shared across stages

pub mod element;
pub mod error;
pub mod passage;

pub use element::{Element, ElementKind, ElementMetadata};
pub use error::IngestError;
pub use passage::{Passage, PassageDocument};
