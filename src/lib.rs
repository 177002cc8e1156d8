//! ragline
//!
//! A batch document ingestion pipeline for retrieval-augmented search:
//! - Parses heterogeneous documents (Markdown, HTML, PPTX, PDF) into
//!   typed structural elements
//! - Merges elements into title-anchored chunks with tunable size bounds
//! - Embeds each passage via a remote embedding service with truncation
//!   and zero-vector fallback
//! - Writes (content, metadata, embedding) rows into PostgreSQL with
//!   pgvector, committing in bounded batches

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
