//! Remote document-structure extraction

pub mod remote;

pub use remote::RemoteExtractionClient;

use async_trait::async_trait;

use crate::domain::{Element, IngestError};

/// Extracts typed elements from a raw document via a structure-aware service.
///
/// Used for formats the local parsers cannot segment reliably, currently
/// scanned or layout-heavy PDFs.
#[async_trait]
pub trait StructureExtractor: Send + Sync {
    async fn extract(&self, filename: &str, bytes: &[u8]) -> Result<Vec<Element>, IngestError>;
}
