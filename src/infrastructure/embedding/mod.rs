//! Passage embedding

pub mod http_client;
pub mod remote;

pub use http_client::{HttpClient, HttpClientTrait};
pub use remote::RemoteEmbedder;

use async_trait::async_trait;

/// Converts passage text into fixed-dimension vectors.
///
/// Embedding never fails visibly: any remote failure degrades to the
/// all-zero vector of the configured dimension, and the store decides
/// what to do with those rows.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Vec<f32>;

    fn dimensions(&self) -> usize;

    /// Sequential application of `embed`; no remote batching.
    async fn embed_many(&self, texts: &[String]) -> Vec<Vec<f32>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await);
        }
        vectors
    }
}
