//! Remote embedding provider
//!
//! Calls an OpenAI-compatible embeddings endpoint. Two response
//! generations are tolerated: `data[0].embedding` and
//! `result.embedding`. Failures of any kind degrade to the all-zero
//! vector so one bad passage cannot stall a run.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{Embedder, HttpClientTrait};
use crate::config::EmbeddingConfig;
use crate::domain::IngestError;

pub struct RemoteEmbedder<C: HttpClientTrait> {
    client: C,
    base_url: String,
    api_key: String,
    dimensions: usize,
    max_input_chars: usize,
}

impl<C: HttpClientTrait> RemoteEmbedder<C> {
    pub fn new(client: C, config: &EmbeddingConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            dimensions: config.dimensions,
            max_input_chars: config.max_input_chars,
        }
    }

    fn zero_vector(&self) -> Vec<f32> {
        vec![0.0; self.dimensions]
    }

    /// Truncate to the configured character bound, on a char boundary.
    /// Lossy and silent; the remote service rejects longer inputs.
    fn truncate<'a>(&self, text: &'a str) -> &'a str {
        match text.char_indices().nth(self.max_input_chars) {
            Some((idx, _)) => &text[..idx],
            None => text,
        }
    }

    async fn request_embedding(&self, text: &str) -> Result<Vec<f32>, IngestError> {
        let body = serde_json::json!({ "input": [text] });

        let auth = format!("Bearer {}", self.api_key);
        let mut headers = Vec::new();
        if !self.api_key.is_empty() {
            headers.push(("Authorization", auth.as_str()));
        }

        let response = self.client.post_json(&self.base_url, headers, &body).await?;

        // Some providers signal failure inside a 200 body.
        if let Some(code) = response.get("error_code") {
            let message = response
                .get("error_msg")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown");
            return Err(IngestError::provider(
                "embedding",
                format!("error_code {code}: {message}"),
            ));
        }

        let vector = Self::probe_embedding(&response).ok_or_else(|| {
            IngestError::provider("embedding", "no embedding found in response")
        })?;

        if vector.len() != self.dimensions {
            return Err(IngestError::provider(
                "embedding",
                format!(
                    "dimension mismatch: got {}, expected {}",
                    vector.len(),
                    self.dimensions
                ),
            ));
        }

        Ok(vector)
    }

    /// Probe both known response shapes and pick whichever is present.
    fn probe_embedding(response: &serde_json::Value) -> Option<Vec<f32>> {
        let raw = response
            .pointer("/data/0/embedding")
            .or_else(|| response.pointer("/result/embedding"))?;

        raw.as_array().map(|values| {
            values
                .iter()
                .filter_map(|v| v.as_f64())
                .map(|v| v as f32)
                .collect()
        })
    }
}

#[async_trait]
impl<C: HttpClientTrait> Embedder for RemoteEmbedder<C> {
    async fn embed(&self, text: &str) -> Vec<f32> {
        if text.trim().is_empty() {
            debug!("empty input, returning zero vector without a remote call");
            return self.zero_vector();
        }

        let truncated = self.truncate(text);

        match self.request_embedding(truncated).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!(error = %e, "embedding failed, using zero vector");
                self.zero_vector()
            }
        }
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::embedding::http_client::mock::MockHttpClient;

    const URL: &str = "https://embeddings.test/v2";

    fn config(dimensions: usize, max_chars: usize) -> EmbeddingConfig {
        EmbeddingConfig {
            base_url: URL.to_string(),
            api_key: "test-key".to_string(),
            dimensions,
            max_input_chars: max_chars,
            ..Default::default()
        }
    }

    fn data_shape(vector: &[f32]) -> serde_json::Value {
        serde_json::json!({ "data": [{ "embedding": vector }] })
    }

    #[tokio::test]
    async fn test_empty_input_skips_remote_call() {
        let client = MockHttpClient::new();
        let embedder = RemoteEmbedder::new(client, &config(4, 384));

        let vector = embedder.embed("   ").await;

        assert_eq!(vector, vec![0.0; 4]);
        assert_eq!(embedder.client.request_count(), 0);
    }

    #[tokio::test]
    async fn test_data_shape_parsed() {
        let client = MockHttpClient::new().with_response(URL, data_shape(&[0.1, 0.2, 0.3]));
        let embedder = RemoteEmbedder::new(client, &config(3, 384));

        let vector = embedder.embed("hello").await;

        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_result_shape_parsed() {
        let client = MockHttpClient::new()
            .with_response(URL, serde_json::json!({ "result": { "embedding": [1.0, 2.0] } }));
        let embedder = RemoteEmbedder::new(client, &config(2, 384));

        let vector = embedder.embed("hello").await;

        assert_eq!(vector, vec![1.0, 2.0]);
    }

    #[tokio::test]
    async fn test_long_input_truncated_before_sending() {
        let client = MockHttpClient::new().with_response(URL, data_shape(&[0.5, 0.5]));
        let embedder = RemoteEmbedder::new(client, &config(2, 10));

        let long_text = "a".repeat(50);
        let vector = embedder.embed(&long_text).await;

        assert_eq!(vector.len(), 2);
        let requests = embedder.client.requests();
        assert_eq!(requests.len(), 1);
        let sent = requests[0].1["input"][0].as_str().unwrap();
        assert_eq!(sent.chars().count(), 10);
    }

    #[tokio::test]
    async fn test_truncation_respects_char_boundaries() {
        let client = MockHttpClient::new().with_response(URL, data_shape(&[0.5]));
        let embedder = RemoteEmbedder::new(client, &config(1, 3));

        // Multi-byte characters must not be split mid-codepoint.
        embedder.embed("日本語テキスト").await;

        let requests = embedder.client.requests();
        let sent = requests[0].1["input"][0].as_str().unwrap();
        assert_eq!(sent, "日本語");
    }

    #[tokio::test]
    async fn test_transport_error_yields_zero_vector() {
        let client = MockHttpClient::new().with_error(URL, "HTTP 500: internal");
        let embedder = RemoteEmbedder::new(client, &config(3, 384));

        let vector = embedder.embed("hello").await;

        assert_eq!(vector, vec![0.0; 3]);
    }

    #[tokio::test]
    async fn test_error_code_in_200_body_yields_zero_vector() {
        let client = MockHttpClient::new().with_response(
            URL,
            serde_json::json!({ "error_code": 336103, "error_msg": "input too long" }),
        );
        let embedder = RemoteEmbedder::new(client, &config(3, 384));

        let vector = embedder.embed("hello").await;

        assert_eq!(vector, vec![0.0; 3]);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_yields_zero_vector() {
        let client = MockHttpClient::new().with_response(URL, data_shape(&[0.1, 0.2]));
        let embedder = RemoteEmbedder::new(client, &config(3, 384));

        let vector = embedder.embed("hello").await;

        assert_eq!(vector, vec![0.0; 3]);
    }

    #[tokio::test]
    async fn test_embed_many_is_sequential_per_text() {
        let client = MockHttpClient::new().with_response(URL, data_shape(&[0.1, 0.2]));
        let embedder = RemoteEmbedder::new(client, &config(2, 384));

        let texts = vec!["one".to_string(), "two".to_string(), "".to_string()];
        let vectors = embedder.embed_many(&texts).await;

        assert_eq!(vectors.len(), 3);
        assert_eq!(vectors[2], vec![0.0; 2]);
        // The empty text never reaches the wire.
        assert_eq!(embedder.client.request_count(), 2);
    }
}
