//! Client for the Unstructured partition API
//!
//! The service takes a multipart upload and returns a flat JSON array of
//! typed elements. Requests run with the `hi_res` strategy so tables and
//! titles survive layout-heavy documents.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::StructureExtractor;
use crate::config::ExtractionConfig;
use crate::domain::{Element, ElementKind, ElementMetadata, IngestError};

const PARTITION_PATH: &str = "/general/v0/general";

/// One element as returned by the partition endpoint.
#[derive(Debug, Deserialize)]
struct RemoteElement {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    metadata: Option<RemoteMetadata>,
}

#[derive(Debug, Deserialize)]
struct RemoteMetadata {
    #[serde(default)]
    page_number: Option<u32>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    languages: Option<Vec<String>>,
}

/// HTTP client for the remote extraction service
pub struct RemoteExtractionClient {
    client: reqwest::Client,
    config: ExtractionConfig,
}

impl RemoteExtractionClient {
    pub fn new(config: ExtractionConfig) -> Result<Self, IngestError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| IngestError::configuration(format!("http client: {e}")))?;

        Ok(Self { client, config })
    }

    fn partition_url(&self) -> String {
        format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            PARTITION_PATH
        )
    }

    fn build_form(&self, filename: &str, bytes: &[u8]) -> Form {
        let mut form = Form::new()
            .part(
                "files",
                Part::bytes(bytes.to_vec()).file_name(filename.to_string()),
            )
            .text("strategy", "hi_res")
            .text("hi_res_model_name", self.config.hi_res_model_name.clone())
            .text(
                "pdf_infer_table_structure",
                self.config.infer_table_structure.to_string(),
            );

        for language in &self.config.languages {
            form = form.text("languages", language.clone());
        }

        form
    }

    fn into_elements(remote: Vec<RemoteElement>, fallback_filename: &str) -> Vec<Element> {
        remote
            .into_iter()
            .filter(|element| !element.text.trim().is_empty())
            .map(|element| {
                let mut metadata = ElementMetadata::new();
                let remote_meta = element.metadata.unwrap_or(RemoteMetadata {
                    page_number: None,
                    filename: None,
                    languages: None,
                });

                let filename = remote_meta
                    .filename
                    .unwrap_or_else(|| fallback_filename.to_string());
                metadata = metadata.with_filename(filename);

                if let Some(page) = remote_meta.page_number {
                    metadata = metadata.with_page_number(page);
                }
                if let Some(languages) = remote_meta.languages {
                    metadata = metadata.with_languages(languages);
                }

                Element::new(
                    ElementKind::from_remote_tag(&element.kind),
                    element.text.trim(),
                    metadata,
                )
            })
            .collect()
    }
}

#[async_trait]
impl StructureExtractor for RemoteExtractionClient {
    async fn extract(&self, filename: &str, bytes: &[u8]) -> Result<Vec<Element>, IngestError> {
        debug!(filename, bytes = bytes.len(), "submitting for extraction");

        let mut request = self
            .client
            .post(self.partition_url())
            .multipart(self.build_form(filename, bytes));

        if !self.config.api_key.is_empty() {
            request = request.header("unstructured-api-key", &self.config.api_key);
        }

        let response = request.send().await.map_err(|e| {
            IngestError::provider("unstructured", format!("request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IngestError::provider(
                "unstructured",
                format!("status {status}: {body}"),
            ));
        }

        let remote: Vec<RemoteElement> = response.json().await.map_err(|e| {
            IngestError::provider("unstructured", format!("malformed response: {e}"))
        })?;

        debug!(filename, elements = remote.len(), "extraction complete");
        Ok(Self::into_elements(remote, filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_url_joins_without_double_slash() {
        let client = RemoteExtractionClient::new(ExtractionConfig {
            base_url: "https://api.unstructured.io/".to_string(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            client.partition_url(),
            "https://api.unstructured.io/general/v0/general"
        );
    }

    #[test]
    fn test_response_mapping() {
        let raw = serde_json::json!([
            {
                "type": "Title",
                "text": "Introduction",
                "metadata": {"page_number": 1, "filename": "report.pdf"}
            },
            {
                "type": "NarrativeText",
                "text": "  Body paragraph.  ",
                "metadata": {"page_number": 1, "filename": "report.pdf", "languages": ["eng"]}
            },
            {
                "type": "Image",
                "text": "",
                "metadata": {"page_number": 2}
            }
        ]);
        let remote: Vec<RemoteElement> = serde_json::from_value(raw).unwrap();

        let elements = RemoteExtractionClient::into_elements(remote, "report.pdf");

        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].kind, ElementKind::Title);
        assert_eq!(elements[0].metadata.page_number, Some(1));
        assert_eq!(elements[1].text, "Body paragraph.");
        assert_eq!(
            elements[1].metadata.languages,
            Some(vec!["eng".to_string()])
        );
    }

    #[test]
    fn test_missing_metadata_falls_back_to_input_filename() {
        let raw = serde_json::json!([{"type": "Header", "text": "Cover"}]);
        let remote: Vec<RemoteElement> = serde_json::from_value(raw).unwrap();

        let elements = RemoteExtractionClient::into_elements(remote, "scan.pdf");

        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].kind, ElementKind::Title);
        assert_eq!(elements[0].metadata.filename.as_deref(), Some("scan.pdf"));
    }
}
