//! pgvector-backed document store
//!
//! One table holds every ingested passage: trimmed text, a JSONB
//! metadata map, and a fixed-dimension embedding column. Inserts commit
//! in bounded batches so a mid-run failure loses at most one batch.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, warn};

use super::{DocumentSink, WriteStats};
use crate::config::{EmbedFailurePolicy, StoreConfig};
use crate::domain::{IngestError, PassageDocument};

pub struct PgVectorStore {
    pool: PgPool,
    table_name: String,
    dimensions: usize,
    batch_size: usize,
    zero_policy: EmbedFailurePolicy,
}

impl PgVectorStore {
    pub fn new(
        pool: PgPool,
        config: &StoreConfig,
        dimensions: usize,
        zero_policy: EmbedFailurePolicy,
    ) -> Self {
        Self {
            pool,
            table_name: config.table_name.clone(),
            dimensions,
            batch_size: config.batch_size.max(1),
            zero_policy,
        }
    }

    async fn insert_row(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        document: &PassageDocument,
    ) -> Result<(), IngestError> {
        let query = format!(
            "INSERT INTO {} (content, metadata, embedding) VALUES ($1, $2, $3::vector)",
            self.table_name
        );

        let metadata = serde_json::to_value(&document.metadata)
            .map_err(|e| IngestError::storage(format!("metadata serialization: {e}")))?;

        sqlx::query(&query)
            .bind(&document.content)
            .bind(metadata)
            .bind(embedding_to_pgvector(&document.embedding))
            .execute(&mut **tx)
            .await
            .map_err(|e| IngestError::storage(format!("insert failed: {e}")))?;

        Ok(())
    }

    fn should_skip(&self, document: &PassageDocument) -> Option<Skip> {
        if document.content.trim().is_empty() {
            return Some(Skip::Empty);
        }
        if self.zero_policy == EmbedFailurePolicy::Skip && document.is_zero_embedding() {
            return Some(Skip::ZeroEmbedding);
        }
        None
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Skip {
    Empty,
    ZeroEmbedding,
}

#[async_trait]
impl DocumentSink for PgVectorStore {
    async fn ensure_schema(&self) -> Result<(), IngestError> {
        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                IngestError::storage(format!("failed to create vector extension: {e}"))
            })?;

        let query = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                content TEXT NOT NULL,
                metadata JSONB DEFAULT '{{}}',
                embedding vector({}),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            self.table_name, self.dimensions
        );

        sqlx::query(&query)
            .execute(&self.pool)
            .await
            .map_err(|e| IngestError::storage(format!("failed to create table: {e}")))?;

        // IF NOT EXISTS is a no-op on a pre-existing table, so the declared
        // column dimension must be checked explicitly. pgvector stores it
        // in atttypmod.
        let declared: Option<(i32,)> = sqlx::query_as(
            "SELECT a.atttypmod FROM pg_attribute a \
             JOIN pg_class c ON a.attrelid = c.oid \
             WHERE c.relname = $1 AND a.attname = 'embedding'",
        )
        .bind(&self.table_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| IngestError::storage(format!("schema inspection failed: {e}")))?;

        if let Some((typmod,)) = declared {
            if typmod > 0 && typmod as usize != self.dimensions {
                return Err(IngestError::configuration(format!(
                    "table '{}' declares embedding vector({}) but the configured dimension is {}",
                    self.table_name, typmod, self.dimensions
                )));
            }
        }

        info!(table = %self.table_name, dimensions = self.dimensions, "schema ready");
        Ok(())
    }

    async fn write_batch(&self, documents: &[PassageDocument]) -> Result<WriteStats, IngestError> {
        let mut stats = WriteStats::default();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| IngestError::storage(format!("begin failed: {e}")))?;
        let mut pending = 0usize;

        for document in documents {
            match self.should_skip(document) {
                Some(Skip::Empty) => {
                    stats.skipped_empty += 1;
                    continue;
                }
                Some(Skip::ZeroEmbedding) => {
                    warn!(
                        source = document
                            .metadata
                            .get("source")
                            .and_then(|v| v.as_str())
                            .unwrap_or(""),
                        "skipping row with zero fallback embedding"
                    );
                    stats.skipped_zero += 1;
                    continue;
                }
                None => {}
            }

            match self.insert_row(&mut tx, document).await {
                Ok(()) => {
                    pending += 1;
                    if pending >= self.batch_size {
                        tx.commit()
                            .await
                            .map_err(|e| IngestError::storage(format!("commit failed: {e}")))?;
                        stats.written += pending;
                        pending = 0;
                        tx = self
                            .pool
                            .begin()
                            .await
                            .map_err(|e| IngestError::storage(format!("begin failed: {e}")))?;
                    }
                }
                Err(e) => {
                    let message = e.to_string();
                    // A wrong-length vector means the configuration disagrees
                    // with the schema; every subsequent insert would fail the
                    // same way, so stop the run instead of bleeding rows.
                    if is_dimension_mismatch(&message) {
                        if let Err(rollback_err) = tx.rollback().await {
                            warn!(error = %rollback_err, "rollback failed");
                        }
                        return Err(IngestError::configuration(format!(
                            "embedding dimension mismatch: {message}"
                        )));
                    }

                    // One bad row drops the whole in-flight batch, never the run.
                    warn!(error = %e, lost = pending + 1, "insert failed, rolling back batch");
                    stats.failed += pending + 1;
                    pending = 0;
                    if let Err(rollback_err) = tx.rollback().await {
                        warn!(error = %rollback_err, "rollback failed");
                    }
                    tx = self
                        .pool
                        .begin()
                        .await
                        .map_err(|e| IngestError::storage(format!("begin failed: {e}")))?;
                }
            }
        }

        // Final flush of any uncommitted rows.
        if pending > 0 {
            tx.commit()
                .await
                .map_err(|e| IngestError::storage(format!("commit failed: {e}")))?;
            stats.written += pending;
        }

        info!(
            written = stats.written,
            skipped_empty = stats.skipped_empty,
            skipped_zero = stats.skipped_zero,
            failed = stats.failed,
            "write complete"
        );
        Ok(stats)
    }
}

/// Format an embedding as a pgvector literal, e.g. `[0.1,0.2,0.3]`.
fn embedding_to_pgvector(embedding: &[f32]) -> String {
    let values: Vec<String> = embedding.iter().map(|v| v.to_string()).collect();
    format!("[{}]", values.join(","))
}

/// pgvector rejects wrong-length vectors with "expected N dimensions, not M".
fn is_dimension_mismatch(message: &str) -> bool {
    message.contains("expected") && message.contains("dimensions")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::domain::Passage;

    fn store(policy: EmbedFailurePolicy) -> PgVectorStore {
        PgVectorStore::new(
            PgPool::connect_lazy("postgres://localhost/unused").unwrap(),
            &StoreConfig::default(),
            3,
            policy,
        )
    }

    fn document(content: &str, embedding: Vec<f32>) -> PassageDocument {
        PassageDocument::new(Passage::new(content, HashMap::new()), embedding)
    }

    #[test]
    fn test_pgvector_literal() {
        assert_eq!(embedding_to_pgvector(&[0.1, 0.2, 0.3]), "[0.1,0.2,0.3]");
        assert_eq!(embedding_to_pgvector(&[]), "[]");
        assert_eq!(embedding_to_pgvector(&[0.0]), "[0]");
    }

    #[tokio::test]
    async fn test_empty_content_skipped() {
        let store = store(EmbedFailurePolicy::Skip);
        let doc = document("   ", vec![0.1, 0.2, 0.3]);
        assert_eq!(store.should_skip(&doc), Some(Skip::Empty));
    }

    #[tokio::test]
    async fn test_zero_embedding_skipped_under_skip_policy() {
        let store = store(EmbedFailurePolicy::Skip);
        let doc = document("text", vec![0.0, 0.0, 0.0]);
        assert_eq!(store.should_skip(&doc), Some(Skip::ZeroEmbedding));
    }

    #[tokio::test]
    async fn test_zero_embedding_kept_under_zero_vector_policy() {
        let store = store(EmbedFailurePolicy::ZeroVector);
        let doc = document("text", vec![0.0, 0.0, 0.0]);
        assert_eq!(store.should_skip(&doc), None);
    }

    #[tokio::test]
    async fn test_normal_document_not_skipped() {
        let store = store(EmbedFailurePolicy::Skip);
        let doc = document("text", vec![0.1, 0.0, 0.0]);
        assert_eq!(store.should_skip(&doc), None);
    }

    #[test]
    fn test_dimension_mismatch_classified_as_fatal() {
        assert!(is_dimension_mismatch(
            "insert failed: error returned from database: expected 384 dimensions, not 768"
        ));
        assert!(!is_dimension_mismatch(
            "insert failed: connection reset by peer"
        ));
        assert!(!is_dimension_mismatch(
            "insert failed: null value in column \"content\""
        ));
    }
}
