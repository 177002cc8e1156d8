//! Persistence of embedded passages

pub mod pgvector;

pub use pgvector::PgVectorStore;

use async_trait::async_trait;

use crate::domain::{IngestError, PassageDocument};

/// Per-run write accounting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    /// Rows committed
    pub written: usize,
    /// Rows dropped for empty content
    pub skipped_empty: usize,
    /// Rows dropped for an all-zero fallback embedding
    pub skipped_zero: usize,
    /// Rows lost to insert failures, including batch-mates rolled back
    /// alongside the failing row
    pub failed: usize,
}

impl WriteStats {
    pub fn total_seen(&self) -> usize {
        self.written + self.skipped_empty + self.skipped_zero + self.failed
    }
}

/// Destination for embedded passages.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Idempotently create the destination table and required extensions.
    /// Failure here is fatal to the run.
    async fn ensure_schema(&self) -> Result<(), IngestError>;

    /// Write documents in bounded commit batches. Individual row
    /// failures roll back only the in-flight batch and the run continues.
    async fn write_batch(&self, documents: &[PassageDocument]) -> Result<WriteStats, IngestError>;
}


#[cfg(test)]
pub mod mock {
    use std::sync::Mutex;

    use super::*;
    use crate::config::EmbedFailurePolicy;

    /// In-memory sink mirroring the real store's skip policy.
    pub struct MockSink {
        policy: EmbedFailurePolicy,
        pub documents: Mutex<Vec<PassageDocument>>,
    }

    impl MockSink {
        pub fn new(policy: EmbedFailurePolicy) -> Self {
            Self {
                policy,
                documents: Mutex::new(Vec::new()),
            }
        }

        pub fn written(&self) -> Vec<PassageDocument> {
            self.documents.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DocumentSink for MockSink {
        async fn ensure_schema(&self) -> Result<(), IngestError> {
            Ok(())
        }

        async fn write_batch(
            &self,
            documents: &[PassageDocument],
        ) -> Result<WriteStats, IngestError> {
            let mut stats = WriteStats::default();
            for doc in documents {
                if doc.content.trim().is_empty() {
                    stats.skipped_empty += 1;
                } else if doc.is_zero_embedding() && self.policy == EmbedFailurePolicy::Skip {
                    stats.skipped_zero += 1;
                } else {
                    self.documents.lock().unwrap().push(doc.clone());
                    stats.written += 1;
                }
            }
            Ok(stats)
        }
    }
}
