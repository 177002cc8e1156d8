pub mod app_config;

pub use app_config::{
    AppConfig, ChunkingConfig, DatabaseConfig, EmbedFailurePolicy, EmbeddingConfig,
    ExtractFailurePolicy, ExtractionConfig, IngestConfig, LogFormat, LoggingConfig, StoreConfig,
};
