//! CLI module for ragline
//!
//! One subcommand: `ingest`, which runs the full pipeline over a folder
//! of documents and exits.

pub mod ingest;

use clap::{Parser, Subcommand};

/// ragline - document ingestion into a pgvector store
#[derive(Parser)]
#[command(name = "ragline")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Ingest every document in a folder: parse, chunk, embed, store
    Ingest(ingest::IngestArgs),
}
