//! Retrieval core: label classification, ingestion and moderated search over
//! a vector store.

pub mod classifier;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod ids;
pub mod ingest;
pub mod models;
pub mod pipeline;
pub mod search;
pub mod source;
pub mod vectorstore;

pub use providers::{EmbeddingProvider, ModerationProvider, ModerationResult, ProviderError};
