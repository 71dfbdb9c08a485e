//! Builds providers and stores from configuration and wires them into the
//! ingestion and query pipelines.

use crate::config::{AppConfig, VectorProvider};
use crate::ingest::IngestionPipeline;
use crate::search::QueryPipeline;
use crate::vectorstore::{MemoryVectorStore, PineconeStore, VectorStore};
use anyhow::Context;
use providers::openai::{OpenAiConfig, OpenAiProvider};
use providers::pinecone::{PineconeClient, PineconeConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

fn key_or_env(value: &Option<String>, var: &str) -> anyhow::Result<String> {
    if let Some(v) = value.as_ref().filter(|v| !v.is_empty()) {
        return Ok(v.clone());
    }
    std::env::var(var).with_context(|| format!("no api key configured and {} is not set", var))
}

pub fn build_openai(config: &AppConfig) -> anyhow::Result<Arc<OpenAiProvider>> {
    let settings = &config.openai;
    let provider = OpenAiProvider::new(OpenAiConfig {
        api_key: key_or_env(&settings.api_key, "OPENAI_API_KEY")?,
        base_url: settings.base_url.clone(),
        embedding_model: settings.embedding_model.clone(),
        moderation_model: settings.moderation_model.clone(),
        timeout: settings.timeout_secs.map(Duration::from_secs),
    })?;
    Ok(Arc::new(provider))
}

/// Builds the configured vector store and makes sure its index exists.
pub async fn connect_vector_store(config: &AppConfig) -> anyhow::Result<Arc<dyn VectorStore>> {
    let vectors = &config.vectors;
    let store: Arc<dyn VectorStore> = match vectors.provider {
        VectorProvider::Pinecone => {
            let client = PineconeClient::new(PineconeConfig {
                api_key: key_or_env(&vectors.api_key, "PINECONE_API_KEY")?,
                controller_url: vectors.controller_url.clone(),
                index: vectors.index.clone(),
                cloud: vectors.cloud.clone(),
                region: vectors.region.clone(),
                timeout: vectors.timeout_secs.map(Duration::from_secs),
                ready_timeout: Duration::from_secs(vectors.ready_timeout_secs),
            })?;
            Arc::new(PineconeStore::new(client))
        }
        VectorProvider::Memory => Arc::new(MemoryVectorStore::new()),
    };
    store
        .ensure_index(&vectors.index, vectors.dimension)
        .await
        .with_context(|| format!("ensure index {}", vectors.index))?;
    info!(index = %vectors.index, provider = ?vectors.provider, "vector store ready");
    Ok(store)
}

pub async fn ingestion(config: &AppConfig) -> anyhow::Result<IngestionPipeline> {
    let openai = build_openai(config)?;
    let store = connect_vector_store(config).await?;
    Ok(IngestionPipeline::new(openai, store).strict(config.ingest.strict))
}

pub async fn query(config: &AppConfig) -> anyhow::Result<QueryPipeline> {
    let openai = build_openai(config)?;
    let store = connect_vector_store(config).await?;
    Ok(QueryPipeline::new(openai.clone(), openai, store))
}
