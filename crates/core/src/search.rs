use crate::models::{Match, SearchOutcome};
use crate::vectorstore::VectorStore;
use providers::{EmbeddingProvider, ModerationProvider, ProviderError};
use std::sync::Arc;
use tracing::{debug, info};

/// Number of neighbours requested per query.
pub const TOP_K: usize = 5;

/// Moderation-gated semantic search. A query flagged by moderation is answered
/// with its category and no matches, without being embedded.
pub struct QueryPipeline {
    moderation: Arc<dyn ModerationProvider>,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
}

impl QueryPipeline {
    pub fn new(
        moderation: Arc<dyn ModerationProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            moderation,
            embedder,
            store,
        }
    }

    pub async fn run(&self, query: &str) -> Result<SearchOutcome, ProviderError> {
        let verdict = self.moderation.is_safe(query).await?;
        if !verdict.is_safe {
            info!(category = %verdict.category, "query rejected by moderation");
            return Ok(SearchOutcome {
                is_safe: false,
                category: verdict.category,
                matches: Vec::new(),
            });
        }

        let vector = self.embedder.embed(query).await?;
        let records = self.store.query(vector, TOP_K).await?;
        debug!(matches = records.len(), "vector query returned");
        Ok(SearchOutcome {
            is_safe: true,
            category: String::new(),
            matches: records.into_iter().map(Match::from).collect(),
        })
    }
}
