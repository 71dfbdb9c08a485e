use crate::embeddings::cosine_similarity;
use crate::models::{Record, RecordMetadata};
use providers::pinecone::{PineconeClient, PineconeVector, ScoredVector};
use providers::ProviderError;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, warn};

#[async_trait::async_trait]
pub trait VectorStore: Send + Sync {
    /// Creates the index if absent. Safe to call repeatedly.
    async fn ensure_index(&self, name: &str, dimension: usize) -> Result<(), ProviderError>;
    /// Inserts or overwrites records by id. An empty slice is a no-op.
    async fn upsert(&self, records: Vec<Record>) -> Result<(), ProviderError>;
    /// Top-`k` records by descending similarity to `vector`.
    async fn query(&self, vector: Vec<f32>, k: usize) -> Result<Vec<Record>, ProviderError>;
}

pub struct PineconeStore {
    client: PineconeClient,
}

impl PineconeStore {
    pub fn new(client: PineconeClient) -> Self {
        Self { client }
    }
}

fn metadata_field(
    metadata: &Option<HashMap<String, serde_json::Value>>,
    key: &str,
    id: &str,
) -> String {
    match metadata.as_ref().and_then(|m| m.get(key)) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => {
            warn!(id, field = key, "match is missing metadata field");
            String::new()
        }
    }
}

fn record_from_match(m: ScoredVector) -> Record {
    Record {
        metadata: RecordMetadata {
            text: metadata_field(&m.metadata, "text", &m.id),
            prediction: metadata_field(&m.metadata, "prediction", &m.id),
        },
        id: m.id,
        vector: m.values,
    }
}

#[async_trait::async_trait]
impl VectorStore for PineconeStore {
    async fn ensure_index(&self, name: &str, dimension: usize) -> Result<(), ProviderError> {
        self.client.ensure_index(name, dimension).await
    }

    async fn upsert(&self, records: Vec<Record>) -> Result<(), ProviderError> {
        if records.is_empty() {
            return Ok(());
        }
        let vectors: Vec<PineconeVector> = records
            .into_iter()
            .map(|r| PineconeVector {
                id: r.id,
                values: r.vector,
                metadata: HashMap::from([
                    ("text".to_string(), serde_json::Value::String(r.metadata.text)),
                    (
                        "prediction".to_string(),
                        serde_json::Value::String(r.metadata.prediction),
                    ),
                ]),
            })
            .collect();
        self.client.upsert(vectors).await
    }

    async fn query(&self, vector: Vec<f32>, k: usize) -> Result<Vec<Record>, ProviderError> {
        let resp = self.client.query(vector, k).await?;
        debug!(index = self.client.index_name(), matches = resp.matches.len(), "query done");
        Ok(resp.matches.into_iter().map(record_from_match).collect())
    }
}

#[derive(Default)]
struct MemoryIndex {
    dimension: Option<usize>,
    records: HashMap<String, Record>,
}

/// In-process store ranked by exact cosine similarity; ties are ordered by id.
#[derive(Default)]
pub struct MemoryVectorStore {
    inner: RwLock<MemoryIndex>,
}

impl MemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            inner: RwLock::new(MemoryIndex {
                dimension: Some(dimension),
                records: HashMap::new(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &str) -> Option<Record> {
        self.read().records.get(id).cloned()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, MemoryIndex> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, MemoryIndex> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn check_len(expected: Option<usize>, actual: usize) -> Result<(), ProviderError> {
    match expected {
        Some(expected) if expected != actual => {
            Err(ProviderError::DimensionMismatch { expected, actual })
        }
        _ => Ok(()),
    }
}

#[async_trait::async_trait]
impl VectorStore for MemoryVectorStore {
    async fn ensure_index(&self, _name: &str, dimension: usize) -> Result<(), ProviderError> {
        let mut index = self.write();
        if index.dimension.is_none() {
            index.dimension = Some(dimension);
        }
        Ok(())
    }

    async fn upsert(&self, records: Vec<Record>) -> Result<(), ProviderError> {
        let mut index = self.write();
        let mut dimension = index.dimension;
        for r in &records {
            check_len(dimension, r.vector.len())?;
            dimension = Some(r.vector.len());
        }
        index.dimension = dimension;
        for r in records {
            index.records.insert(r.id.clone(), r);
        }
        Ok(())
    }

    async fn query(&self, vector: Vec<f32>, k: usize) -> Result<Vec<Record>, ProviderError> {
        let index = self.read();
        check_len(index.dimension, vector.len())?;
        let mut scored: Vec<(f32, &Record)> = index
            .records
            .values()
            .map(|r| (cosine_similarity(&vector, &r.vector), r))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.id.cmp(&b.1.id)));
        Ok(scored.into_iter().take(k).map(|(_, r)| r.clone()).collect())
    }
}
