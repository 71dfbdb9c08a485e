#![allow(dead_code)]

use providers::{EmbeddingProvider, ModerationProvider, ModerationResponse, ProviderError};
use search_core::models::{Record, RecordMetadata};
use search_core::vectorstore::VectorStore;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Embeds from a fixed table; unknown texts get `fallback`.
pub struct TableEmbedder {
    table: HashMap<String, Vec<f32>>,
    fallback: Vec<f32>,
    failing: HashSet<String>,
    pub calls: AtomicUsize,
}

impl TableEmbedder {
    pub fn new(entries: &[(&str, &[f32])], fallback: &[f32]) -> Self {
        Self {
            table: entries
                .iter()
                .map(|(t, v)| (t.to_string(), v.to_vec()))
                .collect(),
            fallback: fallback.to_vec(),
            failing: HashSet::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_on(mut self, text: &str) -> Self {
        self.failing.insert(text.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TableEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(text) {
            return Err(ProviderError::RequestFailed(format!("cannot embed {:?}", text)));
        }
        Ok(self
            .table
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone()))
    }
}

pub struct FixedModeration {
    response: ModerationResponse,
    pub calls: AtomicUsize,
}

impl FixedModeration {
    pub fn safe() -> Self {
        Self::with(false, &[])
    }

    pub fn flagging(categories: &[&str]) -> Self {
        Self::with(true, categories)
    }

    pub fn with(flagged: bool, categories: &[&str]) -> Self {
        let categories: BTreeMap<String, bool> =
            categories.iter().map(|c| (c.to_string(), true)).collect();
        Self {
            response: ModerationResponse {
                flagged,
                categories,
            },
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ModerationProvider for FixedModeration {
    async fn classify(&self, _text: &str) -> Result<ModerationResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

/// Returns canned query results and records every upsert.
#[derive(Default)]
pub struct ScriptedStore {
    results: Vec<Record>,
    reject_ids: HashSet<String>,
    pub upserts: Mutex<Vec<Record>>,
    pub queries: AtomicUsize,
    pub last_k: AtomicUsize,
}

impl ScriptedStore {
    pub fn returning(results: Vec<Record>) -> Self {
        Self {
            results,
            ..Self::default()
        }
    }

    pub fn rejecting(id: &str) -> Self {
        let mut store = Self::default();
        store.reject_ids.insert(id.to_string());
        store
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn upserted(&self) -> Vec<Record> {
        self.upserts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl VectorStore for ScriptedStore {
    async fn ensure_index(&self, _name: &str, _dimension: usize) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn upsert(&self, records: Vec<Record>) -> Result<(), ProviderError> {
        if let Some(r) = records.iter().find(|r| self.reject_ids.contains(&r.id)) {
            return Err(ProviderError::RequestFailed(format!("upsert {} refused", r.id)));
        }
        self.upserts.lock().unwrap().extend(records);
        Ok(())
    }

    async fn query(&self, _vector: Vec<f32>, k: usize) -> Result<Vec<Record>, ProviderError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.last_k.store(k, Ordering::SeqCst);
        Ok(self.results.clone())
    }
}

pub fn record(id: &str, text: &str, prediction: &str) -> Record {
    Record {
        id: id.to_string(),
        vector: vec![0.0, 0.0, 1.0],
        metadata: RecordMetadata {
            text: text.to_string(),
            prediction: prediction.to_string(),
        },
    }
}
