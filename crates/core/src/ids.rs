//! Record id generation for ingestion runs.

use crate::models::SourceRow;
use serde::{Deserialize, Serialize};

pub trait IdPolicy: Send {
    fn next_id(&mut self, row: &SourceRow) -> String;
}

/// Id `N` is data row `N` of the source, whether or not earlier rows failed.
/// Re-running ingestion reuses the same ids and overwrites earlier records.
#[derive(Debug, Clone, Default)]
pub struct SequentialIds;

impl SequentialIds {
    pub fn new() -> Self {
        Self
    }
}

impl IdPolicy for SequentialIds {
    fn next_id(&mut self, row: &SourceRow) -> String {
        row.row.to_string()
    }
}

/// blake3 hex digest of the row text; identical texts share one record.
#[derive(Debug, Clone, Default)]
pub struct ContentHashIds;

impl IdPolicy for ContentHashIds {
    fn next_id(&mut self, row: &SourceRow) -> String {
        blake3::hash(row.text.as_bytes()).to_hex().to_string()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdPolicyKind {
    #[default]
    Sequential,
    ContentHash,
}

impl IdPolicyKind {
    pub fn build(self) -> Box<dyn IdPolicy> {
        match self {
            IdPolicyKind::Sequential => Box::new(SequentialIds::new()),
            IdPolicyKind::ContentHash => Box::new(ContentHashIds),
        }
    }
}
