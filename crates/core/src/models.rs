use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub text: String,
    pub prediction: String,
}

/// A stored vector with its metadata. Upserting a record with an existing id
/// overwrites the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub vector: Vec<f32>,
    pub metadata: RecordMetadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub name: String,
    pub prototype: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub text: String,
    pub prediction: String,
}

impl From<Record> for Match {
    fn from(record: Record) -> Self {
        Self {
            text: record.metadata.text,
            prediction: record.metadata.prediction,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub is_safe: bool,
    pub category: String,
    pub matches: Vec<Match>,
}

/// One data row of an ingestion source. `row` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    pub row: usize,
    pub text: String,
}
