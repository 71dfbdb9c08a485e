//! Bulk ingestion: embed each source row, label it against the prototype set
//! and upsert it into the vector store, one row at a time.

use crate::classifier::LabelClassifier;
use crate::embeddings::{embed_labels, DEFAULT_LABELS};
use crate::error::{IngestError, RowError};
use crate::ids::IdPolicy;
use crate::models::{Record, RecordMetadata, SourceRow};
use crate::source::{self, RowResult};
use crate::vectorstore::VectorStore;
use providers::EmbeddingProvider;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowOutcome {
    Stored {
        row: usize,
        id: String,
        prediction: String,
    },
    Failed {
        row: usize,
        reason: String,
    },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub outcomes: Vec<RowOutcome>,
}

impl IngestReport {
    pub fn stored(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RowOutcome::Stored { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.stored()
    }

    /// `success` when no row failed, `failed` when every row failed,
    /// `partial` otherwise.
    pub fn status(&self) -> &'static str {
        match (self.stored(), self.failed()) {
            (_, 0) => "success",
            (0, _) => "failed",
            _ => "partial",
        }
    }
}

pub struct IngestionPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    labels: Vec<String>,
    strict: bool,
}

impl IngestionPipeline {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedder,
            store,
            labels: DEFAULT_LABELS.iter().map(|l| l.to_string()).collect(),
            strict: false,
        }
    }

    pub fn with_labels(mut self, labels: &[&str]) -> Self {
        self.labels = labels.iter().map(|l| l.to_string()).collect();
        self
    }

    /// In strict mode the first failing row aborts the run.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub async fn run_csv(
        &self,
        path: &Path,
        ids: &mut dyn IdPolicy,
    ) -> Result<IngestReport, IngestError> {
        let rows = source::read_rows_from_path(path).map_err(IngestError::Source)?;
        self.run(rows, ids).await
    }

    pub async fn run(
        &self,
        rows: Vec<RowResult>,
        ids: &mut dyn IdPolicy,
    ) -> Result<IngestReport, IngestError> {
        let names: Vec<&str> = self.labels.iter().map(String::as_str).collect();
        let labels = embed_labels(self.embedder.as_ref(), &names).await?;
        let classifier = LabelClassifier::new(labels).map_err(IngestError::LabelSet)?;
        info!(
            rows = rows.len(),
            dimension = classifier.dimension(),
            "starting ingestion"
        );

        let mut report = IngestReport::default();
        for (idx, row) in rows.into_iter().enumerate() {
            let row_no = match &row {
                Ok(r) => r.row,
                Err(e) => e.row().unwrap_or(idx + 1),
            };
            let result = match row {
                Ok(r) => self.ingest_row(r, &classifier, ids).await,
                Err(e) => Err(RowError::from(e)),
            };
            match result {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(source) if self.strict => {
                    return Err(IngestError::Row {
                        row: row_no,
                        source,
                    })
                }
                Err(source) => {
                    warn!(row = row_no, error = %source, "row not ingested");
                    report.outcomes.push(RowOutcome::Failed {
                        row: row_no,
                        reason: source.to_string(),
                    });
                }
            }
        }

        info!(
            stored = report.stored(),
            failed = report.failed(),
            status = report.status(),
            "ingestion finished"
        );
        Ok(report)
    }

    async fn ingest_row(
        &self,
        row: SourceRow,
        classifier: &LabelClassifier,
        ids: &mut dyn IdPolicy,
    ) -> Result<RowOutcome, RowError> {
        let vector = self.embedder.embed(&row.text).await?;
        let prediction = classifier.classify_vector(&vector)?.to_string();
        let id = ids.next_id(&row);
        debug!(row = row.row, id = %id, prediction = %prediction, "upserting row");
        self.store
            .upsert(vec![Record {
                id: id.clone(),
                vector,
                metadata: RecordMetadata {
                    text: row.text,
                    prediction: prediction.clone(),
                },
            }])
            .await?;
        Ok(RowOutcome::Stored {
            row: row.row,
            id,
            prediction,
        })
    }
}
