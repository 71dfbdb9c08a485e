use providers::ProviderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("source has no `text` column")]
    MissingTextColumn,
    #[error("row {row}: missing `text` field")]
    MissingText { row: usize },
    #[error("row {row}: `text` is empty")]
    EmptyText { row: usize },
    #[error("row {row}: {message}")]
    Csv { row: usize, message: String },
    #[error("label set is empty")]
    NoLabels,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl InputError {
    /// The 1-based data row this error belongs to, if it is row-level.
    pub fn row(&self) -> Option<usize> {
        match self {
            InputError::MissingText { row }
            | InputError::EmptyText { row }
            | InputError::Csv { row, .. } => Some(*row),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to embed label prototypes: {0}")]
    Labels(#[source] ProviderError),
    #[error("invalid label set: {0}")]
    LabelSet(#[source] InputError),
    #[error("invalid source: {0}")]
    Source(#[source] InputError),
    #[error("row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: RowError,
    },
}

/// Why a single source row could not be stored.
#[derive(Debug, Error)]
pub enum RowError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
