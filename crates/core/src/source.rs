//! CSV ingestion source. The file must have a header row with a `text` column;
//! other columns are ignored.

use crate::error::InputError;
use crate::models::SourceRow;
use std::io::Read;
use std::path::Path;

pub const TEXT_COLUMN: &str = "text";

/// A source row, or the reason that row could not be read.
pub type RowResult = Result<SourceRow, InputError>;

/// Parses CSV from a reader. Header-level problems fail the whole source;
/// row-level problems are returned in place of the row.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<RowResult>, InputError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers().map_err(|e| InputError::Csv {
        row: 0,
        message: e.to_string(),
    })?;
    let column = headers
        .iter()
        .position(|h| h.trim() == TEXT_COLUMN)
        .ok_or(InputError::MissingTextColumn)?;

    let mut rows = Vec::new();
    for (idx, result) in csv_reader.records().enumerate() {
        let row = idx + 1;
        let parsed = match result {
            Err(e) => Err(InputError::Csv {
                row,
                message: e.to_string(),
            }),
            Ok(record) => match record.get(column) {
                None => Err(InputError::MissingText { row }),
                Some(text) if text.trim().is_empty() => Err(InputError::EmptyText { row }),
                Some(text) => Ok(SourceRow {
                    row,
                    text: text.to_string(),
                }),
            },
        };
        rows.push(parsed);
    }
    Ok(rows)
}

pub fn read_rows_from_path(path: &Path) -> Result<Vec<RowResult>, InputError> {
    let file = std::fs::File::open(path)?;
    read_rows(std::io::BufReader::new(file))
}

/// Wraps plain strings as source rows, numbered from 1.
pub fn rows_from_texts<I, S>(texts: I) -> Vec<RowResult>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    texts
        .into_iter()
        .enumerate()
        .map(|(idx, text)| {
            Ok(SourceRow {
                row: idx + 1,
                text: text.into(),
            })
        })
        .collect()
}
