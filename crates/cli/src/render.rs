//! Plain-text rendering of pipeline results.

use search_core::ingest::{IngestReport, RowOutcome};
use search_core::models::SearchOutcome;

pub fn search(query: &str, outcome: &SearchOutcome) -> String {
    let mut out = format!("query: {}\n", query);
    if !outcome.is_safe {
        out.push_str(&format!("rejected by moderation: {}\n", outcome.category));
        return out;
    }
    if outcome.matches.is_empty() {
        out.push_str("no matches\n");
        return out;
    }
    for (i, m) in outcome.matches.iter().enumerate() {
        out.push_str(&format!("{}. [{}] {}\n", i + 1, m.prediction, m.text));
    }
    out
}

pub fn ingest(report: &IngestReport) -> String {
    let mut out = format!(
        "{}: stored {}, failed {}\n",
        report.status(),
        report.stored(),
        report.failed()
    );
    for outcome in &report.outcomes {
        if let RowOutcome::Failed { row, reason } = outcome {
            out.push_str(&format!("  row {}: {}\n", row, reason));
        }
    }
    out
}

pub fn search_json(query: &str, outcome: &SearchOutcome) -> serde_json::Value {
    serde_json::json!({
        "query": query,
        "is_safe": outcome.is_safe,
        "moderation_classification": outcome.category,
        "results": outcome.matches,
    })
}

pub fn ingest_json(report: &IngestReport) -> serde_json::Value {
    serde_json::json!({
        "status": report.status(),
        "stored": report.stored(),
        "failed": report.failed(),
        "rows": report.outcomes,
    })
}
