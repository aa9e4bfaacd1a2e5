// Size-bounded dataset snapshots for relay requests

use alchemist_engine::dataset::Dataset;
use alchemist_engine::record::Record;

/// Per-collection cap on the JSON fragment sent to the relay, in characters.
pub const FRAGMENT_LIMIT: usize = 2000;

/// The three dataset fragments a relay request carries. Each is a JSON
/// string truncated to [`FRAGMENT_LIMIT`] characters — possibly mid-token;
/// the model copes and the bound matters more than well-formedness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSnapshot {
    pub clients: String,
    pub workers: String,
    pub tasks: String,
}

impl DatasetSnapshot {
    /// Capture a snapshot of the current dataset. With `privacy` on, only
    /// column names and row counts leave the machine — no cell values.
    pub fn capture(dataset: &Dataset, privacy: bool) -> Self {
        let fragment = if privacy { minimal_fragment } else { value_fragment };
        Self {
            clients: fragment(&dataset.clients),
            workers: fragment(&dataset.workers),
            tasks: fragment(&dataset.tasks),
        }
    }
}

fn value_fragment(records: &[Record]) -> String {
    let json = serde_json::to_string(records).unwrap_or_else(|_| "[]".to_string());
    truncate_chars(&json, FRAGMENT_LIMIT)
}

fn minimal_fragment(records: &[Record]) -> String {
    let columns: Vec<&str> = records
        .first()
        .map(|r| r.columns().collect())
        .unwrap_or_default();
    let summary = serde_json::json!({
        "columns": columns,
        "rows": records.len(),
    });
    summary.to_string()
}

fn truncate_chars(s: &str, limit: usize) -> String {
    match s.char_indices().nth(limit) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
