//! Cell validation
//!
//! A fixed rule set applied per (field, value) pair. Failures are data —
//! reason strings attached to a cell — never errors, and the scan is
//! recomputed from current values on every call rather than stored.
//!
//! ## Coercion
//!
//! The range checks coerce loosely: numeric strings compare as numbers and
//! values that do not coerce never fail a range check. The required check is
//! strict — only an absent field or the exact empty string count as missing;
//! a JSON null (or the number 0) does not.

use serde::Serialize;
use serde_json::Value;

use crate::dataset::{Dataset, RecordKind};
use crate::record::{coerce_number, fields, Record};

pub const REASON_REQUIRED: &str = "Required";
pub const REASON_PRIORITY_RANGE: &str = "Out of range (1-5)";
pub const REASON_DURATION_MIN: &str = "Must be ≥ 1";
pub const REASON_INVALID_JSON: &str = "Invalid JSON";

/// Validate a single cell. Returns the failure reason, or `None` when the
/// value is acceptable. Pure and display-free.
pub fn validate_cell(field: &str, value: Option<&Value>) -> Option<&'static str> {
    let value = match value {
        None => return Some(REASON_REQUIRED),
        Some(Value::String(s)) if s.is_empty() => return Some(REASON_REQUIRED),
        Some(v) => v,
    };

    if field == fields::PRIORITY_LEVEL {
        if let Some(n) = coerce_number(value) {
            if !(1.0..=5.0).contains(&n) {
                return Some(REASON_PRIORITY_RANGE);
            }
        }
    }

    if field == fields::DURATION {
        if let Some(n) = coerce_number(value) {
            if n < 1.0 {
                return Some(REASON_DURATION_MIN);
            }
        }
    }

    if field == fields::ATTRIBUTES_JSON && !parses_as_json(value) {
        return Some(REASON_INVALID_JSON);
    }

    None
}

/// Whether a cell value reads as JSON text. Non-string scalars are
/// serialized first, so a bare number or boolean passes.
fn parses_as_json(value: &Value) -> bool {
    match value {
        Value::String(s) => serde_json::from_str::<Value>(s).is_ok(),
        _ => true,
    }
}

/// One validation failure, locating the offending cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub kind: RecordKind,
    pub row: usize,
    pub field: String,
    pub reason: &'static str,
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}].{}: {}", self.kind, self.row, self.field, self.reason)
    }
}

/// Validate every cell of every record in the dataset.
///
/// Columns for a collection are the first record's field set, so a row
/// missing one of those fields reports "Required" for it.
pub fn scan(dataset: &Dataset) -> Vec<Issue> {
    let mut issues = Vec::new();
    for kind in RecordKind::ALL {
        scan_kind(kind, dataset.records(kind), &mut issues);
    }
    issues
}

fn scan_kind(kind: RecordKind, records: &[Record], issues: &mut Vec<Issue>) {
    let Some(first) = records.first() else {
        return;
    };
    let columns: Vec<String> = first.columns().map(str::to_string).collect();

    for (row, record) in records.iter().enumerate() {
        for column in &columns {
            if let Some(reason) = validate_cell(column, record.get(column)) {
                issues.push(Issue {
                    kind,
                    row,
                    field: column.clone(),
                    reason,
                });
            }
        }
    }
}
