// Excel import (xlsx, xls, xlsb, ods) - first sheet only

use std::path::Path;

use calamine::{open_workbook_auto, Data};
use serde_json::Value;

use alchemist_engine::record::Record;

use crate::ImportError;

/// Import the first sheet of an Excel workbook as header-keyed records.
///
/// Row 0 is the header; numbers stay numbers and booleans stay booleans.
/// Empty cells are omitted from the record entirely, so they read back as
/// missing rather than as empty strings.
pub fn import_records(path: &Path) -> Result<Vec<Record>, ImportError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| ImportError::Parse {
        format: "XLSX",
        message: format!("failed to open workbook: {}", e),
    })?;

    let sheet_names = workbook.sheet_names().to_vec();
    let first = sheet_names.first().ok_or(ImportError::Parse {
        format: "XLSX",
        message: "workbook contains no sheets".to_string(),
    })?;

    let range = workbook.worksheet_range(first).map_err(|e| ImportError::Parse {
        format: "XLSX",
        message: format!("failed to read sheet '{}': {}", first, e),
    })?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };

    let headers: Vec<String> = header_row.iter().map(header_text).collect();

    let mut records = Vec::new();
    for row in rows {
        let record: Record = headers
            .iter()
            .zip(row.iter())
            .filter(|(header, _)| !header.is_empty())
            .filter_map(|(header, cell)| cell_value(cell).map(|v| (header.clone(), v)))
            .collect();

        if !record.is_empty() {
            records.push(record);
        }
    }

    Ok(records)
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

/// Convert one cell to a JSON scalar; `None` means the field is absent.
fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(Value::String(s.clone())),
        Data::Int(n) => Some(Value::Number((*n).into())),
        Data::Float(n) => serde_json::Number::from_f64(*n).map(Value::Number),
        Data::Bool(b) => Some(Value::Bool(*b)),
        // Dates keep their Excel serial number; no date formatting here
        Data::DateTime(dt) => serde_json::Number::from_f64(dt.as_f64()).map(Value::Number),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(Value::String(s.clone())),
        Data::Error(e) => Some(Value::String(format!("#{:?}", e))),
    }
}
