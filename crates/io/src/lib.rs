// File ingestion and the rules.json artifact

pub mod csv;
pub mod rules_file;
pub mod xlsx;

use std::path::Path;

use alchemist_engine::dataset::RecordKind;
use alchemist_engine::record::Record;
use alchemist_engine::state::AppState;

/// Why a file could not be ingested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// Extension is not one of the supported upload formats.
    UnsupportedFormat(String),
    /// File could not be read.
    Io(String),
    /// File opened but its contents did not parse.
    Parse { format: &'static str, message: String },
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::UnsupportedFormat(ext) => {
                write!(f, "Unsupported file format: .{}", ext)
            }
            ImportError::Io(msg) => write!(f, "I/O error: {}", msg),
            ImportError::Parse { format, message } => {
                write!(f, "{} parse error: {}", format, message)
            }
        }
    }
}

impl std::error::Error for ImportError {}

/// Load records from an uploaded file, dispatching on the (lowercased)
/// extension. CSV values are all strings; Excel cells keep their types.
pub fn load_records(path: &Path) -> Result<Vec<Record>, ImportError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => csv::import_records(path),
        "xlsx" | "xls" | "xlsb" | "ods" => xlsx::import_records(path),
        _ => Err(ImportError::UnsupportedFormat(ext)),
    }
}

/// Ingest one file into the application state.
///
/// On success the kind's collection is replaced wholesale and the status
/// message says so. On any failure the collections are untouched and the
/// failure becomes the status message — ingestion is aborted for this file
/// only, nothing is fatal.
pub fn ingest(state: &mut AppState, kind: RecordKind, path: &Path) -> bool {
    match load_records(path) {
        Ok(records) => {
            state.replace_records(kind, records);
            true
        }
        Err(ImportError::UnsupportedFormat(_)) => {
            state.set_status("Unsupported file format");
            false
        }
        Err(ImportError::Parse { format, .. }) => {
            state.set_status(format!("Error parsing {} {}", kind, format));
            false
        }
        Err(ImportError::Io(msg)) => {
            state.set_status(format!("Error reading {} file: {}", kind, msg));
            false
        }
    }
}
