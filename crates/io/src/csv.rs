// CSV import: header row -> records

use std::io::Read;
use std::path::Path;

use serde_json::Value;

use alchemist_engine::record::Record;

use crate::ImportError;

/// Import a CSV file as one record per data row, keyed by the header row.
///
/// The delimiter is sniffed, the encoding falls back to Windows-1252 for
/// Excel-exported files, and every value is a string — typing is the
/// validator's problem, not the parser's.
pub fn import_records(path: &Path) -> Result<Vec<Record>, ImportError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    records_from_string(&content, delimiter)
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
fn read_file_as_utf8(path: &Path) -> Result<String, ImportError> {
    let mut file = std::fs::File::open(path).map_err(|e| ImportError::Io(e.to_string()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| ImportError::Io(e.to_string()))?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Detect the most likely field delimiter by checking consistency across the
/// first few lines. The candidate that produces the most consistent field
/// count (>1 field) wins; higher field count breaks ties.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

fn records_from_string(content: &str, delimiter: u8) -> Result<Vec<Record>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ImportError::Parse { format: "CSV", message: e.to_string() })?
        .iter()
        .map(str::to_string)
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.map_err(|e| ImportError::Parse { format: "CSV", message: e.to_string() })?;

        // Blank lines are already skipped by the reader; also drop rows
        // where every field is empty (",,,").
        if row.iter().all(str::is_empty) {
            continue;
        }

        let record: Record = headers
            .iter()
            .zip(row.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, field)| (header.clone(), Value::String(field.to_string())))
            .collect();
        records.push(record);
    }

    Ok(records)
}
