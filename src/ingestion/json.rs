//! JSON record adapter.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"a":1}, {"a":2}]`
//! - A single JSON object: `{"a":1}`
//! - Newline-delimited JSON (NDJSON): `{"a":1}\n{"a":2}\n`
//!
//! Key order is kept as written. Nested arrays/objects are stored as their compact JSON text.

use std::fs;
use std::path::Path;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, Record};

/// Read JSON records from a file.
pub fn ingest_json_from_path(path: impl AsRef<Path>) -> IngestionResult<DataSet> {
    let text = fs::read_to_string(path)?;
    ingest_json_from_str(&text)
}

/// Read JSON records from an in-memory string.
///
/// Empty input yields an empty dataset.
pub fn ingest_json_from_str(input: &str) -> IngestionResult<DataSet> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(DataSet::default());
    }

    // First try parsing as a single JSON value (array or object).
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(trimmed) {
        match v {
            serde_json::Value::Array(items) => records_from_values(&items),
            serde_json::Value::Object(_) => records_from_values(std::slice::from_ref(&v)),
            _ => Err(IngestionError::InvalidShape {
                message: "json must be an object, an array of objects, or NDJSON".to_string(),
            }),
        }
    } else {
        // Fall back to NDJSON.
        let mut values = Vec::new();
        for (i, line) in trimmed.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let v = serde_json::from_str::<serde_json::Value>(line).map_err(|e| {
                IngestionError::InvalidShape {
                    message: format!("invalid ndjson at line {}: {}", i + 1, e),
                }
            })?;
            values.push(v);
        }
        records_from_values(&values)
    }
}

fn records_from_values(values: &[serde_json::Value]) -> IngestionResult<DataSet> {
    values
        .iter()
        .enumerate()
        .map(|(idx0, v)| {
            v.as_object()
                .map(Record::from_json_object)
                .ok_or_else(|| IngestionError::InvalidShape {
                    message: format!("row {} is not a json object", idx0 + 1),
                })
        })
        .collect::<IngestionResult<Vec<_>>>()
        .map(DataSet::new)
}
