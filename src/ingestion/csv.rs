//! CSV record adapter.

use std::io::Read;
use std::path::Path;

use crate::error::IngestionResult;
use crate::types::{DataSet, Record, Value};

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(true).flexible(true);
    builder
}

/// Read a headered CSV file into records.
///
/// Rules:
///
/// - CSV must have headers; header names become column names in order.
/// - Every cell is kept as text ([`Value::Utf8`]); an empty cell is the empty string.
/// - Blank lines are skipped. A short row only gets the columns it has; extra cells are dropped.
pub fn ingest_csv_from_path(path: impl AsRef<Path>) -> IngestionResult<DataSet> {
    let mut rdr = reader_builder().from_path(path)?;
    ingest_csv_from_reader(&mut rdr)
}

/// Read headered CSV text into records. See [`ingest_csv_from_path`] for the rules.
pub fn ingest_csv_from_str(input: &str) -> IngestionResult<DataSet> {
    let mut rdr = reader_builder().from_reader(input.as_bytes());
    ingest_csv_from_reader(&mut rdr)
}

/// Read records from an existing CSV reader.
pub fn ingest_csv_from_reader<R: Read>(rdr: &mut csv::Reader<R>) -> IngestionResult<DataSet> {
    let headers = rdr.headers()?.clone();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let row: Record = headers
            .iter()
            .zip(record.iter())
            .map(|(name, cell)| (name, Value::from(cell)))
            .collect();
        rows.push(row);
    }

    Ok(DataSet::new(rows))
}
