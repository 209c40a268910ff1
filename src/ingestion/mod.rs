//! Record adapters for callers that load data themselves.
//!
//! The transformation core only needs a [`crate::types::DataSet`]; these helpers turn the two most
//! common text encodings into one:
//!
//! - [`json`]: an array of objects, a single object, or NDJSON
//! - [`csv`]: headered delimited text, every cell kept as text
//!
//! Going the other way, [`crate::types::DataSet::to_json`] produces an array of JSON objects.

pub mod csv;
pub mod json;

pub use self::csv::{ingest_csv_from_path, ingest_csv_from_reader, ingest_csv_from_str};
pub use self::json::{ingest_json_from_path, ingest_json_from_str};
