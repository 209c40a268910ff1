//! Data-quality summary of a dataset.
//!
//! ```rust
//! use rust_data_transform::quality::report;
//! use rust_data_transform::types::{DataSet, Record, Value};
//!
//! let ds: DataSet = [1, 1, 2]
//!     .into_iter()
//!     .map(|x| Record::from_iter([("x", Value::from(x))]))
//!     .collect();
//!
//! let q = report(&ds);
//! assert_eq!(q.duplicate_rows, 1);
//! assert_eq!(q.unique_values["x"], 2);
//! assert_eq!(q.null_counts["x"], 0);
//! ```

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::processing::stats;
use crate::types::{DataSet, DataType, Value};

/// Per-column statistics plus the duplicate-row count.
///
/// Columns are the keys of the first record. Serialized with camelCase keys (`nullCounts`,
/// `duplicateRows`, `dataTypes`, `outliers`, `uniqueValues`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    /// Rows where the cell is absent, null or empty text.
    pub null_counts: BTreeMap<String, usize>,
    /// Total rows minus structurally distinct rows; column order does not matter.
    pub duplicate_rows: usize,
    /// Kind of the first non-missing cell. Columns with no such cell are omitted.
    pub data_types: BTreeMap<String, DataType>,
    /// Cells outside `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]`, for number-typed columns only.
    pub outliers: BTreeMap<String, usize>,
    /// Distinct non-missing values.
    pub unique_values: BTreeMap<String, usize>,
}

/// Build a [`QualityReport`] for `dataset`.
pub fn report(dataset: &DataSet) -> QualityReport {
    let mut out = QualityReport {
        duplicate_rows: duplicate_rows(dataset),
        ..QualityReport::default()
    };

    for column in dataset.columns() {
        let present: Vec<&Value> = dataset
            .column_values(&column)
            .filter(|v| !v.is_missing())
            .collect();

        out.null_counts.insert(column.clone(), dataset.row_count() - present.len());

        let distinct: HashSet<String> = present.iter().map(|v| v.identity_key()).collect();
        out.unique_values.insert(column.clone(), distinct.len());

        if let Some(kind) = present.first().and_then(|v| v.data_type()) {
            if kind == DataType::Number {
                let values: Vec<f64> = present.iter().filter_map(|v| v.as_f64()).collect();
                out.outliers.insert(column.clone(), count_outliers(&values));
            }
            out.data_types.insert(column, kind);
        }
    }
    out
}

fn duplicate_rows(dataset: &DataSet) -> usize {
    let distinct: HashSet<String> = dataset.rows.iter().map(|r| r.canonical_key()).collect();
    dataset.row_count() - distinct.len()
}

/// IQR outlier count with index-truncated quartiles.
fn count_outliers(values: &[f64]) -> usize {
    let sorted = stats::sorted(values);
    let quartiles = (
        stats::percentile(&sorted, 0.25),
        stats::percentile(&sorted, 0.75),
    );
    let (Some(q1), Some(q3)) = quartiles else {
        return 0;
    };
    let iqr = q3 - q1;
    let (lower, upper) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);
    values.iter().filter(|v| **v < lower || **v > upper).count()
}
