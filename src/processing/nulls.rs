//! Missing-value handling.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{DataSet, Value};

use super::stats;

/// How `handle_nulls` treats missing cells (absent, null or empty text).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullStrategy {
    /// Remove rows where the cell is missing.
    Drop,
    /// Fill with a literal value.
    FillValue,
    /// Fill with the mean of the column's numeric values.
    FillMean,
    /// Fill with the median (element at `⌊n/2⌋`) of the column's numeric values.
    FillMedian,
    /// Fill with the most frequent non-missing value; ties go to the first one seen.
    FillMode,
}

/// `handle_nulls` over one column.
///
/// Fill statistics are computed once over the input before any row is rewritten. When a
/// statistic cannot be computed (no numeric values, no non-missing values) the dataset is
/// returned unchanged.
pub fn handle_nulls(
    dataset: &DataSet,
    column: &str,
    strategy: NullStrategy,
    fill_value: &Value,
) -> DataSet {
    let fill = match strategy {
        NullStrategy::Drop => return dataset.filter_rows(|row| !row.is_missing(column)),
        NullStrategy::FillValue => Some(fill_value.clone()),
        NullStrategy::FillMean => {
            stats::mean(&stats::numeric_column(dataset, column)).map(Value::Number)
        }
        NullStrategy::FillMedian => {
            stats::median(&stats::numeric_column(dataset, column)).map(Value::Number)
        }
        NullStrategy::FillMode => mode(dataset, column),
    };

    let Some(fill) = fill else {
        return dataset.clone();
    };

    dataset.map_rows(|row| {
        let mut out = row.clone();
        if out.is_missing(column) {
            out.insert(column, fill.clone());
        }
        out
    })
}

/// Most frequent non-missing value of `column`; ties resolve to the first value encountered.
pub(crate) fn mode(dataset: &DataSet, column: &str) -> Option<Value> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(&Value, usize)> = Vec::new();

    for value in dataset.column_values(column).filter(|v| !v.is_missing()) {
        match index.get(&value.identity_key()) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(value.identity_key(), counts.len());
                counts.push((value, 1));
            }
        }
    }

    let mut best: Option<(&Value, usize)> = None;
    for (value, count) in counts {
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(v, _)| v.clone())
}
