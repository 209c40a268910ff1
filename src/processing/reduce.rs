//! Reduction operations for [`crate::types::DataSet`] columns.

use serde::{Deserialize, Serialize};

use crate::types::{DataSet, Record, Value};

use super::stats;

/// Built-in reduction operations over a single column.
///
/// These double as the `agg_function` values of `group_by_aggregation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReduceOp {
    /// Sum of numeric values (`0` when there are none).
    Sum,
    /// Arithmetic mean of numeric values.
    Mean,
    /// Element at `⌊n/2⌋` of the sorted numeric values.
    Median,
    /// Count all rows (including nulls and non-numeric cells).
    Count,
    /// Minimum numeric value.
    Min,
    /// Maximum numeric value.
    Max,
}

impl ReduceOp {
    /// Lowercase name, used as the suffix of aggregated column names.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Count => "count",
            Self::Min => "min",
            Self::Max => "max",
        }
    }
}

/// Reduce a column using a built-in [`ReduceOp`].
///
/// - Returns `None` if no row has `column`.
/// - Non-numeric cells are ignored; `Mean`/`Median`/`Min`/`Max` return `Some(Value::Null)` when
///   nothing numeric remains.
/// - `Count` returns the number of rows.
pub fn reduce(dataset: &DataSet, column: &str, op: ReduceOp) -> Option<Value> {
    if !dataset.rows.iter().any(|r| r.contains_key(column)) {
        return None;
    }
    Some(reduce_records(dataset.rows.iter(), column, op))
}

/// Reduce `column` over an arbitrary group of records.
pub(crate) fn reduce_records<'a, I>(records: I, column: &str, op: ReduceOp) -> Value
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut row_count = 0usize;
    let mut values = Vec::new();
    for record in records {
        row_count += 1;
        if let Some(v) = record.get(column).and_then(Value::as_f64) {
            values.push(v);
        }
    }

    let out = match op {
        ReduceOp::Count => Some(row_count as f64),
        ReduceOp::Sum => Some(stats::sum(&values)),
        ReduceOp::Mean => stats::mean(&values),
        ReduceOp::Median => stats::median(&values),
        ReduceOp::Min => stats::min(&values),
        ReduceOp::Max => stats::max(&values),
    };
    out.map(Value::Number).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::{reduce, ReduceOp};
    use crate::types::{DataSet, Record, Value};

    fn numeric_dataset_with_nulls() -> DataSet {
        let rows = vec![
            Record::from_iter([("id", Value::from(1)), ("score", Value::from(10.0))]),
            Record::from_iter([("id", Value::from(2)), ("score", Value::Null)]),
            Record::from_iter([("id", Value::from(3)), ("score", Value::from("5.5"))]),
        ];
        DataSet::new(rows)
    }

    #[test]
    fn reduce_count_counts_rows() {
        let ds = numeric_dataset_with_nulls();
        assert_eq!(reduce(&ds, "score", ReduceOp::Count), Some(Value::from(3)));
        assert_eq!(reduce(&ds, "id", ReduceOp::Count), Some(Value::from(3)));
    }

    #[test]
    fn reduce_sum_ignores_nulls_and_parses_numeric_text() {
        let ds = numeric_dataset_with_nulls();
        assert_eq!(reduce(&ds, "score", ReduceOp::Sum), Some(Value::from(15.5)));
        assert_eq!(reduce(&ds, "id", ReduceOp::Sum), Some(Value::from(6)));
    }

    #[test]
    fn reduce_min_max_mean_median() {
        let ds = numeric_dataset_with_nulls();
        assert_eq!(reduce(&ds, "score", ReduceOp::Min), Some(Value::from(5.5)));
        assert_eq!(reduce(&ds, "score", ReduceOp::Max), Some(Value::from(10.0)));
        assert_eq!(reduce(&ds, "id", ReduceOp::Mean), Some(Value::from(2)));
        assert_eq!(reduce(&ds, "id", ReduceOp::Median), Some(Value::from(2)));
    }

    #[test]
    fn reduce_returns_none_for_missing_column() {
        let ds = numeric_dataset_with_nulls();
        assert_eq!(reduce(&ds, "missing", ReduceOp::Count), None);
        assert_eq!(reduce(&ds, "missing", ReduceOp::Sum), None);
    }

    #[test]
    fn reduce_returns_null_if_nothing_numeric() {
        let ds = DataSet::new(vec![
            Record::from_iter([("score", Value::Null)]),
            Record::from_iter([("score", Value::from("n/a"))]),
        ]);
        assert_eq!(reduce(&ds, "score", ReduceOp::Mean), Some(Value::Null));
        assert_eq!(reduce(&ds, "score", ReduceOp::Min), Some(Value::Null));
        assert_eq!(reduce(&ds, "score", ReduceOp::Sum), Some(Value::from(0)));
    }
}
