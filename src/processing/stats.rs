//! Numeric statistics shared by operators and the quality reporter.
//!
//! All helpers take already-extracted numeric values: callers decide which cells are numeric via
//! [`crate::types::Value::as_f64`], so unparseable cells are excluded rather than counted as zero.

use crate::types::{DataSet, Value};

/// Numeric readings of `column` across all rows, in row order.
pub(crate) fn numeric_column(dataset: &DataSet, column: &str) -> Vec<f64> {
    dataset.column_values(column).filter_map(Value::as_f64).collect()
}

pub(crate) fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(sum(values) / values.len() as f64)
}

/// Element at `⌊n/2⌋` of the sorted values (the upper median for even counts).
pub(crate) fn median(values: &[f64]) -> Option<f64> {
    percentile(&sorted(values), 0.5)
}

/// Index-truncated percentile over values that are already sorted ascending.
pub(crate) fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let idx = ((sorted.len() as f64 * p).floor() as usize).min(sorted.len() - 1);
    Some(sorted[idx])
}

pub(crate) fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub(crate) fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Population standard deviation.
pub(crate) fn std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(var.sqrt())
}

pub(crate) fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

#[cfg(test)]
mod tests {
    use super::{max, mean, median, min, percentile, std_dev};

    #[test]
    fn empty_input_has_no_statistics() {
        assert_eq!(mean(&[]), None);
        assert_eq!(median(&[]), None);
        assert_eq!(min(&[]), None);
        assert_eq!(std_dev(&[]), None);
    }

    #[test]
    fn median_takes_the_upper_middle_element() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(3.0));
    }

    #[test]
    fn percentile_truncates_the_index() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&sorted, 0.25), Some(2.0));
        assert_eq!(percentile(&sorted, 0.75), Some(4.0));
    }

    #[test]
    fn population_standard_deviation() {
        assert_eq!(std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), Some(2.0));
        assert_eq!(max(&[1.0, 5.0, -2.0]), Some(5.0));
    }
}
