//! Row filtering for [`crate::types::DataSet`].

use crate::error::OperatorError;
use crate::expression::Condition;
use crate::types::{DataSet, Record};

/// Returns a new [`DataSet`] containing only rows for which `predicate` returns `true`.
///
/// This is a convenience wrapper around [`DataSet::filter_rows`].
pub fn filter<F>(dataset: &DataSet, predicate: F) -> DataSet
where
    F: FnMut(&Record) -> bool,
{
    dataset.filter_rows(predicate)
}

/// `filter_rows`: keep rows for which `condition` evaluates to a truthy value.
///
/// The condition is parsed once; a parse failure fails the step. A row whose evaluation errors
/// (unknown column, incomparable operands) is excluded.
pub fn filter_by_condition(dataset: &DataSet, condition: &str) -> Result<DataSet, OperatorError> {
    let condition = Condition::parse(condition)?;
    Ok(dataset.filter_rows(|row| condition.matches(row)))
}

#[cfg(test)]
mod tests {
    use super::{filter, filter_by_condition};
    use crate::error::OperatorError;
    use crate::types::{DataSet, Record, Value};

    fn row(id: i64, active: bool, name: &str) -> Record {
        Record::from_iter([
            ("id", Value::from(id)),
            ("active", Value::from(active)),
            ("name", Value::from(name)),
        ])
    }

    fn sample_dataset() -> DataSet {
        DataSet::new(vec![
            row(1, true, "a"),
            row(2, false, "b"),
            row(3, true, "c"),
        ])
    }

    fn ids(ds: &DataSet) -> Vec<Value> {
        ds.column_values("id").cloned().collect()
    }

    #[test]
    fn filter_rows_by_closure() {
        let ds = sample_dataset();
        let out = filter(&ds, |row| matches!(row.get("active"), Some(Value::Bool(true))));
        assert_eq!(ids(&out), vec![Value::from(1), Value::from(3)]);
        // Original unchanged
        assert_eq!(ds.row_count(), 3);
    }

    #[test]
    fn filter_rows_by_condition() {
        let ds = sample_dataset();
        let out = filter_by_condition(&ds, "id > 1 AND name != 'c'").unwrap();
        assert_eq!(ids(&out), vec![Value::from(2)]);
    }

    #[test]
    fn filter_rows_excludes_rows_that_fail_to_evaluate() {
        let mut ds = sample_dataset();
        ds.rows[1].remove("id");
        let out = filter_by_condition(&ds, "id >= 1").unwrap();
        assert_eq!(ids(&out), vec![Value::from(1), Value::from(3)]);
    }

    #[test]
    fn invalid_condition_fails_the_step() {
        let ds = sample_dataset();
        let err = filter_by_condition(&ds, "id > 1 ; true").unwrap_err();
        assert!(matches!(err, OperatorError::InvalidExpression(_)));
    }

    #[test]
    fn filter_rows_can_return_empty_dataset() {
        let ds = sample_dataset();
        let out = filter_by_condition(&ds, "id > 100").unwrap();
        assert!(out.rows.is_empty());
    }
}
