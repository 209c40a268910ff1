//! Row-wise cell rewrites for [`crate::types::DataSet`].

use std::collections::HashMap;

use regex::Regex;

use crate::error::OperatorError;
use crate::expression::Formula;
use crate::types::{DataSet, Record, Value};

/// Returns a new [`DataSet`] by applying `mapper` to every row.
///
/// This is a convenience wrapper around [`DataSet::map_rows`].
pub fn map<F>(dataset: &DataSet, mapper: F) -> DataSet
where
    F: FnMut(&Record) -> Record,
{
    dataset.map_rows(mapper)
}

/// `value_mapping`: replace a cell of `column` when its text form equals a key of `mapping`.
///
/// Null cells and rows without the column pass through.
pub fn value_mapping(dataset: &DataSet, column: &str, mapping: &HashMap<String, Value>) -> DataSet {
    map(dataset, |row| {
        let mut out = row.clone();
        if let Some(cell) = out.get_mut(column).filter(|c| !matches!(c, Value::Null)) {
            if let Some(replacement) = mapping.get(&cell.to_text()) {
                *cell = replacement.clone();
            }
        }
        out
    })
}

/// `regex_replace`: replace every match of `pattern` in the text cells of `column`.
///
/// `replacement` may reference capture groups (`$1`, `${name}`). Non-text cells are untouched.
pub fn regex_replace(
    dataset: &DataSet,
    column: &str,
    pattern: &str,
    replacement: &str,
) -> Result<DataSet, OperatorError> {
    let re = Regex::new(pattern).map_err(|source| OperatorError::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })?;

    Ok(map(dataset, |row| {
        let mut out = row.clone();
        if let Some(Value::Utf8(s) | Value::Date(s)) = out.get_mut(column) {
            let replaced = re.replace_all(s, replacement).into_owned();
            if replaced != *s {
                *s = replaced;
            }
        }
        out
    }))
}

/// `feature_engineering`: derive `new_column` from an arithmetic `formula` over other columns.
///
/// A formula outside the arithmetic grammar fails the step. Per row, non-numeric operands read as
/// `0`; a missing column or a non-finite result stores `null` for that row only.
pub fn derive_column(
    dataset: &DataSet,
    new_column: &str,
    formula: &str,
) -> Result<DataSet, OperatorError> {
    if new_column.trim().is_empty() {
        return Err(OperatorError::InvalidParameter {
            message: "new_column must not be empty".to_string(),
        });
    }
    let formula = Formula::parse(formula)?;

    Ok(map(dataset, |row| {
        let mut out = row.clone();
        let value = formula.evaluate(row).map(Value::Number).unwrap_or(Value::Null);
        out.insert(new_column, value);
        out
    }))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{derive_column, regex_replace, value_mapping};
    use crate::error::OperatorError;
    use crate::types::{DataSet, Record, Value};

    fn orders() -> DataSet {
        DataSet::new(vec![
            Record::from_iter([
                ("status", Value::from("A")),
                ("price", Value::from(2.5)),
                ("qty", Value::from("4")),
            ]),
            Record::from_iter([
                ("status", Value::from("B")),
                ("price", Value::from("oops")),
                ("qty", Value::from(2)),
            ]),
            Record::from_iter([("status", Value::Null), ("price", Value::from(1))]),
        ])
    }

    #[test]
    fn value_mapping_replaces_matches_only() {
        let mapping = HashMap::from([("A".to_string(), Value::from("active"))]);
        let out = value_mapping(&orders(), "status", &mapping);
        assert_eq!(out.rows[0].get("status"), Some(&Value::from("active")));
        assert_eq!(out.rows[1].get("status"), Some(&Value::from("B")));
        assert_eq!(out.rows[2].get("status"), Some(&Value::Null));
    }

    #[test]
    fn value_mapping_matches_numbers_by_text() {
        let ds = DataSet::new(vec![Record::from_iter([("code", Value::from(1))])]);
        let mapping = HashMap::from([("1".to_string(), Value::from("one"))]);
        let out = value_mapping(&ds, "code", &mapping);
        assert_eq!(out.rows[0].get("code"), Some(&Value::from("one")));
    }

    #[test]
    fn regex_replace_is_global_and_supports_groups() {
        let ds = DataSet::new(vec![
            Record::from_iter([("phone", Value::from("555-123-4567"))]),
            Record::from_iter([("phone", Value::from(42))]),
        ]);
        let out = regex_replace(&ds, "phone", r"(\d+)-", "$1.").unwrap();
        assert_eq!(out.rows[0].get("phone"), Some(&Value::from("555.123.4567")));
        assert_eq!(out.rows[1].get("phone"), Some(&Value::from(42)));
    }

    #[test]
    fn invalid_regex_fails() {
        let err = regex_replace(&orders(), "status", "(unclosed", "").unwrap_err();
        assert!(matches!(err, OperatorError::InvalidRegex { .. }));
    }

    #[test]
    fn derive_column_treats_unparseable_as_zero_and_missing_as_null() {
        let out = derive_column(&orders(), "total", "price * qty").unwrap();
        assert_eq!(out.rows[0].get("total"), Some(&Value::from(10)));
        assert_eq!(out.rows[1].get("total"), Some(&Value::from(0)));
        assert_eq!(out.rows[2].get("total"), Some(&Value::Null));
        assert_eq!(out.columns().last().map(String::as_str), Some("total"));
    }

    #[test]
    fn derive_column_rejects_non_arithmetic_formula() {
        let err = derive_column(&orders(), "total", "price > 1").unwrap_err();
        assert!(matches!(err, OperatorError::InvalidExpression(_)));
    }
}
