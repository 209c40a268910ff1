//! Row-collapsing operators: group-by aggregation and pivoting.

use std::collections::HashMap;

use crate::types::{DataSet, Record, Value};

use super::reduce::{reduce_records, ReduceOp};

/// Grouping key of one cell. Cells group by text form, so `1` and `"1"` fall together; an absent
/// column is its own group.
fn group_key(row: &Record, column: &str) -> Option<String> {
    row.get(column).map(Value::to_text)
}

/// Partition `rows` by `key`, keeping partitions and their members in first-seen order.
fn partition<'a, K, F>(dataset: &'a DataSet, mut key: F) -> Vec<Vec<&'a Record>>
where
    K: std::hash::Hash + Eq,
    F: FnMut(&Record) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<Vec<&Record>> = Vec::new();
    for row in &dataset.rows {
        let slot = *index.entry(key(row)).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(row);
    }
    groups
}

/// `group_by_aggregation`: one output row per distinct combination of `group_by` values.
///
/// Output rows carry the group columns (typed as in the first row of the group, `null` when that
/// row lacks the column) followed by `<agg_column>_<fn>`.
pub fn group_by_aggregation(
    dataset: &DataSet,
    group_by: &[String],
    agg_column: &str,
    op: ReduceOp,
) -> DataSet {
    let out_column = format!("{agg_column}_{}", op.as_str());
    partition(dataset, |row| {
        group_by.iter().map(|c| group_key(row, c)).collect::<Vec<_>>()
    })
    .into_iter()
    .filter_map(|members| {
        let first = members.first()?;
        let mut out = Record::with_capacity(group_by.len() + 1);
        for column in group_by {
            out.insert(column.as_str(), first.get(column).cloned().unwrap_or(Value::Null));
        }
        out.insert(out_column.as_str(), reduce_records(members.iter().copied(), agg_column, op));
        Some(out)
    })
    .collect()
}

/// `pivot_table`: one output row per distinct `index_column` value, with
/// `row[text(columns_column)] = values_column` spread across it.
///
/// Rows without `columns_column` contribute nothing; a later duplicate `(index, spread)` pair
/// overwrites an earlier one. Spread columns follow the index column in first-seen order.
pub fn pivot_table(
    dataset: &DataSet,
    index_column: &str,
    columns_column: &str,
    values_column: &str,
) -> DataSet {
    partition(dataset, |row| group_key(row, index_column))
        .into_iter()
        .filter_map(|members| {
            let first = members.first()?;
            let mut out = Record::new();
            out.insert(index_column, first.get(index_column).cloned().unwrap_or(Value::Null));
            for row in members {
                let Some(spread) = row.get(columns_column) else {
                    continue;
                };
                let value = row.get(values_column).cloned().unwrap_or(Value::Null);
                out.insert(spread.to_text(), value);
            }
            Some(out)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{group_by_aggregation, pivot_table};
    use crate::processing::ReduceOp;
    use crate::types::{DataSet, Record, Value};

    fn sale(g: &str, region: &str, v: i64) -> Record {
        Record::from_iter([
            ("g", Value::from(g)),
            ("region", Value::from(region)),
            ("v", Value::from(v)),
        ])
    }

    fn sales() -> DataSet {
        DataSet::new(vec![
            sale("x", "n", 1),
            sale("x", "s", 3),
            sale("y", "n", 5),
        ])
    }

    #[test]
    fn group_by_sums_per_partition() {
        let out = group_by_aggregation(&sales(), &["g".to_string()], "v", ReduceOp::Sum);
        assert_eq!(
            out,
            DataSet::new(vec![
                Record::from_iter([("g", Value::from("x")), ("v_sum", Value::from(4))]),
                Record::from_iter([("g", Value::from("y")), ("v_sum", Value::from(5))]),
            ])
        );
    }

    #[test]
    fn group_by_multiple_columns_and_other_functions() {
        let keys = ["g".to_string(), "region".to_string()];
        let out = group_by_aggregation(&sales(), &keys, "v", ReduceOp::Count);
        assert_eq!(out.row_count(), 3);
        assert_eq!(out.columns(), vec!["g", "region", "v_count"]);

        let out = group_by_aggregation(&sales(), &["region".to_string()], "v", ReduceOp::Mean);
        assert_eq!(out.rows[0].get("v_mean"), Some(&Value::from(3)));
        assert_eq!(out.rows[1].get("v_mean"), Some(&Value::from(3)));
    }

    #[test]
    fn group_without_numeric_values_aggregates_to_null() {
        let ds = DataSet::new(vec![Record::from_iter([
            ("g", Value::from("x")),
            ("v", Value::from("n/a")),
        ])]);
        let out = group_by_aggregation(&ds, &["g".to_string()], "v", ReduceOp::Max);
        assert_eq!(out.rows[0].get("v_max"), Some(&Value::Null));
        let out = group_by_aggregation(&ds, &["g".to_string()], "v", ReduceOp::Sum);
        assert_eq!(out.rows[0].get("v_sum"), Some(&Value::from(0)));
    }

    #[test]
    fn pivot_spreads_values_and_later_pairs_win() {
        let mut ds = sales();
        ds.rows.push(Record::from_iter([
            ("g", Value::from("x")),
            ("region", Value::from("n")),
            ("v", Value::from(9)),
        ]));
        let out = pivot_table(&ds, "g", "region", "v");
        assert_eq!(
            out,
            DataSet::new(vec![
                Record::from_iter([
                    ("g", Value::from("x")),
                    ("n", Value::from(9)),
                    ("s", Value::from(3)),
                ]),
                Record::from_iter([("g", Value::from("y")), ("n", Value::from(5))]),
            ])
        );
    }
}
