//! Column-shaping operators: rename, drop, type coercion and whitespace trimming.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::types::{DataSet, DataType, Record, Value};

/// `rename_columns`: rename keys per `mapping` (old → new). Unmapped keys pass through and every
/// key keeps its position.
pub fn rename_columns(dataset: &DataSet, mapping: &HashMap<String, String>) -> DataSet {
    dataset.map_rows(|row| {
        let mut out = Record::with_capacity(row.len());
        for (key, value) in row.iter() {
            let new_key = mapping.get(key).map(String::as_str).unwrap_or(key);
            out.insert(new_key, value.clone());
        }
        out
    })
}

/// `drop_columns`: remove the named keys. Unknown names are ignored.
pub fn drop_columns(dataset: &DataSet, columns: &[String]) -> DataSet {
    dataset.map_rows(|row| {
        row.iter()
            .filter(|(key, _)| !columns.iter().any(|c| c.as_str() == *key))
            .map(|(key, value)| (key, value.clone()))
            .collect()
    })
}

/// `trim_whitespace`: strip leading/trailing whitespace from text cells of `columns`, or of every
/// column when `columns` is empty. Non-text cells are left alone.
pub fn trim_whitespace(dataset: &DataSet, columns: &[String]) -> DataSet {
    dataset.map_rows(|row| {
        let mut out = row.clone();
        for (key, value) in out.iter_mut() {
            if !columns.is_empty() && !columns.iter().any(|c| c.as_str() == key) {
                continue;
            }
            if let Value::Utf8(s) | Value::Date(s) = value {
                let trimmed = s.trim();
                if trimmed.len() != s.len() {
                    *s = trimmed.to_string();
                }
            }
        }
        out
    })
}

/// `change_data_types`: coerce one column to `target`.
///
/// Nulls and rows without the column are untouched. A cell that cannot be coerced keeps its
/// original value; the row is always kept.
pub fn change_data_types(dataset: &DataSet, column: &str, target: DataType) -> DataSet {
    dataset.map_rows(|row| {
        let mut out = row.clone();
        if let Some(cell) = out.get_mut(column) {
            if let Some(coerced) = coerce(cell, target) {
                *cell = coerced;
            }
        }
        out
    })
}

/// Coerce a single value, returning `None` when the conversion does not apply.
pub(crate) fn coerce(value: &Value, target: DataType) -> Option<Value> {
    if matches!(value, Value::Null) {
        return None;
    }
    match target {
        DataType::Number => value.as_f64().map(Value::Number),
        DataType::Utf8 => Some(Value::Utf8(value.to_text())),
        DataType::Bool => coerce_bool(value).map(Value::Bool),
        DataType::Date => coerce_date(value).map(|dt| Value::Date(format_iso(&dt))),
    }
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(*n != 0.0 && !n.is_nan()),
        Value::Utf8(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "y" => Some(true),
            "false" | "0" | "no" | "n" => Some(false),
            _ => None,
        },
        Value::Date(_) | Value::Null => None,
    }
}

fn coerce_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        // Numbers are epoch milliseconds.
        Value::Number(ms) if ms.is_finite() => DateTime::from_timestamp_millis(*ms as i64),
        Value::Utf8(s) | Value::Date(s) => parse_date_text(s.trim()),
        _ => None,
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

fn parse_date_text(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    None
}

fn format_iso(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{change_data_types, drop_columns, rename_columns, trim_whitespace};
    use crate::types::{DataSet, DataType, Record, Value};

    fn people() -> DataSet {
        DataSet::new(vec![
            Record::from_iter([
                ("id", Value::from("1")),
                ("name", Value::from("  Ada ")),
                ("joined", Value::from("2024-03-01")),
            ]),
            Record::from_iter([
                ("id", Value::from("x")),
                ("name", Value::from("Grace")),
                ("joined", Value::from("not a date")),
            ]),
            Record::from_iter([
                ("id", Value::Null),
                ("name", Value::from(7)),
                ("joined", Value::Null),
            ]),
        ])
    }

    fn strings(pairs: &[&str]) -> Vec<String> {
        pairs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rename_keeps_positions_and_unmapped_keys() {
        let mapping = HashMap::from([("name".to_string(), "full_name".to_string())]);
        let out = rename_columns(&people(), &mapping);
        assert_eq!(out.columns(), strings(&["id", "full_name", "joined"]));
        assert_eq!(out.rows[1].get("full_name"), Some(&Value::from("Grace")));
    }

    #[test]
    fn rename_round_trip_restores_original() {
        let ds = people();
        let forward = HashMap::from([("id".to_string(), "key".to_string())]);
        let back = HashMap::from([("key".to_string(), "id".to_string())]);
        assert_eq!(rename_columns(&rename_columns(&ds, &forward), &back), ds);
    }

    #[test]
    fn drop_ignores_unknown_columns() {
        let out = drop_columns(&people(), &strings(&["joined", "nope"]));
        assert_eq!(out.columns(), strings(&["id", "name"]));
        assert_eq!(out.row_count(), 3);
    }

    #[test]
    fn trim_only_touches_text() {
        let out = trim_whitespace(&people(), &[]);
        assert_eq!(out.rows[0].get("name"), Some(&Value::from("Ada")));
        assert_eq!(out.rows[2].get("name"), Some(&Value::from(7)));

        let only_id = trim_whitespace(&people(), &strings(&["id"]));
        assert_eq!(only_id.rows[0].get("name"), Some(&Value::from("  Ada ")));
    }

    #[test]
    fn change_to_number_keeps_unparseable_values() {
        let out = change_data_types(&people(), "id", DataType::Number);
        assert_eq!(out.rows[0].get("id"), Some(&Value::from(1)));
        assert_eq!(out.rows[1].get("id"), Some(&Value::from("x")));
        assert_eq!(out.rows[2].get("id"), Some(&Value::Null));
        assert_eq!(out.row_count(), 3);
    }

    #[test]
    fn change_to_string_and_boolean() {
        let out = change_data_types(&people(), "name", DataType::Utf8);
        assert_eq!(out.rows[2].get("name"), Some(&Value::from("7")));

        let ds = DataSet::new(vec![
            Record::from_iter([("flag", Value::from("Yes"))]),
            Record::from_iter([("flag", Value::from(0))]),
            Record::from_iter([("flag", Value::from("maybe"))]),
        ]);
        let out = change_data_types(&ds, "flag", DataType::Bool);
        assert_eq!(out.rows[0].get("flag"), Some(&Value::from(true)));
        assert_eq!(out.rows[1].get("flag"), Some(&Value::from(false)));
        assert_eq!(out.rows[2].get("flag"), Some(&Value::from("maybe")));
    }

    #[test]
    fn change_to_date_normalizes_to_iso() {
        let out = change_data_types(&people(), "joined", DataType::Date);
        assert_eq!(
            out.rows[0].get("joined"),
            Some(&Value::Date("2024-03-01T00:00:00.000Z".to_string()))
        );
        assert_eq!(out.rows[1].get("joined"), Some(&Value::from("not a date")));

        let ds = DataSet::new(vec![Record::from_iter([(
            "t",
            Value::from("2024-03-01T10:30:00+02:00"),
        )])]);
        let out = change_data_types(&ds, "t", DataType::Date);
        assert_eq!(
            out.rows[0].get("t"),
            Some(&Value::Date("2024-03-01T08:30:00.000Z".to_string()))
        );
    }
}
