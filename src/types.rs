//! Core data model types for transformation pipelines.
//!
//! A [`DataSet`] is an ordered list of schema-less [`Record`]s. Each record is an
//! insertion-ordered mapping from column name to a tagged scalar [`Value`]. The nominal column set
//! of a dataset is the key list of its first record (see [`DataSet::columns`]); individual records
//! may carry a different shape (pivoting, for example, produces ragged rows).

use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Logical kind of a [`Value`], as reported by the quality reporter and used as a coercion target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// 64-bit floating point number.
    #[serde(rename = "number")]
    Number,
    /// UTF-8 string.
    #[serde(rename = "string")]
    Utf8,
    /// Boolean.
    #[serde(rename = "boolean")]
    Bool,
    /// ISO-8601 date/time text.
    #[serde(rename = "date")]
    Date,
}

impl DataType {
    /// Lowercase name used in step parameters and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Utf8 => "string",
            Self::Bool => "boolean",
            Self::Date => "date",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single scalar cell in a [`Record`].
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Missing value.
    #[default]
    Null,
    /// 64-bit float. Integers are stored as floats, like every other numeric cell.
    Number(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
    /// ISO-8601 date/time text produced by date coercion.
    Date(String),
}

impl Value {
    /// `true` for [`Value::Null`] and for the empty string.
    ///
    /// Together with an absent key, these are the three ways a cell can be missing.
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Utf8(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Numeric reading of the value.
    ///
    /// Numbers are returned as-is; text (including date text) is trimmed and parsed as a finite
    /// `f64`. Booleans and nulls are not numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Utf8(s) | Self::Date(s) => parse_number(s),
            Self::Null | Self::Bool(_) => None,
        }
    }

    /// Borrow the text of a [`Value::Utf8`] or [`Value::Date`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Utf8(s) | Self::Date(s) => Some(s),
            _ => None,
        }
    }

    /// Render the value as text, e.g. for column names derived from cell values.
    pub fn to_text(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Number(n) => format_number(*n),
            Self::Bool(b) => b.to_string(),
            Self::Utf8(s) | Self::Date(s) => s.clone(),
        }
    }

    /// Logical kind of the value; `None` for [`Value::Null`].
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Self::Null => None,
            Self::Number(_) => Some(DataType::Number),
            Self::Bool(_) => Some(DataType::Bool),
            Self::Utf8(_) => Some(DataType::Utf8),
            Self::Date(_) => Some(DataType::Date),
        }
    }

    /// Kind-aware identity used for distinct counting: `1` and `"1"` are different values.
    pub(crate) fn identity_key(&self) -> String {
        match self {
            Self::Null => "z:".to_string(),
            Self::Number(n) => format!("n:{}", format_number(*n)),
            Self::Bool(b) => format!("b:{b}"),
            Self::Utf8(s) => format!("s:{s}"),
            Self::Date(s) => format!("d:{s}"),
        }
    }

    /// Convert a JSON value into a cell.
    ///
    /// Nested arrays/objects are kept as their compact JSON text.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map(Self::Number).unwrap_or(Self::Null),
            serde_json::Value::String(s) => Self::Utf8(s.clone()),
            other => Self::Utf8(other.to_string()),
        }
    }

    /// Convert the cell into JSON. Non-finite numbers become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Number(n) => number_to_json(*n),
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Utf8(s) | Self::Date(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Number(v as f64)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Utf8(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Utf8(v)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(|v| Self::from_json(&v))
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn format_number(n: f64) -> String {
    if n == 0.0 {
        // Normalizes -0.
        return "0".to_string();
    }
    format!("{n}")
}

fn number_to_json(n: f64) -> serde_json::Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15 {
        return serde_json::Value::from(n as i64);
    }
    serde_json::Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

/// One row: an insertion-ordered mapping from column name to [`Value`].
///
/// Inserting an existing key replaces its value in place; inserting a new key appends it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entries: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty record with room for `capacity` columns.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Number of columns in this record.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if the record has no columns.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a cell by column name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Mutable lookup of a cell by column name.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// `true` if the record has a column named `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// `true` if the cell for `key` is absent, null or empty text.
    pub fn is_missing(&self, key: &str) -> bool {
        self.get(key).is_none_or(Value::is_missing)
    }

    /// Insert or replace a cell, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Remove a cell, preserving the order of the remaining columns.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Column names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Cells in column order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// `(column, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Mutable `(column, value)` pairs in order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Value)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    /// Content key that ignores column order, used to detect structurally identical rows.
    pub fn canonical_key(&self) -> String {
        let mut parts: Vec<(&str, String)> = self
            .entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.identity_key()))
            .collect();
        parts.sort_unstable();
        let mut key = String::new();
        for (k, v) in parts {
            key.push_str(&k.len().to_string());
            key.push(':');
            key.push_str(k);
            key.push_str(&v.len().to_string());
            key.push(':');
            key.push_str(&v);
        }
        key
    }

    /// Convert a JSON object into a record, keeping key order as provided by `serde_json`.
    pub fn from_json_object(obj: &serde_json::Map<String, serde_json::Value>) -> Self {
        obj.iter().map(|(k, v)| (k.clone(), Value::from_json(v))).collect()
    }

    /// Convert the record into a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        let obj = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(obj)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// In-memory tabular dataset: an ordered sequence of [`Record`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSet {
    /// Row storage, in order.
    pub rows: Vec<Record>,
}

impl DataSet {
    /// Create a dataset from rows.
    pub fn new(rows: Vec<Record>) -> Self {
        Self { rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// `true` if the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Nominal column set: the keys of the first record, or nothing for an empty dataset.
    pub fn columns(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|r| r.keys().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Clone of the first `n` rows.
    pub fn preview(&self, n: usize) -> Vec<Record> {
        self.rows.iter().take(n).cloned().collect()
    }

    /// A new dataset holding at most the first `n` rows.
    pub fn head(&self, n: usize) -> Self {
        Self::new(self.preview(n))
    }

    /// Create a new dataset containing only rows that match `predicate`.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&Record) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row))
            .cloned()
            .collect();
        Self { rows }
    }

    /// Create a new dataset by applying `mapper` to every row.
    ///
    /// Rows may change shape; nothing ties the output rows to the input columns.
    pub fn map_rows<F>(&self, mapper: F) -> Self
    where
        F: FnMut(&Record) -> Record,
    {
        Self {
            rows: self.rows.iter().map(mapper).collect(),
        }
    }

    /// Values of `column` in row order, skipping rows that do not have it.
    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.rows.iter().filter_map(move |r| r.get(column))
    }

    /// JSON array of objects.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(self.rows.iter().map(Record::to_json).collect())
    }
}

impl From<Vec<Record>> for DataSet {
    fn from(rows: Vec<Record>) -> Self {
        Self::new(rows)
    }
}

impl FromIterator<Record> for DataSet {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Serialize for DataSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(row)?;
        }
        seq.end()
    }
}
