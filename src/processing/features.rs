//! Feature-shaping operators: one-hot encoding and numeric rescaling.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{DataSet, Value};

use super::stats;

/// Rescaling method for `normalize_scale`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMethod {
    /// `(v - min) / (max - min)`
    #[default]
    MinMax,
    /// `(v - mean) / std` with the population standard deviation.
    Standard,
    /// `(v - mean) / (max - min)`
    Robust,
}

/// `one_hot_encoding`: replace each listed column by one `<col>_<value>` indicator column per
/// distinct non-null value.
///
/// Values are compared by their text form and indicator columns are appended in first-seen order,
/// after the columns the row already has. Rows where the column is null or absent get `0`
/// everywhere.
pub fn one_hot_encode(dataset: &DataSet, columns: &[String]) -> DataSet {
    let mut out = dataset.clone();
    for column in columns {
        let categories = distinct_text(&out, column);
        out = out.map_rows(|row| {
            let current = row
                .get(column)
                .filter(|v| !matches!(v, Value::Null))
                .map(Value::to_text);
            let mut encoded = row.clone();
            encoded.remove(column);
            for category in &categories {
                let hit = current.as_deref() == Some(category.as_str());
                let indicator = if hit { 1.0 } else { 0.0 };
                encoded.insert(format!("{column}_{category}"), Value::Number(indicator));
            }
            encoded
        });
    }
    out
}

fn distinct_text(dataset: &DataSet, column: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    dataset
        .column_values(column)
        .filter(|v| !matches!(v, Value::Null))
        .map(Value::to_text)
        .filter(|text| seen.insert(text.clone()))
        .collect()
}

/// Column statistics captured once before rescaling.
#[derive(Debug, Clone, Copy)]
struct Scale {
    min: f64,
    max: f64,
    mean: f64,
    std: f64,
}

impl Scale {
    fn of(values: &[f64]) -> Option<Self> {
        Some(Self {
            min: stats::min(values)?,
            max: stats::max(values)?,
            mean: stats::mean(values)?,
            std: stats::std_dev(values)?,
        })
    }

    fn apply(&self, method: ScaleMethod, v: f64) -> f64 {
        match method {
            ScaleMethod::MinMax => (v - self.min) / (self.max - self.min),
            ScaleMethod::Standard => (v - self.mean) / self.std,
            ScaleMethod::Robust => (v - self.mean) / (self.max - self.min),
        }
    }
}

/// `normalize_scale`: rescale the numeric cells of each listed column.
///
/// Statistics are computed over the whole input before any row is rewritten. Non-numeric cells
/// are left alone; a degenerate column (zero range or zero deviation) yields `null`.
pub fn normalize_scale(dataset: &DataSet, columns: &[String], method: ScaleMethod) -> DataSet {
    let scales: Vec<(&str, Scale)> = columns
        .iter()
        .filter_map(|c| Scale::of(&stats::numeric_column(dataset, c)).map(|s| (c.as_str(), s)))
        .collect();
    if scales.is_empty() {
        return dataset.clone();
    }

    dataset.map_rows(|row| {
        let mut out = row.clone();
        for (column, scale) in &scales {
            if let Some(cell) = out.get_mut(column) {
                if let Some(v) = cell.as_f64() {
                    let scaled = scale.apply(method, v);
                    *cell = if scaled.is_finite() {
                        Value::Number(scaled)
                    } else {
                        Value::Null
                    };
                }
            }
        }
        out
    })
}
