//! In-memory data transformations.
//!
//! Every operator is a pure function from a borrowed [`crate::types::DataSet`] to a new one.
//! Statistics an operator needs (means, medians, modes, scaling bounds) are computed once from its
//! input before any row is rewritten.
//!
//! A [`TransformationStep`] is resolved into a typed [`Operation`] before anything runs, so a bad
//! parameter bag is reported up front instead of half-way through a pipeline.
//!
//! | Kind | Function |
//! |---|---|
//! | `rename_columns` | [`rename_columns`] |
//! | `drop_columns` | [`drop_columns`] |
//! | `change_data_types` | [`change_data_types`] |
//! | `trim_whitespace` | [`trim_whitespace`] |
//! | `handle_nulls` | [`handle_nulls`] |
//! | `filter_rows` | [`filter_by_condition`] |
//! | `value_mapping` | [`value_mapping`] |
//! | `feature_engineering` | [`derive_column`] |
//! | `one_hot_encoding` | [`one_hot_encode`] |
//! | `group_by_aggregation` | [`group_by_aggregation`] |
//! | `pivot_table` | [`pivot_table`] |
//! | `normalize_scale` | [`normalize_scale`] |
//! | `regex_replace` | [`regex_replace`] |
//!
//! ## Example: filter → derive → reduce
//!
//! ```rust
//! use rust_data_transform::processing::{derive_column, filter_by_condition, reduce, ReduceOp};
//! use rust_data_transform::types::{DataSet, Record, Value};
//!
//! let ds: DataSet = [(1, true, 10.0), (2, false, 20.0), (3, true, 30.0)]
//!     .into_iter()
//!     .map(|(id, active, score)| {
//!         Record::from_iter([
//!             ("id", Value::from(id)),
//!             ("active", Value::from(active)),
//!             ("score", Value::from(score)),
//!         ])
//!     })
//!     .collect();
//!
//! let active = filter_by_condition(&ds, "active == true").unwrap();
//! let bonus = derive_column(&active, "bonus", "score * 0.5").unwrap();
//!
//! assert_eq!(reduce(&bonus, "bonus", ReduceOp::Sum), Some(Value::from(20)));
//! ```

pub mod aggregate;
pub mod columns;
pub mod features;
pub mod filter;
pub mod map;
pub mod nulls;
pub mod reduce;
pub(crate) mod stats;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{OperatorError, TransformError, TransformResult};
use crate::step::{StepKind, TransformationStep};
use crate::types::{DataSet, DataType, Value};

pub use aggregate::{group_by_aggregation, pivot_table};
pub use columns::{change_data_types, drop_columns, rename_columns, trim_whitespace};
pub use features::{normalize_scale, one_hot_encode, ScaleMethod};
pub use filter::{filter, filter_by_condition};
pub use map::{derive_column, map, regex_replace, value_mapping};
pub use nulls::{handle_nulls, NullStrategy};
pub use reduce::{reduce, ReduceOp};

/// A step kind together with its decoded parameters.
///
/// The serde representation is the step's parameter bag with an `op` tag naming the kind, e.g.
/// `{"op": "handle_nulls", "column": "age", "method": "fill_mean"}`. Missing parameters take the
/// same defaults as [`StepKind::default_parameters`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    RenameColumns {
        #[serde(default)]
        mapping: HashMap<String, String>,
    },
    DropColumns {
        #[serde(default)]
        columns: Vec<String>,
    },
    ChangeDataTypes {
        #[serde(default)]
        column: String,
        #[serde(default = "default_target_type")]
        target_type: DataType,
    },
    TrimWhitespace {
        #[serde(default)]
        columns: Vec<String>,
    },
    HandleNulls {
        #[serde(default)]
        column: String,
        #[serde(default = "default_null_strategy")]
        method: NullStrategy,
        #[serde(default)]
        fill_value: Value,
    },
    FilterRows {
        #[serde(default)]
        condition: String,
    },
    ValueMapping {
        #[serde(default)]
        column: String,
        #[serde(default)]
        mapping: HashMap<String, Value>,
    },
    FeatureEngineering {
        #[serde(default)]
        new_column: String,
        #[serde(default)]
        formula: String,
    },
    OneHotEncoding {
        #[serde(default)]
        columns: Vec<String>,
    },
    GroupByAggregation {
        #[serde(default)]
        group_by_columns: Vec<String>,
        #[serde(default)]
        agg_column: String,
        #[serde(default = "default_agg_function")]
        agg_function: ReduceOp,
    },
    PivotTable {
        #[serde(default)]
        index_column: String,
        #[serde(default)]
        columns_column: String,
        #[serde(default)]
        values_column: String,
    },
    NormalizeScale {
        #[serde(default)]
        columns: Vec<String>,
        #[serde(default)]
        method: ScaleMethod,
    },
    RegexReplace {
        #[serde(default)]
        column: String,
        #[serde(default)]
        pattern: String,
        #[serde(default)]
        replacement: String,
    },
}

fn default_target_type() -> DataType {
    DataType::Utf8
}

fn default_null_strategy() -> NullStrategy {
    NullStrategy::Drop
}

fn default_agg_function() -> ReduceOp {
    ReduceOp::Sum
}

impl Operation {
    /// Resolve a step into an operation.
    ///
    /// Fails with [`TransformError::UnknownStep`] when the kind is not supported and with
    /// [`TransformError::InvalidParameters`] when the parameter bag does not decode.
    pub fn from_step(step: &TransformationStep) -> TransformResult<Self> {
        let label = step.display_label();
        let kind: StepKind = step.kind.parse().map_err(|_| TransformError::UnknownStep {
            label: label.to_string(),
            kind: step.kind.clone(),
        })?;

        let mut bag = step.parameters.clone();
        bag.insert("op".to_string(), serde_json::Value::from(kind.as_str()));
        serde_json::from_value(serde_json::Value::Object(bag)).map_err(|e| {
            TransformError::InvalidParameters {
                label: label.to_string(),
                kind: kind.as_str().to_string(),
                message: e.to_string(),
            }
        })
    }

    pub fn kind(&self) -> StepKind {
        match self {
            Self::RenameColumns { .. } => StepKind::RenameColumns,
            Self::DropColumns { .. } => StepKind::DropColumns,
            Self::ChangeDataTypes { .. } => StepKind::ChangeDataTypes,
            Self::TrimWhitespace { .. } => StepKind::TrimWhitespace,
            Self::HandleNulls { .. } => StepKind::HandleNulls,
            Self::FilterRows { .. } => StepKind::FilterRows,
            Self::ValueMapping { .. } => StepKind::ValueMapping,
            Self::FeatureEngineering { .. } => StepKind::FeatureEngineering,
            Self::OneHotEncoding { .. } => StepKind::OneHotEncoding,
            Self::GroupByAggregation { .. } => StepKind::GroupByAggregation,
            Self::PivotTable { .. } => StepKind::PivotTable,
            Self::NormalizeScale { .. } => StepKind::NormalizeScale,
            Self::RegexReplace { .. } => StepKind::RegexReplace,
        }
    }

    /// Run the operator against `dataset`.
    pub fn apply(&self, dataset: &DataSet) -> Result<DataSet, OperatorError> {
        let out = match self {
            Self::RenameColumns { mapping } => rename_columns(dataset, mapping),
            Self::DropColumns { columns } => drop_columns(dataset, columns),
            Self::ChangeDataTypes {
                column,
                target_type,
            } => change_data_types(dataset, column, *target_type),
            Self::TrimWhitespace { columns } => trim_whitespace(dataset, columns),
            Self::HandleNulls {
                column,
                method,
                fill_value,
            } => handle_nulls(dataset, column, *method, fill_value),
            Self::FilterRows { condition } => filter_by_condition(dataset, condition)?,
            Self::ValueMapping { column, mapping } => value_mapping(dataset, column, mapping),
            Self::FeatureEngineering {
                new_column,
                formula,
            } => derive_column(dataset, new_column, formula)?,
            Self::OneHotEncoding { columns } => one_hot_encode(dataset, columns),
            Self::GroupByAggregation {
                group_by_columns,
                agg_column,
                agg_function,
            } => group_by_aggregation(dataset, group_by_columns, agg_column, *agg_function),
            Self::PivotTable {
                index_column,
                columns_column,
                values_column,
            } => pivot_table(dataset, index_column, columns_column, values_column),
            Self::NormalizeScale { columns, method } => normalize_scale(dataset, columns, *method),
            Self::RegexReplace {
                column,
                pattern,
                replacement,
            } => regex_replace(dataset, column, pattern, replacement)?,
        };
        Ok(out)
    }
}
