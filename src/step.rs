//! Declarative pipeline steps.
//!
//! A [`TransformationStep`] is plain data: a kind name, a human label, a parameter bag and an
//! enabled flag. The kind is kept as free text so that a step list round-trips through JSON even
//! when it names an operator this crate does not know; such a step only fails once it is
//! executed (see [`crate::processing::Operation::from_step`]).
//!
//! ```rust
//! use rust_data_transform::step::{StepKind, TransformationStep};
//!
//! let step = TransformationStep::new(StepKind::DropColumns, "Drop ids")
//!     .with_parameter("columns", serde_json::json!(["id"]));
//! assert_eq!(step.kind, "drop_columns");
//! assert!(step.enabled);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};
use uuid::Uuid;

use crate::error::ParseStepKindError;

/// The closed set of operators a step can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    RenameColumns,
    DropColumns,
    ChangeDataTypes,
    TrimWhitespace,
    HandleNulls,
    FilterRows,
    ValueMapping,
    FeatureEngineering,
    OneHotEncoding,
    GroupByAggregation,
    PivotTable,
    NormalizeScale,
    RegexReplace,
}

/// Grouping of step kinds by how much they reshape the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepCategory {
    Basic,
    Intermediate,
    Advanced,
}

impl StepKind {
    /// Every kind, in catalog order.
    pub const ALL: [StepKind; 13] = [
        Self::RenameColumns,
        Self::DropColumns,
        Self::ChangeDataTypes,
        Self::TrimWhitespace,
        Self::HandleNulls,
        Self::FilterRows,
        Self::ValueMapping,
        Self::FeatureEngineering,
        Self::OneHotEncoding,
        Self::GroupByAggregation,
        Self::PivotTable,
        Self::NormalizeScale,
        Self::RegexReplace,
    ];

    /// Wire name, e.g. `"group_by_aggregation"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RenameColumns => "rename_columns",
            Self::DropColumns => "drop_columns",
            Self::ChangeDataTypes => "change_data_types",
            Self::TrimWhitespace => "trim_whitespace",
            Self::HandleNulls => "handle_nulls",
            Self::FilterRows => "filter_rows",
            Self::ValueMapping => "value_mapping",
            Self::FeatureEngineering => "feature_engineering",
            Self::OneHotEncoding => "one_hot_encoding",
            Self::GroupByAggregation => "group_by_aggregation",
            Self::PivotTable => "pivot_table",
            Self::NormalizeScale => "normalize_scale",
            Self::RegexReplace => "regex_replace",
        }
    }

    pub fn category(self) -> StepCategory {
        match self {
            Self::RenameColumns
            | Self::DropColumns
            | Self::ChangeDataTypes
            | Self::TrimWhitespace
            | Self::HandleNulls => StepCategory::Basic,
            Self::FilterRows
            | Self::ValueMapping
            | Self::FeatureEngineering
            | Self::OneHotEncoding => StepCategory::Intermediate,
            Self::GroupByAggregation
            | Self::PivotTable
            | Self::NormalizeScale
            | Self::RegexReplace => StepCategory::Advanced,
        }
    }

    /// Human-readable name, used as the default step label.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::RenameColumns => "Rename Columns",
            Self::DropColumns => "Drop Columns",
            Self::ChangeDataTypes => "Change Data Types",
            Self::TrimWhitespace => "Trim Whitespace",
            Self::HandleNulls => "Handle Missing Values",
            Self::FilterRows => "Filter Rows",
            Self::ValueMapping => "Value Mapping",
            Self::FeatureEngineering => "Feature Engineering",
            Self::OneHotEncoding => "One-Hot Encoding",
            Self::GroupByAggregation => "Group By & Aggregation",
            Self::PivotTable => "Pivot Table",
            Self::NormalizeScale => "Normalize/Scale",
            Self::RegexReplace => "Regex Replace",
        }
    }

    /// Parameter bag a freshly added step starts with.
    ///
    /// Every default decodes successfully; steps that need a column or expression still fail or
    /// do nothing until one is filled in.
    pub fn default_parameters(self) -> Map<String, JsonValue> {
        let params = match self {
            Self::RenameColumns => json!({ "mapping": {} }),
            Self::DropColumns | Self::TrimWhitespace | Self::OneHotEncoding => {
                json!({ "columns": [] })
            }
            Self::ChangeDataTypes => json!({ "column": "", "target_type": "string" }),
            Self::HandleNulls => json!({ "column": "", "method": "drop", "fill_value": "" }),
            Self::FilterRows => json!({ "condition": "" }),
            Self::ValueMapping => json!({ "column": "", "mapping": {} }),
            Self::FeatureEngineering => json!({ "new_column": "", "formula": "" }),
            Self::GroupByAggregation => {
                json!({ "group_by_columns": [], "agg_column": "", "agg_function": "sum" })
            }
            Self::PivotTable => {
                json!({ "index_column": "", "columns_column": "", "values_column": "" })
            }
            Self::NormalizeScale => json!({ "columns": [], "method": "minmax" }),
            Self::RegexReplace => json!({ "column": "", "pattern": "", "replacement": "" }),
        };
        match params {
            JsonValue::Object(map) => map,
            _ => Map::new(),
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepKind {
    type Err = ParseStepKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ParseStepKindError { kind: s.to_string() })
    }
}

/// One declared, parameterized operation in a pipeline. List order is execution order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationStep {
    /// Unique id; generated when absent.
    #[serde(default = "new_step_id")]
    pub id: String,
    /// Operator name, see [`StepKind::as_str`].
    #[serde(alias = "step")]
    pub kind: String,
    /// Label reported in results and errors.
    #[serde(default, alias = "name")]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<StepCategory>,
    /// Operator parameters by name.
    #[serde(default, alias = "params")]
    pub parameters: Map<String, JsonValue>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn new_step_id() -> String {
    Uuid::new_v4().to_string()
}

fn enabled_by_default() -> bool {
    true
}

impl TransformationStep {
    /// A new enabled step of `kind` starting from its default parameters.
    pub fn new(kind: StepKind, label: impl Into<String>) -> Self {
        Self {
            id: new_step_id(),
            kind: kind.as_str().to_string(),
            label: label.into(),
            category: Some(kind.category()),
            parameters: kind.default_parameters(),
            enabled: true,
        }
    }

    /// A step naming an arbitrary operator with an empty parameter bag.
    pub fn custom(kind: impl Into<String>, label: impl Into<String>) -> Self {
        let kind = kind.into();
        Self {
            id: new_step_id(),
            category: kind.parse::<StepKind>().ok().map(StepKind::category),
            kind,
            label: label.into(),
            parameters: Map::new(),
            enabled: true,
        }
    }

    /// Set one parameter, replacing any previous value.
    pub fn with_parameter(mut self, name: impl Into<String>, value: JsonValue) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    /// Mark the step as disabled.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Label used in results and errors: the step label, or the kind when the label is blank.
    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.kind
        } else {
            &self.label
        }
    }
}
