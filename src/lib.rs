//! `rust-data-transform` runs declarative transformation pipelines over in-memory, record-oriented
//! datasets and reports data-quality metrics on the result.
//!
//! The primary entrypoint is [`execution::TransformationEngine::execute`], which takes a
//! [`types::DataSet`], an ordered list of [`step::TransformationStep`]s and a preview flag.
//! Long-lived working datasets are kept in a [`session::SessionStore`].
//!
//! ## What a pipeline can do
//!
//! - basic: `rename_columns`, `drop_columns`, `change_data_types`, `trim_whitespace`,
//!   `handle_nulls`
//! - intermediate: `filter_rows`, `value_mapping`, `feature_engineering`, `one_hot_encoding`
//! - advanced: `group_by_aggregation`, `pivot_table`, `normalize_scale`, `regex_replace`
//!
//! `filter_rows` conditions and `feature_engineering` formulas are written in a small expression
//! language (see [`expression`]); it is parsed, never evaluated as code.
//!
//! **Data model:**
//!
//! Records are schema-less, insertion-ordered maps from column name to a tagged [`types::Value`]:
//!
//! - [`types::Value::Number`]
//! - [`types::Value::Utf8`]
//! - [`types::Value::Bool`]
//! - [`types::Value::Date`] (ISO-8601 text)
//! - [`types::Value::Null`]
//!
//! A cell is *missing* when the key is absent, the value is null, or it is the empty string.
//!
//! ## Quick example
//!
//! ```rust
//! use rust_data_transform::execution::TransformationEngine;
//! use rust_data_transform::ingestion::ingest_json_from_str;
//! use rust_data_transform::step::{StepKind, TransformationStep};
//! use rust_data_transform::types::Value;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ds = ingest_json_from_str(r#"[
//!     {"g": "x", "v": 1},
//!     {"g": "x", "v": 3},
//!     {"g": "y", "v": 5}
//! ]"#)?;
//!
//! let steps = vec![
//!     TransformationStep::new(StepKind::GroupByAggregation, "Totals per group")
//!         .with_parameter("group_by_columns", serde_json::json!(["g"]))
//!         .with_parameter("agg_column", serde_json::json!("v"))
//!         .with_parameter("agg_function", serde_json::json!("sum")),
//! ];
//!
//! let result = TransformationEngine::default().execute(&ds, &steps, false)?;
//! assert_eq!(result.columns, vec!["g", "v_sum"]);
//! assert_eq!(result.data.rows[0].get("v_sum"), Some(&Value::from(4)));
//! assert_eq!(result.quality_report.duplicate_rows, 0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: records, datasets and values
//! - [`step`]: declarative steps and the step-kind catalog
//! - [`processing`]: the operators, one pure function per step kind
//! - [`expression`]: condition/formula parser and evaluator
//! - [`execution`]: the engine, its options, metrics and observer hooks
//! - [`quality`]: data-quality report
//! - [`session`]: session registry and one-click presets
//! - [`ingestion`]: JSON/CSV record adapters
//! - [`error`]: error types

pub mod error;
pub mod execution;
pub mod expression;
pub mod ingestion;
pub mod processing;
pub mod quality;
pub mod session;
pub mod step;
pub mod types;

pub use error::{
    ExpressionError, IngestionError, IngestionResult, OperatorError, SessionError, SessionResult,
    TransformError, TransformResult,
};
pub use execution::{ExecutionOptions, TransformationEngine, TransformationResult};
pub use quality::QualityReport;
pub use session::{Preset, Session, SessionStore};
pub use step::{StepKind, TransformationStep};
pub use types::{DataSet, DataType, Record, Value};
