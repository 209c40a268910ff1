//! Execution engine for running transformation pipelines.
//!
//! This module sits "above" [`crate::processing`] and provides:
//!
//! - Sequential, all-or-nothing execution of an ordered step list
//! - Preview runs over a capped sample of the input
//! - Real-time metrics + observer hooks for monitoring, and `tracing` logs per run and step
//!
//! ```rust
//! use rust_data_transform::execution::TransformationEngine;
//! use rust_data_transform::step::{StepKind, TransformationStep};
//! use rust_data_transform::types::{DataSet, Record, Value};
//!
//! let ds: DataSet = [("x", 1), ("y", 2)]
//!     .into_iter()
//!     .map(|(g, v)| Record::from_iter([("g", Value::from(g)), ("v", Value::from(v))]))
//!     .collect();
//!
//! let steps = vec![
//!     TransformationStep::new(StepKind::FilterRows, "Keep v > 1")
//!         .with_parameter("condition", serde_json::json!("v > 1")),
//! ];
//!
//! let result = TransformationEngine::default().execute(&ds, &steps, false).unwrap();
//! assert_eq!(result.total_rows, 1);
//! assert_eq!(result.applied_transformations, vec!["Keep v > 1".to_string()]);
//! ```

mod observer;

use std::borrow::Cow;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::error::{TransformError, TransformResult};
use crate::processing::Operation;
use crate::quality::{self, QualityReport};
use crate::step::TransformationStep;
use crate::types::{DataSet, Record};

pub use observer::{
    CompositeObserver, ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot,
    ExecutionObserver,
};

/// Configuration for the [`TransformationEngine`].
///
/// Deserializable so hosts can keep it in a config file; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionOptions {
    /// Rows a preview run keeps from the start of the input before any step runs.
    pub preview_sample_rows: usize,
    /// Rows returned in [`TransformationResult::preview`].
    pub preview_rows: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            preview_sample_rows: 1_000,
            preview_rows: 10,
        }
    }
}

impl ExecutionOptions {
    /// Parse options from TOML, e.g. `preview_rows = 25`.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}

/// Output of a successful [`TransformationEngine::execute`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationResult {
    pub data: DataSet,
    /// The first [`ExecutionOptions::preview_rows`] rows of `data`.
    pub preview: Vec<Record>,
    pub total_rows: usize,
    /// Keys of the first record of `data`.
    pub columns: Vec<String>,
    /// Labels of the steps that ran, in execution order. Disabled steps are not listed.
    pub applied_transformations: Vec<String>,
    #[serde(rename = "processingTimeMs", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    pub quality_report: QualityReport,
}

fn serialize_millis<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(d.as_secs_f64() * 1_000.0)
}

/// Runs ordered step lists against datasets.
///
/// The engine holds no dataset state between calls; the same engine may run any number of
/// pipelines and accumulates [`ExecutionMetrics`] across them.
pub struct TransformationEngine {
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl Default for TransformationEngine {
    fn default() -> Self {
        Self::new(ExecutionOptions::default())
    }
}

impl TransformationEngine {
    /// Create a new engine with the given options.
    pub fn new(opts: ExecutionOptions) -> Self {
        Self {
            opts,
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        }
    }

    /// Attach an observer for execution events (metrics/logging).
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.opts
    }

    /// Get a handle to real-time execution metrics.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Run the enabled `steps` over `data`, in order.
    ///
    /// With `preview_only` the input is first cut to [`ExecutionOptions::preview_sample_rows`].
    /// Every enabled step is resolved before the first one runs, so an unknown kind or a bad
    /// parameter bag fails without touching any row. The first operator failure aborts the run;
    /// no partial result is returned. `data` itself is never modified.
    pub fn execute(
        &self,
        data: &DataSet,
        steps: &[TransformationStep],
        preview_only: bool,
    ) -> TransformResult<TransformationResult> {
        let start = Instant::now();
        let mut current: Cow<'_, DataSet> = if preview_only {
            Cow::Owned(data.head(self.opts.preview_sample_rows))
        } else {
            Cow::Borrowed(data)
        };

        let enabled: Vec<&TransformationStep> = steps.iter().filter(|s| s.enabled).collect();
        self.metrics.begin_run(current.row_count());
        self.emit(ExecutionEvent::RunStarted {
            input_rows: current.row_count(),
            steps: enabled.len(),
            preview: preview_only,
        });

        let mut plan = Vec::with_capacity(enabled.len());
        for (index, step) in enabled.iter().enumerate() {
            match Operation::from_step(step) {
                Ok(op) => plan.push((step.display_label(), op)),
                Err(e) => {
                    warn!(step = e.label(), error = %e, "pipeline rejected");
                    self.metrics.fail_run(start.elapsed());
                    self.emit(ExecutionEvent::StepFailed {
                        index,
                        label: e.label().to_string(),
                        message: e.to_string(),
                    });
                    return Err(e);
                }
            }
        }

        let mut applied = Vec::with_capacity(plan.len());
        for (index, (label, op)) in plan.into_iter().enumerate() {
            let step_start = Instant::now();
            let input_rows = current.row_count();
            self.emit(ExecutionEvent::StepStarted {
                index,
                label: label.to_string(),
                kind: op.kind(),
                input_rows,
            });

            match op.apply(&current) {
                Ok(out) => {
                    let elapsed = step_start.elapsed();
                    debug!(
                        step = label,
                        kind = %op.kind(),
                        rows_in = input_rows,
                        rows_out = out.row_count(),
                        elapsed_ms = elapsed.as_secs_f64() * 1_000.0,
                        "step applied"
                    );
                    self.metrics.on_step_applied();
                    self.emit(ExecutionEvent::StepFinished {
                        index,
                        label: label.to_string(),
                        output_rows: out.row_count(),
                        elapsed,
                    });
                    current = Cow::Owned(out);
                    applied.push(label.to_string());
                }
                Err(source) => {
                    warn!(step = label, kind = %op.kind(), error = %source, "step failed");
                    self.metrics.on_step_failed();
                    self.metrics.fail_run(start.elapsed());
                    self.emit(ExecutionEvent::StepFailed {
                        index,
                        label: label.to_string(),
                        message: source.to_string(),
                    });
                    return Err(TransformError::Step {
                        label: label.to_string(),
                        source,
                    });
                }
            }
        }

        let data = current.into_owned();
        let columns = data.columns();
        let preview = data.preview(self.opts.preview_rows);
        let total_rows = data.row_count();
        let elapsed = start.elapsed();
        let quality_report = quality::report(&data);

        self.metrics.end_run(total_rows, elapsed);
        info!(
            steps = applied.len(),
            rows_out = total_rows,
            preview = preview_only,
            elapsed_ms = elapsed.as_secs_f64() * 1_000.0,
            "pipeline finished"
        );
        self.emit(ExecutionEvent::RunFinished {
            elapsed,
            metrics: self.metrics.snapshot(),
        });

        Ok(TransformationResult {
            data,
            preview,
            total_rows,
            columns,
            applied_transformations: applied,
            elapsed,
            quality_report,
        })
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}
