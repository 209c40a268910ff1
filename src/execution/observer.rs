use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::step::StepKind;

/// Execution events emitted by the engine.
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted {
        input_rows: usize,
        steps: usize,
        preview: bool,
    },
    StepStarted {
        index: usize,
        label: String,
        kind: StepKind,
        input_rows: usize,
    },
    StepFinished {
        index: usize,
        label: String,
        output_rows: usize,
        elapsed: Duration,
    },
    /// Also sent without a `StepStarted` when a step is rejected before any step runs.
    StepFailed {
        index: usize,
        label: String,
        message: String,
    },
    RunFinished {
        elapsed: Duration,
        metrics: ExecutionMetricsSnapshot,
    },
}

/// Observer hook for execution events.
pub trait ExecutionObserver: Send + Sync {
    fn on_event(&self, event: &ExecutionEvent);
}

/// Fans each event out to several observers, in order.
#[derive(Default, Clone)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ExecutionObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn ExecutionObserver>>) -> Self {
        Self { observers }
    }

    pub fn push(&mut self, observer: Arc<dyn ExecutionObserver>) {
        self.observers.push(observer);
    }
}

impl ExecutionObserver for CompositeObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}

/// Cumulative metrics across every run of one engine.
///
/// The engine updates these counters as it goes; callers can snapshot them at any time, from any
/// thread.
#[derive(Debug, Default)]
pub struct ExecutionMetrics {
    runs_started: AtomicU64,
    runs_failed: AtomicU64,
    steps_applied: AtomicU64,
    steps_failed: AtomicU64,
    rows_in: AtomicU64,
    rows_out: AtomicU64,
    last_elapsed_ns: AtomicU64,
}

impl ExecutionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_run(&self, input_rows: usize) {
        let _ = self.runs_started.fetch_add(1, Ordering::SeqCst);
        let _ = self.rows_in.fetch_add(input_rows as u64, Ordering::SeqCst);
    }

    pub fn end_run(&self, output_rows: usize, elapsed: Duration) {
        let _ = self.rows_out.fetch_add(output_rows as u64, Ordering::SeqCst);
        self.last_elapsed_ns
            .store(elapsed.as_nanos().min(u64::MAX as u128) as u64, Ordering::SeqCst);
    }

    pub fn fail_run(&self, elapsed: Duration) {
        let _ = self.runs_failed.fetch_add(1, Ordering::SeqCst);
        self.last_elapsed_ns
            .store(elapsed.as_nanos().min(u64::MAX as u128) as u64, Ordering::SeqCst);
    }

    pub fn on_step_applied(&self) {
        let _ = self.steps_applied.fetch_add(1, Ordering::SeqCst);
    }

    pub fn on_step_failed(&self) {
        let _ = self.steps_failed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> ExecutionMetricsSnapshot {
        let elapsed_ns = self.last_elapsed_ns.load(Ordering::SeqCst);
        ExecutionMetricsSnapshot {
            runs_started: self.runs_started.load(Ordering::SeqCst),
            runs_failed: self.runs_failed.load(Ordering::SeqCst),
            steps_applied: self.steps_applied.load(Ordering::SeqCst),
            steps_failed: self.steps_failed.load(Ordering::SeqCst),
            rows_in: self.rows_in.load(Ordering::SeqCst),
            rows_out: self.rows_out.load(Ordering::SeqCst),
            last_elapsed: (elapsed_ns > 0).then(|| Duration::from_nanos(elapsed_ns)),
        }
    }
}

/// Immutable snapshot of [`ExecutionMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionMetricsSnapshot {
    pub runs_started: u64,
    pub runs_failed: u64,
    pub steps_applied: u64,
    pub steps_failed: u64,
    /// Rows fed into runs, after preview sampling.
    pub rows_in: u64,
    /// Rows produced by successful runs.
    pub rows_out: u64,
    pub last_elapsed: Option<Duration>,
}

impl fmt::Display for ExecutionMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "runs={} (failed {}), steps={} (failed {}), rows_in={}, rows_out={}, last_elapsed={:?}",
            self.runs_started,
            self.runs_failed,
            self.steps_applied,
            self.steps_failed,
            self.rows_in,
            self.rows_out,
            self.last_elapsed
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::{CompositeObserver, ExecutionEvent, ExecutionMetrics, ExecutionObserver};

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl ExecutionObserver for Counter {
        fn on_event(&self, _event: &ExecutionEvent) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn composite_forwards_to_every_observer() {
        let a = Arc::new(Counter::default());
        let b = Arc::new(Counter::default());
        let mut composite = CompositeObserver::new(vec![a.clone() as Arc<dyn ExecutionObserver>]);
        composite.push(b.clone());

        composite.on_event(&ExecutionEvent::RunStarted {
            input_rows: 0,
            steps: 0,
            preview: false,
        });
        assert_eq!(a.0.load(Ordering::SeqCst), 1);
        assert_eq!(b.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn metrics_accumulate_across_runs() {
        let m = ExecutionMetrics::new();
        m.begin_run(10);
        m.on_step_applied();
        m.end_run(4, Duration::from_millis(3));
        m.begin_run(4);
        m.on_step_failed();
        m.fail_run(Duration::from_millis(1));

        let snap = m.snapshot();
        assert_eq!(snap.runs_started, 2);
        assert_eq!(snap.runs_failed, 1);
        assert_eq!(snap.steps_applied, 1);
        assert_eq!(snap.steps_failed, 1);
        assert_eq!(snap.rows_in, 14);
        assert_eq!(snap.rows_out, 4);
        assert_eq!(snap.last_elapsed, Some(Duration::from_millis(1)));
        assert!(snap.to_string().starts_with("runs=2 (failed 1)"));
    }
}
