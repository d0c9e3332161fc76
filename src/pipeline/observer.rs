use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::FeatureError;

/// Identifies one stage within a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageContext {
    /// Zero-based position of the stage in the pipeline.
    pub index: usize,
    /// Stable stage name (e.g. `"drop_columns"`).
    pub name: &'static str,
}

/// Shape of the table before and after a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageStats {
    /// Rows the stage received.
    pub input_rows: usize,
    /// Rows the stage produced.
    pub output_rows: usize,
    /// Columns the stage produced.
    pub output_columns: usize,
    /// Wall time spent in the stage.
    pub elapsed: Duration,
}

/// Observer interface for pipeline runs.
///
/// Implementors can record metrics, collect timings, or trigger alerts. Every method has an
/// empty default.
pub trait PipelineObserver: Send + Sync {
    /// Called before a stage is applied.
    fn on_stage_started(&self, _ctx: &StageContext) {}

    /// Called after a stage produced its table.
    fn on_stage_finished(&self, _ctx: &StageContext, _stats: StageStats) {}

    /// Called when a stage fails. The run stops right after this.
    fn on_failure(&self, _ctx: &StageContext, _error: &FeatureError) {}
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn PipelineObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn PipelineObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl PipelineObserver for CompositeObserver {
    fn on_stage_started(&self, ctx: &StageContext) {
        for o in &self.observers {
            o.on_stage_started(ctx);
        }
    }

    fn on_stage_finished(&self, ctx: &StageContext, stats: StageStats) {
        for o in &self.observers {
            o.on_stage_finished(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &StageContext, error: &FeatureError) {
        for o in &self.observers {
            o.on_failure(ctx, error);
        }
    }
}

/// Emits stage events as `tracing` events under the `profile_features::stage` target.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_stage_started(&self, ctx: &StageContext) {
        tracing::trace!(target: "profile_features::stage", stage = ctx.name, index = ctx.index, "started");
    }

    fn on_stage_finished(&self, ctx: &StageContext, stats: StageStats) {
        tracing::info!(
            target: "profile_features::stage",
            stage = ctx.name,
            index = ctx.index,
            rows = stats.output_rows,
            columns = stats.output_columns,
            elapsed_ms = stats.elapsed.as_secs_f64() * 1000.0,
            "ok"
        );
    }

    fn on_failure(&self, ctx: &StageContext, error: &FeatureError) {
        tracing::error!(
            target: "profile_features::stage",
            stage = ctx.name,
            index = ctx.index,
            err = %error,
            "failed"
        );
    }
}
