//! Ordered composition of stages.
//!
//! A [`Pipeline`] applies its [`Stage`]s one after another, feeding each stage the table the
//! previous one returned. The first error stops the run and is returned as is; no partial
//! table is produced.
//!
//! Runs are logged through `tracing` (an `info` span per run, a `debug` event per stage) and
//! reported to an optional [`PipelineObserver`].
//!
//! ```rust
//! use profile_features::pipeline::{Pipeline, Stage};
//! use profile_features::processing::{DropColumns, FillWith, GradeAverage};
//! use profile_features::types::{DataType, Field, Schema, Table, Value};
//!
//! let schema = Schema::new(vec![
//!     Field::new("NOME", DataType::Utf8),
//!     Field::new("NOTA_DE", DataType::Float64),
//!     Field::new("NOTA_EM", DataType::Float64),
//!     Field::new("NOTA_MF", DataType::Float64),
//!     Field::new("NOTA_GO", DataType::Float64),
//! ]);
//! let table = Table::new(
//!     schema,
//!     vec![vec![
//!         Value::Utf8("Ana".into()),
//!         Value::Float64(6.0),
//!         Value::Null,
//!         Value::Float64(8.0),
//!         Value::Float64(0.0),
//!     ]],
//! );
//!
//! let pipeline = Pipeline::new(vec![
//!     Stage::DropColumns(DropColumns::new(["NOME"])),
//!     Stage::FillWith(FillWith::value("NOTA_EM", Value::Float64(0.0))),
//!     Stage::GradeAverage(GradeAverage::default()),
//! ]);
//! let out = pipeline.run(&table)?;
//! assert_eq!(out.column("MEDIA_GERAL")?, vec![&Value::Float64(7.0)]);
//! # Ok::<(), profile_features::FeatureError>(())
//! ```

mod config;
mod observer;

pub use config::PipelineConfig;
pub use observer::{
    CompositeObserver, PipelineObserver, StageContext, StageStats, TracingObserver,
};

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, FeatureResult};
use crate::processing::{
    AttendanceDeficiency, ChangeType, DifficultyFlag, DropColumns, FillWith, GradeAverage,
    NormalizeGrade, Transform,
};
use crate::resample::Rebalance;
use crate::types::Table;

/// One pipeline step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Stage {
    /// Remove columns.
    DropColumns(DropColumns),
    /// Replace missing values.
    FillWith(FillWith),
    /// Coerce a column to another type.
    ChangeType(ChangeType),
    /// Derive the attendance flag.
    AttendanceDeficiency(AttendanceDeficiency),
    /// Derive the grade average.
    GradeAverage(GradeAverage),
    /// Fill and clamp one grade column.
    NormalizeGrade(NormalizeGrade),
    /// Derive the difficulty flag.
    DifficultyFlag(DifficultyFlag),
    /// Oversample the target column's minority classes.
    Rebalance(Rebalance),
}

impl Stage {
    /// Stable stage name used in logs and observer callbacks.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::DropColumns(op) => op.name(),
            Stage::FillWith(op) => op.name(),
            Stage::ChangeType(op) => op.name(),
            Stage::AttendanceDeficiency(op) => op.name(),
            Stage::GradeAverage(op) => op.name(),
            Stage::NormalizeGrade(op) => op.name(),
            Stage::DifficultyFlag(op) => op.name(),
            Stage::Rebalance(_) => "rebalance",
        }
    }

    /// Apply the stage. `target` is only read by [`Stage::Rebalance`].
    pub fn apply(&self, table: &Table, target: Option<&str>) -> FeatureResult<Table> {
        match self {
            Stage::DropColumns(op) => op.apply(table),
            Stage::FillWith(op) => op.apply(table),
            Stage::ChangeType(op) => op.apply(table),
            Stage::AttendanceDeficiency(op) => op.apply(table),
            Stage::GradeAverage(op) => op.apply(table),
            Stage::NormalizeGrade(op) => op.apply(table),
            Stage::DifficultyFlag(op) => op.apply(table),
            Stage::Rebalance(op) => {
                let target = target.ok_or_else(|| FeatureError::InvalidConfig {
                    message: "a rebalance stage needs a target column".to_string(),
                })?;
                op.apply(table, target)
            }
        }
    }
}

/// An ordered list of stages plus the target column for rebalancing.
#[derive(Clone, Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
    target: Option<String>,
    observer: Option<Arc<dyn PipelineObserver>>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stages)
            .field("target", &self.target)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl Pipeline {
    /// Create a pipeline with no target and no observer.
    pub fn new(stages: Vec<Stage>) -> Self {
        Self {
            stages,
            target: None,
            observer: None,
        }
    }

    /// Build a pipeline from a validated configuration.
    pub fn from_config(config: PipelineConfig) -> FeatureResult<Self> {
        config.validate()?;
        Ok(Self {
            stages: config.stages,
            target: config.target,
            observer: None,
        })
    }

    /// The configuration this pipeline was built from.
    pub fn config(&self) -> PipelineConfig {
        PipelineConfig {
            target: self.target.clone(),
            stages: self.stages.clone(),
        }
    }

    /// Set the target column used by [`Stage::Rebalance`].
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Attach an observer for stage events.
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Stages in run order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Target column, if one is set.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Run every stage in order and return the final table. `input` is not modified.
    pub fn run(&self, input: &Table) -> FeatureResult<Table> {
        let span = tracing::info_span!(
            "pipeline",
            stages = self.stages.len(),
            input_rows = input.row_count(),
            input_columns = input.column_count()
        );
        let _enter = span.enter();

        let mut current: Option<Table> = None;
        for (index, stage) in self.stages.iter().enumerate() {
            let ctx = StageContext {
                index,
                name: stage.name(),
            };
            let source = current.as_ref().unwrap_or(input);
            self.emit(|o| o.on_stage_started(&ctx));

            let start = Instant::now();
            let next = match stage.apply(source, self.target.as_deref()) {
                Ok(next) => next,
                Err(error) => {
                    tracing::warn!(stage = ctx.name, index, %error, "stage failed");
                    self.emit(|o| o.on_failure(&ctx, &error));
                    return Err(error);
                }
            };
            let stats = StageStats {
                input_rows: source.row_count(),
                output_rows: next.row_count(),
                output_columns: next.column_count(),
                elapsed: start.elapsed(),
            };
            tracing::debug!(
                stage = ctx.name,
                index,
                input_rows = stats.input_rows,
                output_rows = stats.output_rows,
                output_columns = stats.output_columns,
                elapsed_us = stats.elapsed.as_micros() as u64,
                "stage finished"
            );
            self.emit(|o| o.on_stage_finished(&ctx, stats));
            current = Some(next);
        }

        Ok(current.unwrap_or_else(|| input.clone()))
    }

    fn emit(&self, f: impl FnOnce(&dyn PipelineObserver)) {
        if let Some(obs) = &self.observer {
            f(&**obs);
        }
    }
}
