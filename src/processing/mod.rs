//! In-memory table transformations.
//!
//! Every transformation here is a stateless [`Transform`]: it reads a [`Table`] and returns a
//! new one, leaving the input untouched.
//!
//! Column operations:
//!
//! - [`DropColumns`]: remove columns
//! - [`FillWith`]: replace missing values (constant or column statistic)
//! - [`ChangeType`]: coerce a column to another [`crate::types::DataType`]
//!
//! Derived features (append or replace one column):
//!
//! - [`AttendanceDeficiency`]: `FALTOSO = H_AULA_PRES <= FALTAS`
//! - [`GradeAverage`]: `MEDIA_GERAL`, the mean of the positive, present grades
//! - [`NormalizeGrade`]: fill empty grades per an [`EmptyGradePolicy`] and clamp to 10
//! - [`DifficultyFlag`]: `DIFICULDADE = MEDIA_GERAL == 0`
//!
//! ## Example
//!
//! ```rust
//! use profile_features::processing::{FillStrategy, FillWith, GradeAverage, Transform};
//! use profile_features::types::{DataType, Field, Schema, Table, Value};
//!
//! let schema = Schema::new(vec![
//!     Field::new("NOTA_DE", DataType::Float64),
//!     Field::new("NOTA_EM", DataType::Float64),
//!     Field::new("NOTA_MF", DataType::Float64),
//!     Field::new("NOTA_GO", DataType::Float64),
//! ]);
//! let table = Table::new(
//!     schema,
//!     vec![vec![Value::Float64(8.0), Value::Float64(0.0), Value::Null, Value::Float64(9.0)]],
//! );
//!
//! let table = GradeAverage::default().apply(&table)?;
//! assert_eq!(table.column("MEDIA_GERAL")?, vec![&Value::Float64(8.5)]);
//!
//! let filled = FillWith::new("NOTA_MF", FillStrategy::Value(Value::Float64(0.0))).apply(&table)?;
//! assert_eq!(filled.rows[0][2], Value::Float64(0.0));
//! # Ok::<(), profile_features::FeatureError>(())
//! ```

pub mod attendance;
pub mod cast;
pub mod columns;
pub mod fill;
pub mod grades;
pub mod reduce;

pub use attendance::AttendanceDeficiency;
pub use cast::ChangeType;
pub use columns::{DropColumns, MissingColumns};
pub use fill::{FillStrategy, FillWith};
pub use grades::{
    grade_average, normalize_grade, DifficultyFlag, EmptyGradePolicy, GradeAverage, NormalizeGrade,
};
pub use reduce::{reduce, ReduceOp};

use crate::error::FeatureResult;
use crate::types::Table;

/// A single pure table transformation.
pub trait Transform {
    /// Short stable name used in logs and observer events.
    fn name(&self) -> &'static str;

    /// Apply the transformation, returning a new table.
    fn apply(&self, table: &Table) -> FeatureResult<Table>;
}
