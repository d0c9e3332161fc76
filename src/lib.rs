//! `profile-features` is a small library of feature-engineering stages for an in-memory
//! [`types::Table`], chained into a [`pipeline::Pipeline`] that prepares academic records for a
//! classifier predicting a student's profile (`PERFIL`).
//!
//! Every stage is a pure function of its input table: it returns a new table and never modifies
//! the one it was given. Loading the data and training the model are left to the caller.
//!
//! ## Stages
//!
//! **Column operations** ([`processing`]):
//!
//! - [`processing::DropColumns`]: remove columns (fails on unknown names unless told to ignore them)
//! - [`processing::FillWith`]: replace missing values with a constant or a column statistic
//! - [`processing::ChangeType`]: coerce a column to another [`types::DataType`]
//!
//! **Derived features** ([`processing`]):
//!
//! - [`processing::AttendanceDeficiency`]: `FALTOSO`, absences reached the expected hours
//! - [`processing::GradeAverage`]: `MEDIA_GERAL`, mean of the positive, present grades
//! - [`processing::NormalizeGrade`]: fill empty grades per an explicit
//!   [`processing::EmptyGradePolicy`] and clamp to 10
//! - [`processing::DifficultyFlag`]: `DIFICULDADE`, the grade average is zero
//!
//! **Rebalancing** ([`resample`]):
//!
//! - [`resample::Rebalance`]: oversample minority classes of the target column with
//!   [`resample::Smote`] or [`resample::RandomOverSampler`]
//!
//! Missing values are [`types::Value::Null`] or a `Float64` NaN; both are treated the same way.
//!
//! ## Example
//!
//! ```rust
//! use profile_features::processing::EmptyGradePolicy;
//! use profile_features::student::{self, standard_pipeline};
//! use profile_features::types::{DataType, Field, Schema, Table, Value};
//!
//! # fn main() -> Result<(), profile_features::FeatureError> {
//! let mut fields = vec![Field::new(student::NOME, DataType::Utf8)];
//! for c in student::FAILURE_COLUMNS {
//!     fields.push(Field::new(c, DataType::Int64));
//! }
//! for c in student::GRADE_COLUMNS {
//!     fields.push(Field::new(c, DataType::Float64));
//! }
//! for c in [student::INGLES, student::TAREFAS_ONLINE, student::H_AULA_PRES, student::FALTAS] {
//!     fields.push(Field::new(c, DataType::Int64));
//! }
//! fields.push(Field::new(student::PERFIL, DataType::Utf8));
//!
//! let row = |name: &str, grade: f64, perfil: &str| {
//!     let mut r = vec![Value::Utf8(name.into())];
//!     r.extend([Value::Int64(0), Value::Null, Value::Int64(1), Value::Int64(0)]);
//!     r.extend([Value::Float64(grade), Value::Null, Value::Float64(grade), Value::Float64(0.0)]);
//!     r.extend([Value::Int64(1), Value::Int64(3), Value::Int64(10), Value::Int64(2)]);
//!     r.push(Value::Utf8(perfil.into()));
//!     r
//! };
//! let table = Table::try_new(
//!     Schema::new(fields),
//!     vec![
//!         row("Ana", 7.0, "EXCELENTE"),
//!         row("Bia", 8.0, "EXCELENTE"),
//!         row("Caio", 6.5, "EXCELENTE"),
//!         row("Davi", 4.0, "INDECISO"),
//!         row("Eva", 3.0, "INDECISO"),
//!     ],
//! )?;
//!
//! let out = standard_pipeline(EmptyGradePolicy::PassFail, Some(42)).run(&table)?;
//! assert_eq!(out.row_count(), 6);
//! assert_eq!(out.column_count(), student::default_features().len() + 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: schema + in-memory table types
//! - [`processing`]: column operations and derived features
//! - [`resample`]: oversampling and the rebalance stage
//! - [`pipeline`]: stage composition, JSON configuration and observer hooks
//! - [`student`]: column names of the academic-records dataset and the standard pipeline
//! - [`error`]: the error type shared by every stage

pub mod error;
pub mod pipeline;
pub mod processing;
pub mod resample;
pub mod student;
pub mod types;

pub use error::{FeatureError, FeatureResult};
