//! Missing-value imputation.

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, FeatureResult};
use crate::types::{DataType, Table, Value};

use super::cast::float_to_int;
use super::reduce::{reduce, ReduceOp};
use super::Transform;

/// Where the replacement for a missing value comes from.
///
/// Statistics are computed over the non-missing values of the table being transformed, so the
/// stage carries no fitted state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStrategy {
    /// A constant.
    Value(Value),
    /// Column mean (rounded for `Int64` columns).
    Mean,
    /// Column median (rounded for `Int64` columns).
    Median,
    /// Most frequent value of the column.
    MostFrequent,
}

/// Replace every missing value of `column`; present values are left as they are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillWith {
    /// Column whose missing values are replaced.
    pub column: String,
    /// Where the replacement comes from.
    pub fill: FillStrategy,
}

impl FillWith {
    /// Create a fill stage for `column`.
    pub fn new(column: impl Into<String>, fill: FillStrategy) -> Self {
        Self {
            column: column.into(),
            fill,
        }
    }

    /// Shorthand for a constant fill.
    pub fn value(column: impl Into<String>, value: Value) -> Self {
        Self::new(column, FillStrategy::Value(value))
    }

    fn replacement(&self, table: &Table) -> FeatureResult<Value> {
        match &self.fill {
            FillStrategy::Value(Value::Null) => Err(FeatureError::InvalidConfig {
                message: format!("fill value for '{}' must not be null", self.column),
            }),
            FillStrategy::Value(v) => Ok(v.clone()),
            FillStrategy::Mean => reduce(table, &self.column, ReduceOp::Mean),
            FillStrategy::Median => reduce(table, &self.column, ReduceOp::Median),
            FillStrategy::MostFrequent => reduce(table, &self.column, ReduceOp::MostFrequent),
        }
    }
}

impl Transform for FillWith {
    fn name(&self) -> &'static str {
        "fill_with"
    }

    fn apply(&self, table: &Table) -> FeatureResult<Table> {
        let idx = table.schema.require(&self.column)?;
        let data_type = table.schema.fields[idx].data_type;

        if matches!(self.fill, FillStrategy::Mean | FillStrategy::Median)
            && !matches!(data_type, DataType::Int64 | DataType::Float64)
        {
            return Err(FeatureError::InvalidConfig {
                message: format!(
                    "{:?} fill needs a numeric column, '{}' is {data_type:?}",
                    self.fill, self.column
                ),
            });
        }

        let replacement = self.replacement(table)?;
        if replacement.is_missing() {
            // A statistic over a column with nothing present: leave the column as is.
            return Ok(table.clone());
        }
        let rounded = !matches!(self.fill, FillStrategy::Value(_));
        let first_missing = table.rows.iter().position(|row| row[idx].is_missing());
        let replacement = match first_missing {
            Some(row) => coerce_fill(&replacement, data_type, rounded)
                .ok_or_else(|| FeatureError::TypeCoercion {
                    row,
                    column: self.column.clone(),
                    raw: replacement.to_string(),
                    message: format!("fill value is not compatible with {data_type:?}"),
                })?,
            None => return Ok(table.clone()),
        };

        table.map_column(&self.column, data_type, |_, v| {
            Ok(if v.is_missing() {
                replacement.clone()
            } else {
                v.clone()
            })
        })
    }
}

fn coerce_fill(value: &Value, data_type: DataType, round: bool) -> Option<Value> {
    match (data_type, value) {
        (DataType::Int64, Value::Int64(_)) => Some(value.clone()),
        (DataType::Int64, Value::Float64(f)) if round => float_to_int(f.round()).map(Value::Int64),
        (DataType::Int64, Value::Float64(f)) if f.fract() == 0.0 => {
            float_to_int(*f).map(Value::Int64)
        }
        (DataType::Float64, Value::Int64(i)) => Some(Value::Float64(*i as f64)),
        (DataType::Float64, Value::Float64(_)) => Some(value.clone()),
        (DataType::Bool, Value::Bool(_)) => Some(value.clone()),
        (DataType::Utf8 | DataType::Categorical, Value::Utf8(_)) => Some(value.clone()),
        _ => None,
    }
}
