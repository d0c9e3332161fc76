//! Column type coercion.

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, FeatureResult};
use crate::types::{DataType, Table, Value};

use super::Transform;

/// Coerce every value of `column` to `target`.
///
/// Missing values become [`Value::Null`]. Rules:
///
/// - `Int64`: floats are truncated (must be finite), booleans map to 0/1, strings must parse as
///   an integer.
/// - `Float64`: integers and booleans convert, strings must parse as a float.
/// - `Bool`: numbers are `true` when non-zero; strings accept `true/t/1/yes/y` and
///   `false/f/0/no/n` (case-insensitive).
/// - `Utf8` / `Categorical`: the value's display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeType {
    /// Column to convert.
    pub column: String,
    /// Type the column is converted to.
    pub target: DataType,
}

impl ChangeType {
    /// Create a stage converting `column` to `target`.
    pub fn new(column: impl Into<String>, target: DataType) -> Self {
        Self {
            column: column.into(),
            target,
        }
    }
}

impl Transform for ChangeType {
    fn name(&self) -> &'static str {
        "change_type"
    }

    fn apply(&self, table: &Table) -> FeatureResult<Table> {
        table.map_column(&self.column, self.target, |row, value| {
            coerce(value, self.target).map_err(|message| FeatureError::TypeCoercion {
                row,
                column: self.column.clone(),
                raw: value.to_string(),
                message,
            })
        })
    }
}

/// Coerce a single value. The error string explains why the value does not fit.
pub fn coerce(value: &Value, target: DataType) -> Result<Value, String> {
    if value.is_missing() {
        return Ok(Value::Null);
    }

    match target {
        DataType::Int64 => match value {
            Value::Int64(_) => Ok(value.clone()),
            Value::Float64(f) => float_to_int(f.trunc())
                .map(Value::Int64)
                .ok_or_else(|| format!("{f} does not fit in a 64-bit integer")),
            Value::Bool(b) => Ok(Value::Int64(i64::from(*b))),
            Value::Utf8(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int64)
                .map_err(|e| e.to_string()),
            Value::Null => Ok(Value::Null),
        },
        DataType::Float64 => match value {
            Value::Utf8(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float64)
                .map_err(|e| e.to_string()),
            other => other
                .as_f64()
                .map(Value::Float64)
                .ok_or_else(|| "expected a numeric value".to_string()),
        },
        DataType::Bool => match value {
            Value::Utf8(s) => parse_bool(s.trim()).map(Value::Bool),
            other => other
                .as_f64()
                .map(|v| Value::Bool(v != 0.0))
                .ok_or_else(|| "expected a boolean value".to_string()),
        },
        DataType::Utf8 | DataType::Categorical => Ok(Value::Utf8(value.to_string())),
    }
}

/// `f` as an `i64` when it is finite and inside the `i64` range. Any fraction is dropped.
pub(crate) fn float_to_int(f: f64) -> Option<i64> {
    // -2^63 is exact as f64; 2^63 is the first value past i64::MAX.
    (f.is_finite() && (-9_223_372_036_854_775_808.0..9_223_372_036_854_775_808.0).contains(&f))
        .then(|| f as i64)
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Ok(true),
        "false" | "f" | "0" | "no" | "n" => Ok(false),
        _ => Err("expected bool (true/false/1/0/yes/no)".to_string()),
    }
}
