//! Column reductions for [`crate::types::Table`].
//!
//! These back the statistic-based fill strategies in [`super::fill`].

use std::collections::HashMap;

use crate::error::FeatureResult;
use crate::types::{DataType, Table, Value};

/// Built-in reduction operations over a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    /// Count all rows (including missing values).
    Count,
    /// Sum numeric values, ignoring missing values.
    Sum,
    /// Minimum numeric value, ignoring missing values.
    Min,
    /// Maximum numeric value, ignoring missing values.
    Max,
    /// Arithmetic mean of numeric values, ignoring missing values. Always `Float64`.
    Mean,
    /// Median of numeric values, ignoring missing values. Always `Float64`.
    Median,
    /// Most frequent non-missing value of any type. Ties go to the value seen first.
    MostFrequent,
}

/// Reduce a column using a built-in [`ReduceOp`].
///
/// - Errors if `column` does not exist in the schema.
/// - For every op except `Count`, returns `Value::Null` if there are no non-missing values.
/// - Numeric ops on `Bool`/`Utf8`/`Categorical` columns return `Value::Null`.
/// - An `Int64` sum that overflows returns `Value::Null`.
pub fn reduce(table: &Table, column: &str, op: ReduceOp) -> FeatureResult<Value> {
    let idx = table.schema.require(column)?;
    let data_type = table.schema.fields[idx].data_type;
    let present = table
        .rows
        .iter()
        .map(|row| &row[idx])
        .filter(|v| !v.is_missing());

    let out = match op {
        ReduceOp::Count => Value::Int64(table.row_count() as i64),
        ReduceOp::MostFrequent => most_frequent(present),
        ReduceOp::Sum | ReduceOp::Min | ReduceOp::Max => match data_type {
            DataType::Int64 => {
                let ints = present.filter_map(|v| match v {
                    Value::Int64(i) => Some(*i),
                    _ => None,
                });
                fold_numeric(ints, op, i64::checked_add)
                    .map(Value::Int64)
                    .unwrap_or(Value::Null)
            }
            DataType::Float64 => {
                let floats = present.filter_map(Value::as_f64);
                fold_numeric(floats, op, |a, b| Some(a + b))
                    .map(Value::Float64)
                    .unwrap_or(Value::Null)
            }
            _ => Value::Null,
        },
        ReduceOp::Mean | ReduceOp::Median => match data_type {
            DataType::Int64 | DataType::Float64 => {
                let values: Vec<f64> = present.filter_map(Value::as_f64).collect();
                let stat = if op == ReduceOp::Mean {
                    mean(&values)
                } else {
                    median(values)
                };
                stat.map(Value::Float64).unwrap_or(Value::Null)
            }
            _ => Value::Null,
        },
    };
    Ok(out)
}

/// Sum/min/max over `values`. `add` returns `None` on overflow, which ends the fold with `None`.
fn fold_numeric<T, I>(values: I, op: ReduceOp, add: impl Fn(T, T) -> Option<T>) -> Option<T>
where
    T: Copy + PartialOrd,
    I: Iterator<Item = T>,
{
    let mut acc: Option<T> = None;
    for v in values {
        acc = Some(match (op, acc) {
            (_, None) => v,
            (ReduceOp::Sum, Some(a)) => add(a, v)?,
            (ReduceOp::Min, Some(a)) if v < a => v,
            (ReduceOp::Max, Some(a)) if v > a => v,
            (_, Some(a)) => a,
        });
    }
    acc
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

fn most_frequent<'a>(values: impl Iterator<Item = &'a Value>) -> Value {
    // key -> (count, first position, value)
    let mut counts: HashMap<String, (usize, usize, &Value)> = HashMap::new();
    for (pos, v) in values.enumerate() {
        counts
            .entry(format!("{v:?}"))
            .and_modify(|e| e.0 += 1)
            .or_insert((1, pos, v));
    }
    counts
        .into_values()
        .max_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))
        .map(|(_, _, v)| v.clone())
        .unwrap_or(Value::Null)
}
