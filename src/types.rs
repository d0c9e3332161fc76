//! Core data model types for the feature pipeline.
//!
//! Stages consume and produce an in-memory [`Table`]: a [`Schema`] (a list of typed [`Field`]s)
//! plus row-major [`Value`] storage. Row-wise computations see a row through a borrowed
//! [`Record`].

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, FeatureResult};

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
    /// Category label. Values are stored as [`Value::Utf8`].
    Categorical,
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Ordered list of fields describing the shape of a [`Table`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Like [`Self::index_of`], but a missing field is a schema error.
    pub fn require(&self, name: &str) -> FeatureResult<usize> {
        self.index_of(name)
            .ok_or_else(|| FeatureError::missing_column(name))
    }
}

/// A single typed value in a [`Table`].
///
/// Serializes untagged, so JSON `null`, integers, floats, booleans and strings map onto
/// `Null`, `Int64`, `Float64`, `Bool` and `Utf8` respectively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
}

impl Value {
    /// `true` for [`Value::Null`] and for a `Float64` NaN.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float64(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Numeric view of the value. Booleans count as 0/1; strings and missing values have none.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) if !v.is_nan() => Some(*v),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Utf8(s) => f.write_str(s),
        }
    }
}

/// In-memory tabular dataset passed between pipeline stages.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields. Every
/// transformation returns a new table; the receiver is never modified.
///
/// Deserialization goes through [`Table::try_new`], so a ragged or duplicated-column table is
/// rejected when it is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableParts")]
pub struct Table {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
struct TableParts {
    schema: Schema,
    rows: Vec<Vec<Value>>,
}

impl TryFrom<TableParts> for Table {
    type Error = FeatureError;

    fn try_from(parts: TableParts) -> FeatureResult<Self> {
        Table::try_new(parts.schema, parts.rows)
    }
}

impl Table {
    /// Create a table from schema and rows without validating them.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Create a table, checking that column names are unique and every row matches the schema
    /// width.
    pub fn try_new(schema: Schema, rows: Vec<Vec<Value>>) -> FeatureResult<Self> {
        let mut seen = HashSet::with_capacity(schema.len());
        for name in schema.field_names() {
            if !seen.insert(name) {
                return Err(FeatureError::Schema {
                    message: format!("duplicate column '{name}'"),
                });
            }
        }
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != schema.len())
        {
            return Err(FeatureError::Schema {
                message: format!(
                    "row {idx} has {} values but the schema has {} columns",
                    row.len(),
                    schema.len()
                ),
            });
        }
        Ok(Self { schema, rows })
    }

    /// Number of rows in the table.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns in the table.
    pub fn column_count(&self) -> usize {
        self.schema.len()
    }

    /// Values of one column, in row order.
    pub fn column(&self, name: &str) -> FeatureResult<Vec<&Value>> {
        let idx = self.schema.require(name)?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Iterate rows as [`Record`]s.
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().enumerate().map(|(index, row)| Record {
            schema: &self.schema,
            values: row.as_slice(),
            index,
        })
    }

    /// Return a new table with `field` set to `values`.
    ///
    /// An existing column with the same name is replaced in place (keeping its position);
    /// otherwise the column is appended. `values` must have one entry per row.
    pub fn with_column(&self, field: Field, values: Vec<Value>) -> FeatureResult<Self> {
        if values.len() != self.row_count() {
            return Err(FeatureError::Schema {
                message: format!(
                    "column '{}' has {} values but the table has {} rows",
                    field.name,
                    values.len(),
                    self.row_count()
                ),
            });
        }

        let mut schema = self.schema.clone();
        let mut rows = self.rows.clone();
        match schema.index_of(&field.name) {
            Some(idx) => {
                schema.fields[idx] = field;
                for (row, value) in rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                schema.fields.push(field);
                for (row, value) in rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(Self { schema, rows })
    }

    /// Return a new table computing `field` from every row.
    ///
    /// This is the building block for the derived-feature stages.
    pub fn derive_column<F>(&self, field: Field, mut compute: F) -> FeatureResult<Self>
    where
        F: FnMut(Record<'_>) -> FeatureResult<Value>,
    {
        let values = self
            .records()
            .map(&mut compute)
            .collect::<FeatureResult<Vec<_>>>()?;
        self.with_column(field, values)
    }

    /// Return a new table where every value of `column` is replaced by `mapper(row, value)` and
    /// the field type becomes `data_type`.
    pub fn map_column<F>(&self, column: &str, data_type: DataType, mut mapper: F) -> FeatureResult<Self>
    where
        F: FnMut(usize, &Value) -> FeatureResult<Value>,
    {
        let idx = self.schema.require(column)?;
        let mut schema = self.schema.clone();
        schema.fields[idx].data_type = data_type;

        let mut rows = Vec::with_capacity(self.row_count());
        for (row_idx, row) in self.rows.iter().enumerate() {
            let mut out = row.clone();
            out[idx] = mapper(row_idx, &row[idx])?;
            rows.push(out);
        }
        Ok(Self { schema, rows })
    }

    /// Return a new table without the columns at `indices`.
    pub fn without_indices(&self, indices: &[usize]) -> Self {
        let keep = |i: &usize| !indices.contains(i);
        let fields = self
            .schema
            .fields
            .iter()
            .enumerate()
            .filter(|(i, _)| keep(i))
            .map(|(_, f)| f.clone())
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|(i, _)| keep(i))
                    .map(|(_, v)| v.clone())
                    .collect()
            })
            .collect();
        Self {
            schema: Schema::new(fields),
            rows,
        }
    }
}

/// Borrowed view of one table row, addressed by column name.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    schema: &'a Schema,
    values: &'a [Value],
    index: usize,
}

impl<'a> Record<'a> {
    /// Zero-based row index within the table.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Raw values in schema order.
    pub fn values(&self) -> &'a [Value] {
        self.values
    }

    /// Value of `column`, or a schema error if the column does not exist.
    pub fn get(&self, column: &str) -> FeatureResult<&'a Value> {
        let idx = self.schema.require(column)?;
        Ok(&self.values[idx])
    }

    /// Numeric value of `column`; `None` when the value is missing.
    ///
    /// Strings are a coercion error.
    pub fn number(&self, column: &str) -> FeatureResult<Option<f64>> {
        let value = self.get(column)?;
        if value.is_missing() {
            return Ok(None);
        }
        value.as_f64().map(Some).ok_or_else(|| FeatureError::TypeCoercion {
            row: self.index,
            column: column.to_owned(),
            raw: value.to_string(),
            message: "expected a numeric value".to_string(),
        })
    }
}
