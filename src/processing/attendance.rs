//! Attendance-deficiency flag.

use serde::{Deserialize, Serialize};

use crate::error::FeatureResult;
use crate::student;
use crate::types::{DataType, Field, Table, Value};

use super::Transform;

/// Appends a boolean column that is `true` when a student's absences reach the number of
/// expected attendance hours.
///
/// A row with either side missing is not flagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttendanceDeficiency {
    /// Column holding the expected attendance hours.
    pub expected_hours: String,
    /// Column holding the absence count.
    pub absences: String,
    /// Name of the flag column.
    pub output: String,
}

impl Default for AttendanceDeficiency {
    fn default() -> Self {
        Self {
            expected_hours: student::H_AULA_PRES.to_string(),
            absences: student::FALTAS.to_string(),
            output: student::FALTOSO.to_string(),
        }
    }
}

impl Transform for AttendanceDeficiency {
    fn name(&self) -> &'static str {
        "attendance_deficiency"
    }

    fn apply(&self, table: &Table) -> FeatureResult<Table> {
        table.schema.require(&self.expected_hours)?;
        table.schema.require(&self.absences)?;
        table.derive_column(Field::new(&self.output, DataType::Bool), |rec| {
            let hours = rec.number(&self.expected_hours)?;
            let absences = rec.number(&self.absences)?;
            Ok(Value::Bool(is_deficient(hours, absences)))
        })
    }
}

/// `expected_hours <= absences`; false when either is missing.
pub fn is_deficient(expected_hours: Option<f64>, absences: Option<f64>) -> bool {
    matches!((expected_hours, absences), (Some(h), Some(a)) if h <= a)
}

#[cfg(test)]
mod tests {
    use super::{is_deficient, AttendanceDeficiency};
    use crate::error::FeatureError;
    use crate::processing::Transform;
    use crate::types::{DataType, Field, Schema, Table, Value};

    fn table() -> Table {
        let schema = Schema::new(vec![
            Field::new("H_AULA_PRES", DataType::Int64),
            Field::new("FALTAS", DataType::Int64),
        ]);
        Table::new(
            schema,
            vec![
                vec![Value::Int64(10), Value::Int64(2)],
                vec![Value::Int64(3), Value::Int64(3)],
                vec![Value::Int64(1), Value::Int64(8)],
                vec![Value::Null, Value::Int64(8)],
            ],
        )
    }

    #[test]
    fn flags_rows_where_absences_reach_hours() {
        let out = AttendanceDeficiency::default().apply(&table()).unwrap();
        assert_eq!(out.schema.fields[2], Field::new("FALTOSO", DataType::Bool));
        assert_eq!(
            out.column("FALTOSO").unwrap(),
            vec![
                &Value::Bool(false),
                &Value::Bool(true),
                &Value::Bool(true),
                &Value::Bool(false)
            ]
        );
    }

    #[test]
    fn reapplying_replaces_instead_of_duplicating() {
        let op = AttendanceDeficiency::default();
        let once = op.apply(&table()).unwrap();
        let twice = op.apply(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn missing_source_column_is_a_schema_error() {
        let t = table().without_indices(&[1]);
        let err = AttendanceDeficiency::default().apply(&t).unwrap_err();
        assert!(matches!(err, FeatureError::Schema { .. }));
    }

    #[test]
    fn missing_values_never_flag() {
        assert!(!is_deficient(None, Some(1.0)));
        assert!(!is_deficient(Some(1.0), None));
        assert!(is_deficient(Some(0.0), Some(0.0)));
    }
}
