//! Grade-derived features: per-student average, grade normalization and the difficulty flag.
//!
//! A grade of exactly zero is treated the same as a missing grade: it usually means the
//! subject was not taken rather than failed, so it is left out of the average.

use serde::{Deserialize, Serialize};

use crate::error::FeatureResult;
use crate::student;
use crate::types::{DataType, Field, Table, Value};

use super::Transform;

/// Highest valid grade.
pub const MAX_GRADE: f64 = 10.0;

/// Mean of the grades that are present and strictly positive; `0.0` if there are none.
pub fn grade_average(grades: &[Option<f64>]) -> f64 {
    let (sum, count) = grades
        .iter()
        .flatten()
        .filter(|g| **g > 0.0)
        .fold((0.0, 0usize), |(sum, count), g| (sum + g, count + 1));
    if count > 0 { sum / count as f64 } else { 0.0 }
}

/// How [`NormalizeGrade`] fills a grade that is missing or zero.
///
/// Both rules have been used for this dataset; there is no default, callers pick one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyGradePolicy {
    /// Use the student's grade average.
    RowAverage,
    /// Use the top grade if the student has any positive grade, otherwise zero.
    PassFail,
}

/// Normalize one grade given the row's grade average.
///
/// Missing or zero grades are replaced per `policy`. Values outside `[0, MAX_GRADE]` are
/// clamped into it; anything in `(0, MAX_GRADE]` passes through.
pub fn normalize_grade(grade: Option<f64>, average: f64, policy: EmptyGradePolicy) -> f64 {
    match grade.filter(|g| *g != 0.0) {
        None => match policy {
            EmptyGradePolicy::RowAverage => average.clamp(0.0, MAX_GRADE),
            EmptyGradePolicy::PassFail if average > 0.0 => MAX_GRADE,
            EmptyGradePolicy::PassFail => 0.0,
        },
        Some(g) => g.clamp(0.0, MAX_GRADE),
    }
}

/// Appends the grade average ([`student::MEDIA_GERAL`] by default) as a `Float64` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeAverage {
    /// Grade columns to average.
    pub grades: Vec<String>,
    /// Name of the output column.
    pub output: String,
}

impl Default for GradeAverage {
    fn default() -> Self {
        Self {
            grades: student::GRADE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            output: student::MEDIA_GERAL.to_string(),
        }
    }
}

impl Transform for GradeAverage {
    fn name(&self) -> &'static str {
        "grade_average"
    }

    fn apply(&self, table: &Table) -> FeatureResult<Table> {
        for column in &self.grades {
            table.schema.require(column)?;
        }
        let mut grades = Vec::with_capacity(self.grades.len());
        table.derive_column(Field::new(&self.output, DataType::Float64), |rec| {
            grades.clear();
            for column in &self.grades {
                grades.push(rec.number(column)?);
            }
            Ok(Value::Float64(grade_average(&grades)))
        })
    }
}

/// Rewrites one grade column with [`normalize_grade`]. Needs the grade-average column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeGrade {
    /// Grade column to rewrite.
    pub column: String,
    /// How missing or zero grades are filled.
    pub policy: EmptyGradePolicy,
    /// Grade-average column.
    #[serde(default = "default_average_column")]
    pub average: String,
}

fn default_average_column() -> String {
    student::MEDIA_GERAL.to_string()
}

impl NormalizeGrade {
    /// Normalize `column` against the default grade-average column.
    pub fn new(column: impl Into<String>, policy: EmptyGradePolicy) -> Self {
        Self {
            column: column.into(),
            policy,
            average: default_average_column(),
        }
    }
}

impl Transform for NormalizeGrade {
    fn name(&self) -> &'static str {
        "normalize_grade"
    }

    fn apply(&self, table: &Table) -> FeatureResult<Table> {
        table.schema.require(&self.column)?;
        table.schema.require(&self.average)?;
        table.derive_column(Field::new(&self.column, DataType::Float64), |rec| {
            let grade = rec.number(&self.column)?;
            // a missing average means nothing qualified
            let average = rec.number(&self.average)?.unwrap_or(0.0);
            Ok(Value::Float64(normalize_grade(grade, average, self.policy)))
        })
    }
}

/// Appends a boolean column that is `true` when the grade average is zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyFlag {
    /// Grade-average column.
    pub average: String,
    /// Name of the output column.
    pub output: String,
}

impl Default for DifficultyFlag {
    fn default() -> Self {
        Self {
            average: student::MEDIA_GERAL.to_string(),
            output: student::DIFICULDADE.to_string(),
        }
    }
}

impl Transform for DifficultyFlag {
    fn name(&self) -> &'static str {
        "difficulty_flag"
    }

    fn apply(&self, table: &Table) -> FeatureResult<Table> {
        table.schema.require(&self.average)?;
        table.derive_column(Field::new(&self.output, DataType::Bool), |rec| {
            Ok(Value::Bool(rec.number(&self.average)? == Some(0.0)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{
        grade_average, normalize_grade, DifficultyFlag, EmptyGradePolicy, GradeAverage,
        NormalizeGrade,
    };
    use crate::error::FeatureError;
    use crate::processing::Transform;
    use crate::types::{DataType, Field, Schema, Table, Value};

    const NAN: f64 = f64::NAN;

    fn grades_table(rows: &[[f64; 4]]) -> Table {
        let schema = Schema::new(vec![
            Field::new("NOTA_DE", DataType::Float64),
            Field::new("NOTA_EM", DataType::Float64),
            Field::new("NOTA_MF", DataType::Float64),
            Field::new("NOTA_GO", DataType::Float64),
        ]);
        let rows = rows
            .iter()
            .map(|r| r.iter().map(|g| Value::Float64(*g)).collect())
            .collect();
        Table::new(schema, rows)
    }

    #[test]
    fn average_excludes_zero_and_missing() {
        assert_eq!(grade_average(&[Some(8.0), Some(0.0), None, Some(9.0)]), 8.5);
        assert_eq!(grade_average(&[Some(0.0), None, Some(0.0), None]), 0.0);
        assert_eq!(grade_average(&[]), 0.0);
    }

    #[test]
    fn grade_average_stage_appends_column() {
        let t = grades_table(&[[8.0, 0.0, NAN, 9.0], [0.0, NAN, 0.0, NAN]]);
        let out = GradeAverage::default().apply(&t).unwrap();
        assert_eq!(out.schema.fields[4], Field::new("MEDIA_GERAL", DataType::Float64));
        assert_eq!(
            out.column("MEDIA_GERAL").unwrap(),
            vec![&Value::Float64(8.5), &Value::Float64(0.0)]
        );
    }

    #[test]
    fn grade_average_rejects_text_grades() {
        let schema = Schema::new(vec![
            Field::new("NOTA_DE", DataType::Utf8),
            Field::new("NOTA_EM", DataType::Float64),
            Field::new("NOTA_MF", DataType::Float64),
            Field::new("NOTA_GO", DataType::Float64),
        ]);
        let t = Table::new(
            schema,
            vec![vec![
                Value::Utf8("dez".into()),
                Value::Null,
                Value::Null,
                Value::Null,
            ]],
        );
        let err = GradeAverage::default().apply(&t).unwrap_err();
        assert!(matches!(err, FeatureError::TypeCoercion { .. }));
    }

    #[test]
    fn pass_fail_policy() {
        let p = EmptyGradePolicy::PassFail;
        assert_eq!(normalize_grade(None, 7.0, p), 10.0);
        assert_eq!(normalize_grade(None, 0.0, p), 0.0);
        assert_eq!(normalize_grade(Some(0.0), 7.0, p), 10.0);
        assert_eq!(normalize_grade(Some(15.0), 7.0, p), 10.0);
        assert_eq!(normalize_grade(Some(6.0), 7.0, p), 6.0);
    }

    #[test]
    fn row_average_policy() {
        let p = EmptyGradePolicy::RowAverage;
        assert_eq!(normalize_grade(None, 7.0, p), 7.0);
        assert_eq!(normalize_grade(Some(0.0), 0.0, p), 0.0);
        assert_eq!(normalize_grade(None, 12.0, p), 10.0);
        assert_eq!(normalize_grade(Some(15.0), 7.0, p), 10.0);
        assert_eq!(normalize_grade(Some(6.0), 7.0, p), 6.0);
    }

    #[test]
    fn negative_grades_and_averages_clamp_to_zero() {
        for p in [EmptyGradePolicy::RowAverage, EmptyGradePolicy::PassFail] {
            assert_eq!(normalize_grade(Some(-3.0), 7.0, p), 0.0);
        }
        assert_eq!(normalize_grade(None, -2.0, EmptyGradePolicy::RowAverage), 0.0);
        assert_eq!(normalize_grade(None, -2.0, EmptyGradePolicy::PassFail), 0.0);
    }

    #[test]
    fn normalize_stage_needs_its_grade_column() {
        let schema = Schema::new(vec![Field::new("MEDIA_GERAL", DataType::Float64)]);
        let empty = Table::new(schema, Vec::new());
        let err = NormalizeGrade::new("NOTA_XX", EmptyGradePolicy::RowAverage)
            .apply(&empty)
            .unwrap_err();
        match err {
            FeatureError::Schema { message } => assert!(message.contains("NOTA_XX"), "{message}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn normalize_stage_needs_average_column() {
        let t = grades_table(&[[8.0, 0.0, NAN, 9.0]]);
        let err = NormalizeGrade::new("NOTA_MF", EmptyGradePolicy::PassFail)
            .apply(&t)
            .unwrap_err();
        assert!(err.to_string().contains("MEDIA_GERAL"));
    }

    #[test]
    fn normalize_stage_rewrites_only_its_column() {
        let t = grades_table(&[[8.0, 0.0, NAN, 15.0], [0.0, NAN, 0.0, NAN]]);
        let t = GradeAverage::default().apply(&t).unwrap();
        let out = NormalizeGrade::new("NOTA_MF", EmptyGradePolicy::PassFail)
            .apply(&t)
            .unwrap();
        assert_eq!(out.rows[0][2], Value::Float64(10.0));
        assert_eq!(out.rows[1][2], Value::Float64(0.0));
        assert_eq!(out.rows[0][3], Value::Float64(15.0));
        assert_eq!(out.column_count(), t.column_count());
    }

    #[test]
    fn difficulty_flag_tracks_zero_average() {
        let t = grades_table(&[[8.0, 0.0, NAN, 9.0], [0.0, NAN, 0.0, NAN]]);
        let t = GradeAverage::default().apply(&t).unwrap();
        let out = DifficultyFlag::default().apply(&t).unwrap();
        assert_eq!(
            out.column("DIFICULDADE").unwrap(),
            vec![&Value::Bool(false), &Value::Bool(true)]
        );
    }

    #[test]
    fn policy_has_no_default_in_config() {
        let err = serde_json::from_str::<NormalizeGrade>(r#"{"column":"NOTA_DE"}"#);
        assert!(err.is_err());
        let op: NormalizeGrade =
            serde_json::from_str(r#"{"column":"NOTA_DE","policy":"row_average"}"#).unwrap();
        assert_eq!(op.average, "MEDIA_GERAL");
    }
}
